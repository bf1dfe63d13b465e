use anyhow::{Context, Result};
use netmedic::Config;
use netmedic::engine::Engine;
use netmedic::ui::{render_snapshot, style};

/// Footer naming the settings a status answer was produced under.
pub fn render_settings(config: &Config) -> String {
    let remediation = &config.remediation;
    [
        format!("◆ {}", style::header("Settings")),
        String::new(),
        format!("  Version     {}", env!("CARGO_PKG_VERSION")),
        format!("  Config      {}", config.config_path.display()),
        format!(
            "  Interface   {} ({})",
            config.network.interface,
            config.network.platform.resolve()
        ),
        format!(
            "  Privilege   {}",
            if config.network.use_sudo { "sudo -n" } else { "direct" }
        ),
        format!(
            "  Remediation max {} actions, {}s per action, {}s overall, lock {}",
            remediation.max_actions,
            remediation.action_timeout_secs,
            remediation.deadline_secs,
            remediation.lock_mode
        ),
        format!(
            "  Band switch {}",
            if config.band.switching_configured() {
                format!(
                    "{} / {} (threshold {:.1}%)",
                    config.band.profile_2g, config.band.profile_5g, config.band.noise_threshold_pct
                )
            } else {
                "not configured".to_string()
            }
        ),
    ]
    .join("\n")
}

pub async fn run(engine: &Engine, slow: bool, json: bool) -> Result<()> {
    let snapshot = engine.status(slow).await;
    if json {
        let text =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{text}");
        return Ok(());
    }
    println!("{}", render_snapshot(&snapshot));
    println!();
    println!("{}", render_settings(engine.config()));
    Ok(())
}
