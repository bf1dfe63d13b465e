use crate::app::status;
use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use netmedic::Config;
use netmedic::engine::Engine;
use netmedic::ui::{render_plan, render_report};
use tracing::info;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let engine = Engine::system(config).context("Failed to set up the diagnosis engine")?;

    match cli.command {
        Commands::Diagnose { query, slow, json } => {
            if query.trim().is_empty() {
                bail!("query cannot be empty");
            }
            let report = engine.diagnose(&query, slow).await?;
            info!(
                run_id = %report.run_id,
                intent = %report.intent,
                outcome = %report.outcome,
                "diagnosis finished"
            );
            if json {
                let text = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize report")?;
                println!("{text}");
            } else {
                println!("{}", render_report(&report));
            }
            Ok(())
        }

        Commands::Status { slow, json } => status::run(&engine, slow, json).await,

        Commands::Plan { query } => {
            if query.trim().is_empty() {
                bail!("query cannot be empty");
            }
            let preview = engine.plan(&query).await;
            println!("{}", render_plan(&preview));
            Ok(())
        }
    }
}
