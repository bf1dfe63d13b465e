use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(interface) = std::env::var("NETMEDIC_INTERFACE")
            && !interface.is_empty()
        {
            self.network.interface = interface;
        }

        if let Ok(level) = std::env::var("NETMEDIC_LOG")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }

        if let Ok(deadline_str) = std::env::var("NETMEDIC_DEADLINE_SECS")
            && let Ok(deadline) = deadline_str.parse::<u64>()
            && deadline > 0
        {
            self.remediation.deadline_secs = deadline;
        }
    }
}
