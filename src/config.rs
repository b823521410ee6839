use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for hostel-desk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostelDeskConfig {
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Demo command settings
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_output: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Actor id used for the demo requester session
    pub requester_id: String,
    /// Actor id used for the demo handler session
    pub handler_id: String,
    /// Actor id used for the demo auditor session
    pub auditor_id: String,
}

impl Default for HostelDeskConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_output: false,
            },
            demo: DemoConfig {
                requester_id: "resident-001".to_string(),
                handler_id: "desk-staff-001".to_string(),
                auditor_id: "admin-001".to_string(),
            },
        }
    }
}

impl HostelDeskConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. hostel-desk.toml in the working directory
    /// 3. Environment variables (prefixed with HOSTEL_DESK_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("hostel-desk.toml").exists() {
            builder = builder.add_source(File::with_name("hostel-desk"));
        }

        builder = builder.add_source(
            Environment::with_prefix("HOSTEL_DESK")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }
}
