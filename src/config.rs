use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::param::ClusterParams;
use crate::result::Result;
use crate::sync::SyncConfig;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub clustering: ClusterParams,
    pub sync: SyncConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clustering: ClusterParams::default(),
            sync: SyncConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.sync.validate()
    }
}
