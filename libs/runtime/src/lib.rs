//! Process-level runtime support shared by TaskFlow binaries:
//! layered configuration, logging setup and home directory resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};

use std::collections::HashMap;

/// Read-only view over the `modules` bag of an [`AppConfig`].
///
/// Binaries wrap this into whatever provider trait their module system expects.
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

pub struct AppConfigProvider {
    modules: HashMap<String, serde_json::Value>,
}

impl AppConfigProvider {
    pub fn new(config: AppConfig) -> Self {
        Self {
            modules: config.modules,
        }
    }
}

impl ConfigProvider for AppConfigProvider {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.modules.get(module_name)
    }
}
