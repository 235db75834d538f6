use serde::{Deserialize, Serialize};

/// `modules.api_ingress` section. Bind address and request timeout come from
/// the top-level `server` section instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    pub cors_enabled: bool,
    pub max_body_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            max_body_bytes: 1024 * 1024,
        }
    }
}
