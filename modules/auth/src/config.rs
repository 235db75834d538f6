use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_JWT_SECRET: &str = "taskflow-dev-secret";
pub const DEFAULT_EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@gmail\.com$";

/// `modules.auth` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HS256 signing key.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl", with = "humantime_serde")]
    pub token_ttl: Duration,
    /// Accepted registration emails, matched against the lower-cased address.
    #[serde(default = "default_email_pattern")]
    pub email_pattern: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl: default_token_ttl(),
            email_pattern: default_email_pattern(),
        }
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_email_pattern() -> String {
    DEFAULT_EMAIL_PATTERN.to_string()
}
