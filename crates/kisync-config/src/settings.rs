//! Tool settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("kisync/", env!("CARGO_PKG_VERSION")).to_string()
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero timeout.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KisyncSettings {
    /// netrc file holding API tokens; `~/.netrc` when unset.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpSettings,
}
