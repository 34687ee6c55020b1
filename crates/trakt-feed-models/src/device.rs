use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of an in-flight device authorization.
///
/// Created when the device code is issued and dropped once polling reaches a
/// terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceAuthSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub poll_interval_secs: u64,
    pub expires_in_secs: u64,
    pub expires_at_epoch: i64,
}

impl DeviceAuthSession {
    /// Upper bound on token polls within the validity window
    pub fn max_poll_attempts(&self) -> u64 {
        if self.poll_interval_secs == 0 {
            return 0;
        }
        self.expires_in_secs / self.poll_interval_secs
    }
}

/// Tokens obtained from a successful OAuth exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
