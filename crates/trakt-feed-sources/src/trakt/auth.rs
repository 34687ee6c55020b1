use crate::error::AuthError;
use crate::trakt::api::{
    oauth_headers, DeviceCodeResponse, TokenResponse, AUTHORIZE_URL, DEVICE_CODE_PATH, DEVICE_TOKEN_PATH,
    REDIRECT_URI, TOKEN_PATH,
};
use crate::transport::HttpTransport;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use trakt_feed_models::{DeviceAuthSession, DisplayRecord, TokenGrant};
use tracing::{debug, info, warn};

/// Used when Trakt omits the polling interval (or sends zero)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// How polling treats token-endpoint statuses that Trakt documents as final
/// (404 invalid code, 409 already used, 410 expired, 418 denied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Keep polling until approval or until the attempt budget runs out
    #[default]
    Lenient,
    /// Stop on the first final status
    Strict,
}

#[derive(Debug)]
enum PollOutcome {
    Authorized(TokenGrant),
    Pending,
    SlowDown,
    Rejected(u16),
}

/// Authorization URL for the out-of-band authorization-code flow
pub fn authorization_url(client_id: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id.trim()),
        REDIRECT_URI
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trakt OAuth: device flow, authorization-code exchange and refresh
#[derive(Clone)]
pub struct TraktAuth {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    policy: PollPolicy,
}

impl TraktAuth {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Run the whole device flow.
    ///
    /// `on_session` receives the user code and verification URL once they are
    /// issued; the caller is responsible for showing them to the user.
    pub async fn authorize<F>(
        &self,
        client_id: &str,
        client_secret: &str,
        on_session: F,
    ) -> Result<TokenGrant, AuthError>
    where
        F: FnOnce(&DeviceAuthSession),
    {
        let (client_id, client_secret) = match (non_empty(Some(client_id)), non_empty(Some(client_secret))) {
            (Some(id), Some(secret)) => (id, secret),
            _ => return Err(AuthError::MissingCredentials),
        };

        let session = self.request_device_code(client_id).await?;
        on_session(&session);
        self.poll_for_token(&session, client_id, client_secret).await
    }

    /// Step 1: obtain a device code and the code the user has to enter
    pub async fn request_device_code(&self, client_id: &str) -> Result<DeviceAuthSession, AuthError> {
        let client_id = non_empty(Some(client_id)).ok_or(AuthError::MissingCredentials)?;
        let payload = serde_json::json!({ "client_id": client_id });

        let response = self
            .transport
            .post(&self.url(DEVICE_CODE_PATH), &oauth_headers(), &payload)
            .await?;

        if !response.is_ok() {
            return Err(AuthError::Network(format!(
                "Failed to request device code: {} - {}",
                response.status, response.body
            )));
        }

        let device: DeviceCodeResponse = response.json().map_err(|e| {
            warn!(error = %e, "Failed to parse device code response");
            AuthError::Network(format!("Failed to parse device code response: {}", e))
        })?;

        let poll_interval_secs = device
            .interval
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        info!(
            verification_url = %device.verification_url,
            expires_in = device.expires_in,
            interval = poll_interval_secs,
            "Trakt device code issued"
        );

        Ok(DeviceAuthSession {
            device_code: device.device_code,
            user_code: device.user_code,
            verification_url: device.verification_url,
            poll_interval_secs,
            expires_in_secs: device.expires_in,
            expires_at_epoch: Utc::now()
                .timestamp()
                .saturating_add(i64::try_from(device.expires_in).unwrap_or(i64::MAX)),
        })
    }

    /// Step 2: poll the token endpoint once per interval until the user
    /// approves or the device code's validity window is used up
    pub async fn poll_for_token(
        &self,
        session: &DeviceAuthSession,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenGrant, AuthError> {
        let interval = StdDuration::from_secs(session.poll_interval_secs);
        let max_attempts = session.max_poll_attempts();
        let mut attempts = 0;

        while attempts < max_attempts {
            sleep(interval).await;
            attempts += 1;

            match self.poll_once(session, client_id, client_secret).await {
                PollOutcome::Authorized(grant) => {
                    info!(attempts, "Trakt device authorization approved");
                    return Ok(grant);
                }
                PollOutcome::Pending => {
                    debug!(attempts, max_attempts, "Authorization pending");
                }
                PollOutcome::SlowDown => {
                    // The extra wait spends an interval of the validity window
                    attempts += 1;
                    debug!(attempts, "Trakt asked to slow down");
                    if attempts >= max_attempts {
                        break;
                    }
                    sleep(interval).await;
                }
                PollOutcome::Rejected(status) => match self.policy {
                    PollPolicy::Strict => {
                        return Err(AuthError::Network(format!(
                            "Device authorization ended with status {}",
                            status
                        )));
                    }
                    PollPolicy::Lenient => {
                        debug!(attempts, status, "Final status ignored, still polling");
                    }
                },
            }
        }

        warn!(attempts, "Trakt device code expired before approval");
        Err(AuthError::Timeout { attempts })
    }

    async fn poll_once(&self, session: &DeviceAuthSession, client_id: &str, client_secret: &str) -> PollOutcome {
        let payload = serde_json::json!({
            "code": session.device_code,
            "client_id": client_id,
            "client_secret": client_secret,
        });

        let response = match self
            .transport
            .post(&self.url(DEVICE_TOKEN_PATH), &oauth_headers(), &payload)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Token poll failed, treating as pending");
                return PollOutcome::Pending;
            }
        };

        match response.status {
            200 => response
                .json::<TokenResponse>()
                .ok()
                .and_then(TokenResponse::into_grant)
                .map(PollOutcome::Authorized)
                .unwrap_or(PollOutcome::Pending),
            429 => PollOutcome::SlowDown,
            404 | 409 | 410 | 418 => PollOutcome::Rejected(response.status),
            _ => PollOutcome::Pending,
        }
    }

    /// Exchange an out-of-band authorization code for tokens
    pub async fn exchange_code(&self, client_id: &str, client_secret: &str, code: &str) -> Result<TokenGrant, AuthError> {
        self.token_request(serde_json::json!({
            "code": code.trim(),
            "client_id": client_id.trim(),
            "client_secret": client_secret.trim(),
            "redirect_uri": REDIRECT_URI,
            "grant_type": "authorization_code"
        }))
        .await
    }

    pub async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenGrant, AuthError> {
        self.token_request(serde_json::json!({
            "refresh_token": refresh_token.trim(),
            "client_id": client_id.trim(),
            "client_secret": client_secret.trim(),
            "redirect_uri": REDIRECT_URI,
            "grant_type": "refresh_token"
        }))
        .await
    }

    async fn token_request(&self, payload: serde_json::Value) -> Result<TokenGrant, AuthError> {
        let response = self
            .transport
            .post(&self.url(TOKEN_PATH), &oauth_headers(), &payload)
            .await?;

        match response.json::<TokenResponse>() {
            Ok(token) => token.into_grant().ok_or(AuthError::InvalidCode),
            Err(_) if !response.is_ok() => Err(AuthError::InvalidCode),
            Err(e) => Err(AuthError::Network(format!("Malformed token response: {}", e))),
        }
    }

    /// Guided token acquisition for hosts that can only render text cards.
    ///
    /// Walks the user through the authorization-code flow one invocation at a
    /// time and never fails; every outcome is a list of records.
    pub async fn token_tool(
        &self,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        code: Option<&str>,
    ) -> Vec<DisplayRecord> {
        let (client_id, client_secret) = match (non_empty(client_id), non_empty(client_secret)) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return vec![DisplayRecord::text(
                    "Setup required",
                    "Enter your Trakt Client ID and Client Secret first",
                )];
            }
        };

        let code = match non_empty(code) {
            Some(code) => code,
            None => {
                return vec![
                    DisplayRecord::text(
                        "Step 1: get an authorization code",
                        "Open the link below, approve access, then paste the code into the auth_code field",
                    ),
                    DisplayRecord::link("Authorization link", authorization_url(client_id)),
                ];
            }
        };

        match self.exchange_code(client_id, client_secret, code).await {
            Ok(grant) => vec![
                DisplayRecord::text("Token acquired", "Copy the access token below"),
                DisplayRecord::text("Access Token", grant.access_token),
            ],
            Err(AuthError::InvalidCode) => vec![DisplayRecord::text(
                "Failed",
                "The authorization code is invalid or has expired",
            )],
            Err(e) => vec![DisplayRecord::text("Error", e.to_string())],
        }
    }
}
