use crate::error::FetchError;
use crate::transport::{Headers, HttpTransport};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use trakt_feed_models::{Credentials, TokenGrant};
use tracing::{debug, warn};

pub const API_VERSION: &str = "2";
/// Items per page requested from every list endpoint
pub const PAGE_LIMIT: u32 = 20;
pub const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const AUTHORIZE_URL: &str = "https://trakt.tv/oauth/authorize";

pub const DEVICE_CODE_PATH: &str = "/oauth/device/code";
pub const DEVICE_TOKEN_PATH: &str = "/oauth/device/token";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Seconds shaved off a token's lifetime so it is refreshed before Trakt rejects it
const EXPIRY_MARGIN_SECS: i64 = 120;

/// A Trakt endpoint plus its query string, before the base URL is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
}

impl Route {
    /// List endpoint with the paging and `extended=full` parameters every
    /// listing needs (without `extended` the `ids` objects are not returned)
    pub fn paged(endpoint: impl Into<String>, page: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: vec![
                ("page".to_string(), page.max(1).to_string()),
                ("limit".to_string(), PAGE_LIMIT.to_string()),
                ("extended".to_string(), "full".to_string()),
            ],
        }
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[cfg(test)]
    pub(crate) fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if self.query.is_empty() {
            return format!("{}{}", base, self.endpoint);
        }

        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}{}?{}", base, self.endpoint, query)
    }
}

/// Percent-encode a caller-supplied path segment (user slug, list slug)
pub fn path_segment(raw: &str) -> String {
    urlencoding::encode(raw.trim()).into_owned()
}

/// Headers for the v2 REST API. The bearer token is only attached when it
/// looks like a real token; public endpoints work without it.
pub fn api_headers(credentials: &Credentials) -> Headers {
    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("trakt-api-version".to_string(), API_VERSION.to_string()),
        (
            "trakt-api-key".to_string(),
            credentials.client_id().unwrap_or_default().to_string(),
        ),
    ];
    if let Some(token) = credentials.usable_token() {
        headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
    }
    headers
}

pub fn oauth_headers() -> Headers {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}

/// GET a route and decode its JSON body
pub async fn get_json(
    transport: &dyn HttpTransport,
    base_url: &str,
    route: &Route,
    credentials: &Credentials,
) -> Result<serde_json::Value, FetchError> {
    if credentials.client_id().is_none() {
        return Err(FetchError::MissingClientId);
    }

    let url = route.url(base_url);
    debug!(url = %url, authenticated = credentials.usable_token().is_some(), "GET Trakt");

    let response = transport.get(&url, &api_headers(credentials)).await?;
    if !response.is_ok() {
        warn!(status = response.status, endpoint = %route.endpoint, "Trakt API error");
        return Err(FetchError::Status {
            status: response.status,
            endpoint: route.endpoint.clone(),
        });
    }

    response.json().map_err(|e| FetchError::Decode {
        endpoint: route.endpoint.clone(),
        message: e.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl TokenResponse {
    /// `None` when the response carries no usable access token
    pub fn into_grant(self) -> Option<TokenGrant> {
        let access_token = self.access_token.filter(|t| !t.trim().is_empty())?;

        let issued_at = self
            .created_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);
        // Lifetimes chrono cannot represent are treated as no known expiry
        let expires_at = self
            .expires_in
            .and_then(|secs| Duration::try_seconds(secs.saturating_sub(EXPIRY_MARGIN_SECS)))
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime));

        Some(TokenGrant {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paged_route_url() {
        let route = Route::paged("/sync/watchlist", 2).param("sort", "rank,asc");
        assert_eq!(
            route.url("https://api.trakt.tv/"),
            "https://api.trakt.tv/sync/watchlist?page=2&limit=20&extended=full&sort=rank%2Casc"
        );
        assert_eq!(route.query_value("sort"), Some("rank,asc"));
        assert_eq!(Route::paged("/movies/trending", 0).query_value("page"), Some("1"));
    }

    #[test]
    fn test_path_segment_is_encoded() {
        assert_eq!(path_segment("sean"), "sean");
        assert_eq!(path_segment(" my list/2 "), "my%20list%2F2");
    }

    #[test]
    fn test_api_headers_only_carry_plausible_tokens() {
        let headers = api_headers(&Credentials::new("cid").with_token("abc"));
        assert!(headers.iter().all(|(k, _)| k != "Authorization"));
        assert!(headers.contains(&("trakt-api-key".to_string(), "cid".to_string())));
        assert!(headers.contains(&("trakt-api-version".to_string(), "2".to_string())));

        let headers = api_headers(&Credentials::new("cid").with_token("real-token"));
        assert!(headers.contains(&("Authorization".to_string(), "Bearer real-token".to_string())));
    }

    #[test]
    fn test_token_response_into_grant() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "abc123",
            "refresh_token": "def456",
            "expires_in": 7776000,
            "created_at": 1_700_000_000
        }))
        .unwrap();
        let grant = response.into_grant().unwrap();
        assert_eq!(grant.access_token, "abc123");
        assert_eq!(grant.refresh_token.as_deref(), Some("def456"));
        assert_eq!(
            grant.expires_at.unwrap().timestamp(),
            1_700_000_000 + 7_776_000 - EXPIRY_MARGIN_SECS
        );

        let empty: TokenResponse = serde_json::from_value(serde_json::json!({"error": "invalid_grant"})).unwrap();
        assert!(empty.into_grant().is_none());
    }

    #[test]
    fn test_unrepresentable_lifetime_means_no_expiry() {
        for expires_in in [9_000_000_000_000_000_000_i64, i64::MAX, i64::MIN] {
            let response: TokenResponse = serde_json::from_value(serde_json::json!({
                "access_token": "abcdef123456",
                "expires_in": expires_in,
                "created_at": 1_700_000_000
            }))
            .unwrap();
            let grant = response.into_grant().unwrap();
            assert_eq!(grant.access_token, "abcdef123456");
            assert_eq!(grant.expires_at, None);
        }
    }
}
