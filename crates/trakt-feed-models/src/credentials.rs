use serde::{Deserialize, Serialize};

/// Tokens this short are leftovers from form fields, not real bearer tokens
const MIN_TOKEN_LEN: usize = 6;

/// Per-call API credentials. Never persisted by the library.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub bearer_token: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            bearer_token: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn client_id(&self) -> Option<&str> {
        let id = self.client_id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The bearer token, if one of plausible length was supplied.
    pub fn usable_token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|t| t.len() >= MIN_TOKEN_LEN)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .finish()
    }
}
