use thiserror::Error;

/// Failure of the HTTP capability itself (connect, TLS, body read)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Why a content fetch produced nothing. Collapsed to an empty list at the
/// router's public boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("client_id is required")]
    MissingClientId,
    #[error("Trakt returned {status} for {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("client_id and client_secret are both required")]
    MissingCredentials,
    #[error("device code expired after {attempts} poll attempts")]
    Timeout { attempts: u64 },
    #[error("authorization request failed: {0}")]
    Network(String),
    #[error("authorization code was rejected")]
    InvalidCode,
}

impl From<TransportError> for AuthError {
    fn from(e: TransportError) -> Self {
        AuthError::Network(e.0)
    }
}

/// Parameter problems when invoking a manifest module
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("invalid value '{value}' for parameter '{param}'")]
    InvalidValue { param: String, value: String },
}
