pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, FeedOptions, TraktConfig, DEFAULT_API_BASE_URL};
pub use credentials::CredentialStore;
pub use paths::PathManager;
