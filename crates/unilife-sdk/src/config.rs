//! Data client configuration.
//!
//! [`ClientConfig`] locates the backend; [`ClientOptions`] fixes how the
//! client treats its session. The session bridge owns token lifetime, so
//! the client itself never persists or refreshes sessions.

use crate::error::SdkError;

/// Environment variable holding the backend base URL.
pub const ENV_DATA_URL: &str = "UNILIFE_DATA_URL";
/// Environment variable holding the backend's public (anon) key.
pub const ENV_DATA_ANON_KEY: &str = "UNILIFE_DATA_ANON_KEY";

/// Where the backend lives and which public key identifies this app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash (e.g. `https://xyz.example.co`).
    pub base_url: String,
    /// Public key sent as the `apikey` header on every request.
    pub anon_key: String,
}

impl ClientConfig {
    /// Build a configuration, normalising the base URL.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, SdkError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(SdkError::Config(format!(
                "base URL must start with http:// or https://, got `{base_url}`"
            )));
        }
        if anon_key.trim().is_empty() {
            return Err(SdkError::Config("anon key must not be empty".into()));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            anon_key: anon_key.trim().to_string(),
        })
    }

    /// Build the configuration from environment variables.
    ///
    /// | Variable                | Description                    |
    /// |-------------------------|--------------------------------|
    /// | `UNILIFE_DATA_URL`      | Backend base URL (required)    |
    /// | `UNILIFE_DATA_ANON_KEY` | Backend public key (required)  |
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let base_url = lookup(ENV_DATA_URL)
            .ok_or_else(|| SdkError::Config(format!("{ENV_DATA_URL} is not set")))?;
        let anon_key = lookup(ENV_DATA_ANON_KEY)
            .ok_or_else(|| SdkError::Config(format!("{ENV_DATA_ANON_KEY} is not set")))?;
        Self::new(&base_url, &anon_key)
    }
}

/// Session behaviour of a [`DataClient`](crate::DataClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Keep the session beyond the process. Must stay `false`: the identity
    /// provider is the source of truth for session lifetime.
    pub persist_session: bool,
    /// Let the client refresh its own token. Must stay `false`: the session
    /// bridge drives refresh timing.
    pub auto_refresh_token: bool,
    /// Upper bound on real-time events per second.
    pub events_per_second: u32,
    /// Database schema addressed by REST calls.
    pub schema: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: false,
            auto_refresh_token: false,
            events_per_second: 2,
            schema: "public".to_string(),
        }
    }
}

impl ClientOptions {
    /// Reject settings that would let the client fight the session bridge.
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.persist_session {
            return Err(SdkError::Config(
                "persist_session must be disabled; session lifetime belongs to the identity provider"
                    .into(),
            ));
        }
        if self.auto_refresh_token {
            return Err(SdkError::Config(
                "auto_refresh_token must be disabled; the session bridge refreshes tokens".into(),
            ));
        }
        if self.events_per_second == 0 {
            return Err(SdkError::Config("events_per_second must be at least 1".into()));
        }
        if self.schema.trim().is_empty() {
            return Err(SdkError::Config("schema must not be empty".into()));
        }
        Ok(())
    }
}
