//! What identity tokens get bound to.
//!
//! The bridge constructs a client once per sign-in through a
//! [`ClientFactory`] and afterwards only ever calls
//! [`SessionClient::rebind`] on that same instance.

use std::fmt::Display;
use std::future::Future;

use unilife_sdk::{ClientConfig, ClientOptions, DataClient, SdkError};

/// A client whose session can be rebound to a new token in place.
pub trait SessionClient: Send + Sync + 'static {
    /// Error from creating or rebinding the client.
    type Error: Display + Send + 'static;

    /// Replace the bound token. On error the previous token must stay bound.
    fn rebind(&self, token: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Builds the first client of a signed-in session.
pub trait ClientFactory: Send + 'static {
    /// The client type produced.
    type Client: SessionClient;

    /// Construct a client bound to `token`.
    fn create(&self, token: &str) -> Result<Self::Client, <Self::Client as SessionClient>::Error>;
}

impl SessionClient for DataClient {
    type Error = SdkError;

    async fn rebind(&self, token: &str) -> Result<(), SdkError> {
        self.set_session(token)
    }
}

/// Produces [`DataClient`]s for one backend.
#[derive(Debug, Clone)]
pub struct DataClientFactory {
    config: ClientConfig,
    options: ClientOptions,
}

impl DataClientFactory {
    /// Factory for clients against `config` using `options`.
    pub fn new(config: ClientConfig, options: ClientOptions) -> Self {
        Self { config, options }
    }
}

impl ClientFactory for DataClientFactory {
    type Client = DataClient;

    fn create(&self, token: &str) -> Result<DataClient, SdkError> {
        DataClient::new(self.config.clone(), self.options.clone(), token)
    }
}
