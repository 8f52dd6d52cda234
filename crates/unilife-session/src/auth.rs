//! The identity-provider seam.

use std::future::Future;

/// Error returned by an [`AuthProvider`].
pub type AuthProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Parameters of a token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Name of the provider-side template that shapes the token's claims
    /// for the backend.
    pub template: String,
    /// Bypass any token the provider has cached and mint a new one.
    pub skip_cache: bool,
}

/// Source of identity tokens.
///
/// Implemented by the host application on top of its identity provider
/// SDK. The bridge treats it as an opaque capability and never assumes it
/// is cheap or reliable.
///
/// # Example
///
/// ```rust,ignore
/// impl AuthProvider for ProviderSession {
///     async fn get_token(&self, request: &TokenRequest) -> Result<Option<String>, AuthProviderError> {
///         let token = self.sdk.get_token(&request.template, request.skip_cache).await?;
///         Ok(token)
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync + 'static {
    /// Fetch a token for the signed-in user.
    ///
    /// `Ok(None)` means the provider had no token to give (for example the
    /// session is being torn down); the bridge treats it like a failure and
    /// retries later.
    fn get_token(
        &self,
        request: &TokenRequest,
    ) -> impl Future<Output = Result<Option<String>, AuthProviderError>> + Send;
}
