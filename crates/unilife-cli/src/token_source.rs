//! Identity tokens for a headless session.
//!
//! A desktop or mobile host gets tokens from its identity provider SDK. The
//! CLI has no interactive sign-in, so it reads them from a file that an
//! external helper keeps fresh, or takes a single token verbatim.

use std::path::PathBuf;

use tracing::debug;
use unilife_session::{AuthProvider, AuthProviderError, TokenRequest};

#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Re-read on every request, so a rotated file is picked up by the next
    /// refresh. An empty file means "no token right now".
    File(PathBuf),
    /// The same token every time; the session ends when it expires.
    Static(String),
}

impl AuthProvider for TokenSource {
    async fn get_token(&self, request: &TokenRequest) -> Result<Option<String>, AuthProviderError> {
        match self {
            TokenSource::File(path) => {
                debug!(path = %path.display(), skip_cache = request.skip_cache, "reading token file");
                let contents = tokio::fs::read_to_string(path).await?;
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            TokenSource::Static(token) => Ok(Some(token.clone())),
        }
    }
}
