//! # unilife SDK
//!
//! Data-access layer for the **unilife** backend, a PostgREST-style HTTP
//! API guarded by short-lived bearer tokens issued by a hosted identity
//! provider.
//!
//! The SDK provides:
//!
//! * [`DataClient`] — token-bound HTTP client whose session can be rebound
//!   in place when the token is refreshed.
//! * [`IdentityToken`] / [`decode_expiry`] — read the expiry embedded in a
//!   bearer token without verifying it.
//! * [`Tables`] — canonical table names and REST paths.
//! * [`ClientConfig`] / [`ClientOptions`] — endpoint and session settings.
//! * [`SdkError`] — unified error type for all SDK operations.
//!
//! Records from [`unilife_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use unilife_sdk::{ClientConfig, ClientOptions, DataClient, UserId};
//!
//! # async fn run(token: &str) -> Result<(), unilife_sdk::SdkError> {
//! let config = ClientConfig::from_env()?;
//! let client = DataClient::new(config, ClientOptions::default(), token)?;
//!
//! let courses = client.list_courses(&UserId::new("user_2abc")).await?;
//! println!("{} course(s)", courses.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod repo;
pub mod tables;
pub mod token;

pub use client::{DataClient, QueryBuilder};
pub use config::{ClientConfig, ClientOptions};
pub use error::SdkError;
pub use tables::Tables;
pub use token::{decode_expiry, IdentityToken, TokenClaims, TokenError};

// Re-export records from unilife-models for ergonomic usage.
pub use unilife_models::{ClassItem, Course, Task, TaskPriority, TaskStatus, UserId};
