//! # unilife Session
//!
//! Keeps an authenticated data client alive for as long as the user is
//! signed in.
//!
//! The [`SessionBridge`] sits between two collaborators that each own half
//! of a session:
//!
//! ```text
//!  identity provider                      backend
//!  (AuthProvider)                         (ClientFactory / SessionClient)
//!        │ get_token(template, skip_cache)        ▲ create / rebind
//!        ▼                                        │
//!   ┌──────────────────── SessionBridge actor ────┴───┐
//!   │ sign-in/out ─┐                                  │
//!   │ foreground ──┼─► acquire ─► bind ─► schedule ◄──┤ RefreshTimer
//!   │ timer fired ─┘   (one in flight)   (one pending)│
//!   └──────────────┬──────────────────────────────────┘
//!                  ▼ watch::Receiver<SessionView>
//!              consumers
//! ```
//!
//! * [`AuthProvider`]: where tokens come from.
//! * [`SessionClient`] / [`ClientFactory`]: what tokens are bound to.
//! * [`RefreshPolicy`]: when the next refresh happens.
//! * [`RefreshTimer`]: the single pending refresh.
//! * [`SessionBridge`] / [`SessionHandle`]: lifecycle and observation.

pub mod auth;
pub mod binding;
pub mod bridge;
pub mod config;
pub mod policy;
pub mod timer;

pub use auth::{AuthProvider, AuthProviderError, TokenRequest};
pub use binding::{ClientFactory, DataClientFactory, SessionClient};
pub use bridge::{AppVisibility, SessionBridge, SessionHandle, SessionState, SessionView};
pub use config::{BridgeConfig, ConfigError};
pub use policy::RefreshPolicy;
pub use timer::RefreshTimer;
