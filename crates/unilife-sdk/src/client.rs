//! Token-bound HTTP client for the unilife backend.
//!
//! [`DataClient`] attaches the current identity token to every request.
//! The token lives behind a lock so that the session bridge can rebind it
//! in place: consumers holding an `Arc<DataClient>` pick up the fresh token
//! on their next request without the client being reconstructed.
//!
//! # Typical usage
//!
//! ```rust,no_run
//! use unilife_sdk::{ClientConfig, ClientOptions, DataClient, Tables};
//!
//! # async fn run(token: &str) -> Result<(), unilife_sdk::SdkError> {
//! let config = ClientConfig::new("https://abc.example.co", "anon-key")?;
//! let client = DataClient::new(config, ClientOptions::default(), token)?;
//!
//! let rows: Vec<serde_json::Value> = client
//!     .from_table(Tables::COURSES)
//!     .select("id,name")
//!     .eq("user_id", "user_2abc")
//!     .execute()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{PoisonError, RwLock};

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ClientOptions};
use crate::error::SdkError;
use crate::tables::Tables;
use crate::token::{IdentityToken, TokenError};

/// Authenticated handle to the backend.
///
/// Exactly one token is bound at a time; see [`set_session`](Self::set_session).
pub struct DataClient {
    http: reqwest::Client,
    config: ClientConfig,
    options: ClientOptions,
    session: RwLock<IdentityToken>,
}

impl DataClient {
    // ------------------------------------------------------------------
    // Construction & session
    // ------------------------------------------------------------------

    /// Create a client bound to `token`.
    ///
    /// Fails when `options` would let the client manage its own session or
    /// when `token` is not shaped like a JWT.
    pub fn new(config: ClientConfig, options: ClientOptions, token: &str) -> Result<Self, SdkError> {
        options.validate()?;
        let token = checked_token(token)?;

        debug!(
            base_url = %config.base_url,
            schema = %options.schema,
            events_per_second = options.events_per_second,
            "data client created"
        );

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            options,
            session: RwLock::new(token),
        })
    }

    /// Rebind the session to a new token, in place.
    ///
    /// On error the previously bound token stays in effect.
    pub fn set_session(&self, token: &str) -> Result<(), SdkError> {
        let token = checked_token(token)?;
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        *guard = token;
        Ok(())
    }

    /// The currently bound token.
    pub fn session_token(&self) -> IdentityToken {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Endpoint configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Session options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// URL of the real-time change feed, rate-limited per
    /// [`ClientOptions::events_per_second`]. Query values are encoded.
    pub fn realtime_url(&self) -> Result<Url, SdkError> {
        let base = &self.config.base_url;
        let ws_base = base
            .strip_prefix("https://")
            .map(|rest| format!("wss://{rest}"))
            .or_else(|| base.strip_prefix("http://").map(|rest| format!("ws://{rest}")))
            .unwrap_or_else(|| base.clone());
        let events_per_second = self.options.events_per_second.to_string();
        Url::parse_with_params(
            &format!("{ws_base}{}", Tables::realtime_path()),
            [
                ("apikey", self.config.anon_key.as_str()),
                ("eventsPerSecond", events_per_second.as_str()),
                ("vsn", "1.0.0"),
            ],
        )
        .map_err(|e| SdkError::Config(format!("invalid real-time URL: {e}")))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Start a query against `table`.
    pub fn from_table(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder {
            client: self,
            table: table.to_string(),
            params: Vec::new(),
            filtered: false,
        }
    }

    fn request(&self, method: Method, table: &str, params: &[(String, String)]) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, Tables::rest_path(table));
        let profile_header = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        let token = self.session_token();

        self.http
            .request(method, url)
            .query(params)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token.as_str())
            .header(profile_header, &self.options.schema)
    }
}

/// Reject tokens that cannot possibly be a JWT before binding them.
fn checked_token(token: &str) -> Result<IdentityToken, SdkError> {
    let segments = token.trim().split('.').filter(|s| !s.is_empty()).count();
    if segments != 3 {
        return Err(TokenError::Segments(segments).into());
    }
    Ok(IdentityToken::new(token.trim()))
}

/// Turn non-success statuses into [`SdkError::Api`].
async fn check_status(res: Response) -> Result<Response, SdkError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| body["message"].as_str().map(String::from))
        .unwrap_or(text);

    warn!(status = status.as_u16(), error = %message, "backend request failed");
    Err(SdkError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Builder for a single REST call, PostgREST filter syntax.
#[must_use]
pub struct QueryBuilder<'a> {
    client: &'a DataClient,
    table: String,
    params: Vec<(String, String)>,
    filtered: bool,
}

impl QueryBuilder<'_> {
    /// Columns to return (`*` for all).
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.params.push((column.into(), format!("eq.{value}")));
        self.filtered = true;
        self
    }

    /// Keep rows where `column` is one of `values`.
    pub fn in_(mut self, column: &str, values: &[&str]) -> Self {
        let quoted: Vec<String> = values
            .iter()
            .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect();
        self.params
            .push((column.into(), format!("in.({})", quoted.join(","))));
        self.filtered = true;
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".into(), format!("{column}.{direction}")));
        self
    }

    /// Run a `GET` and decode the rows.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, SdkError> {
        debug!(table = %self.table, "select");
        let res = self
            .client
            .request(Method::GET, &self.table, &self.params)
            .send()
            .await?;
        let res = check_status(res).await?;
        Ok(res.json().await?)
    }

    /// Insert one row.
    pub async fn insert<T: Serialize + ?Sized>(self, row: &T) -> Result<(), SdkError> {
        debug!(table = %self.table, "insert");
        let body = serde_json::to_value(row)?;
        let res = self
            .client
            .request(Method::POST, &self.table, &self.params)
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }

    /// Patch every row matching the filters.
    ///
    /// Refuses to run without at least one filter.
    pub async fn update<T: Serialize + ?Sized>(self, patch: &T) -> Result<(), SdkError> {
        self.require_filter("update")?;
        debug!(table = %self.table, "update");
        let body = serde_json::to_value(patch)?;
        let res = self
            .client
            .request(Method::PATCH, &self.table, &self.params)
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }

    /// Delete every row matching the filters.
    ///
    /// Refuses to run without at least one filter.
    pub async fn delete(self) -> Result<(), SdkError> {
        self.require_filter("delete")?;
        debug!(table = %self.table, "delete");
        let res = self
            .client
            .request(Method::DELETE, &self.table, &self.params)
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }

    fn require_filter(&self, operation: &str) -> Result<(), SdkError> {
        if self.filtered {
            Ok(())
        } else {
            Err(SdkError::Config(format!(
                "refusing to {operation} `{}` without a filter",
                self.table
            )))
        }
    }
}
