//! The session bridge actor.
//!
//! All session state (bound token, client, refresh timer, in-flight flag)
//! lives in one spawned task and is mutated only while handling an
//! [`Event`]. Everything else talks to that task through a channel:
//!
//! ```text
//!  SessionHandle ──┐
//!  RefreshTimer  ──┼──► mpsc<Event> ──► Actor ──► watch<SessionView>
//!  acquisitions  ──┘                      │
//!                                         └──► spawn get_token(..)
//! ```
//!
//! Acquisitions carry the session epoch they were started in; a result
//! arriving after a sign-out (or a sign-out followed by a new sign-in) has
//! a stale epoch and is dropped.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use unilife_sdk::IdentityToken;

use crate::auth::{AuthProvider, TokenRequest};
use crate::binding::{ClientFactory, SessionClient};
use crate::config::BridgeConfig;
use crate::policy::RefreshPolicy;
use crate::timer::RefreshTimer;

/// Host application visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppVisibility {
    Foreground,
    Background,
}

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Signed out, or not told otherwise yet.
    Unauthenticated,
    /// A token is being fetched, or the last attempt failed and a retry is
    /// scheduled.
    Acquiring,
    /// A client is bound to a fresh token.
    Authenticated,
}

/// What consumers observe.
pub struct SessionView<C> {
    pub state: SessionState,
    /// `None` while signed out or before the first token arrived.
    pub client: Option<Arc<C>>,
    /// True from `init` until the first [`SessionHandle::set_signed_in`]
    /// is handled. Never cleared without it.
    pub loading: bool,
    /// When the next refresh is due, if one is scheduled.
    pub next_refresh: Option<Instant>,
}

impl<C> SessionView<C> {
    fn initial() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            client: None,
            loading: true,
            next_refresh: None,
        }
    }
}

impl<C> Clone for SessionView<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            client: self.client.clone(),
            loading: self.loading,
            next_refresh: self.next_refresh,
        }
    }
}

impl<C> fmt::Debug for SessionView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionView")
            .field("state", &self.state)
            .field("has_client", &self.client.is_some())
            .field("loading", &self.loading)
            .field("next_refresh", &self.next_refresh)
            .finish()
    }
}

enum Event {
    SignedIn(bool),
    Visibility(AppVisibility),
    RefreshRequested,
    TimerFired(u64),
    Acquired {
        epoch: u64,
        outcome: Result<Option<String>, String>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable sender of lifecycle notifications.
///
/// Sending never fails from the caller's point of view; notifications sent
/// after the bridge was disposed are dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl SessionHandle {
    /// Report the identity provider's signed-in state.
    pub fn set_signed_in(&self, signed_in: bool) {
        self.send(Event::SignedIn(signed_in));
    }

    /// Report a foreground/background transition of the host app.
    pub fn set_visibility(&self, visibility: AppVisibility) {
        self.send(Event::Visibility(visibility));
    }

    /// Ask for a cache-bypassing refresh, e.g. after a request came back
    /// unauthorized. Subject to the same throttle as foreground resumption.
    pub fn request_refresh(&self) {
        self.send(Event::RefreshRequested);
    }

    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("session bridge stopped, notification dropped");
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Owns a data client bound to a fresh identity token.
///
/// ```rust,ignore
/// let bridge = SessionBridge::init(provider, DataClientFactory::new(config, options), bridge_config);
/// bridge.handle().set_signed_in(true);
///
/// let mut view = bridge.subscribe();
/// view.wait_for(|v| v.client.is_some()).await?;
/// let courses = bridge.client().unwrap().list_courses(&user).await?;
///
/// bridge.dispose().await;
/// ```
pub struct SessionBridge<C> {
    handle: SessionHandle,
    view: watch::Receiver<SessionView<C>>,
    task: Option<JoinHandle<()>>,
}

impl<C: SessionClient> SessionBridge<C> {
    /// Start the bridge. Must be called inside a tokio runtime.
    ///
    /// The bridge starts signed out and loading. The host must report the
    /// identity provider's state through [`SessionHandle::set_signed_in`]
    /// once it is known, signed in or not: `is_loading()` stays true until
    /// that first notification arrives.
    pub fn init<A, F>(auth: A, factory: F, config: BridgeConfig) -> Self
    where
        A: AuthProvider,
        F: ClientFactory<Client = C>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(SessionView::initial());
        debug!(template = %config.token_template, "starting session bridge");

        let actor = Actor {
            auth: Arc::new(auth),
            factory,
            template: config.token_template,
            policy: config.policy,
            tx: tx.downgrade(),
            view: view_tx,
            state: SessionState::Unauthenticated,
            initialized: false,
            signed_in: false,
            epoch: 0,
            bound: None,
            client: None,
            timer: RefreshTimer::new(),
            in_flight: None,
            acquisition: None,
            coalesced_force: false,
            failures: 0,
            last_attempt: None,
        };
        let task = tokio::spawn(actor.run(rx));

        Self {
            handle: SessionHandle { tx },
            view: view_rx,
            task: Some(task),
        }
    }

    /// The current client, or `None` while signed out or not yet ready.
    pub fn client(&self) -> Option<Arc<C>> {
        self.view.borrow().client.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.borrow().loading
    }

    pub fn state(&self) -> SessionState {
        self.view.borrow().state
    }

    pub fn next_refresh(&self) -> Option<Instant> {
        self.view.borrow().next_refresh
    }

    /// Observe view changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionView<C>> {
        self.view.clone()
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the actor, cancel any pending refresh and drop the client.
    pub async fn dispose(mut self) {
        self.handle.send(Event::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "session bridge task ended abnormally");
            }
        }
    }
}

impl<C> Drop for SessionBridge<C> {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.handle.send(Event::Shutdown);
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct Actor<A, F: ClientFactory> {
    auth: Arc<A>,
    factory: F,
    template: String,
    policy: RefreshPolicy,
    tx: mpsc::WeakUnboundedSender<Event>,
    view: watch::Sender<SessionView<F::Client>>,

    state: SessionState,
    initialized: bool,
    signed_in: bool,
    epoch: u64,
    bound: Option<IdentityToken>,
    client: Option<Arc<F::Client>>,
    timer: RefreshTimer,
    /// `Some(forced)` while an acquisition is running.
    in_flight: Option<bool>,
    acquisition: Option<JoinHandle<()>>,
    coalesced_force: bool,
    failures: u32,
    last_attempt: Option<Instant>,
}

impl<A: AuthProvider, F: ClientFactory> Actor<A, F> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) {
        while let Some(event) = rx.recv().await {
            match event {
                Event::SignedIn(signed_in) => self.on_signed_in(signed_in),
                Event::Visibility(AppVisibility::Foreground) => self.force_throttled("foreground"),
                Event::Visibility(AppVisibility::Background) => {
                    debug!("app moved to background");
                }
                Event::RefreshRequested => self.force_throttled("requested"),
                Event::TimerFired(id) => self.on_timer(id),
                Event::Acquired { epoch, outcome } => self.on_acquired(epoch, outcome).await,
                Event::Shutdown => break,
            }
            self.publish();
        }

        self.clear();
        self.publish();
        debug!("session bridge stopped");
    }

    // ---- lifecycle ----------------------------------------------------------

    fn on_signed_in(&mut self, signed_in: bool) {
        self.initialized = true;
        if signed_in == self.signed_in {
            debug!(signed_in, "sign-in state unchanged");
            return;
        }

        self.signed_in = signed_in;
        self.epoch += 1;
        if signed_in {
            info!("signed in, acquiring token");
            self.trigger(false);
        } else {
            info!("signed out, dropping data client");
            self.clear();
        }
    }

    fn force_throttled(&mut self, reason: &'static str) {
        if !self.signed_in {
            debug!(reason, "not signed in, refresh skipped");
            return;
        }
        if let Some(last) = self.last_attempt {
            let since = last.elapsed();
            if since < self.policy.foreground_throttle {
                debug!(
                    reason,
                    since_secs = since.as_secs(),
                    "forced refresh throttled"
                );
                return;
            }
        }
        info!(reason, "forcing token refresh");
        self.trigger(true);
    }

    fn on_timer(&mut self, id: u64) {
        if self.timer.take_fired(id) {
            debug!(timer = id, "scheduled refresh due");
            self.trigger(true);
        } else {
            debug!(timer = id, "stale timer ignored");
        }
    }

    /// Drop everything tied to the current session.
    fn clear(&mut self) {
        self.timer.cancel();
        if let Some(task) = self.acquisition.take() {
            task.abort();
        }
        self.in_flight = None;
        self.coalesced_force = false;
        self.bound = None;
        self.client = None;
        self.failures = 0;
        self.last_attempt = None;
        self.state = SessionState::Unauthenticated;
    }

    // ---- acquisition --------------------------------------------------------

    fn trigger(&mut self, forced: bool) {
        if !self.signed_in {
            debug!("not signed in, acquisition skipped");
            return;
        }
        match self.in_flight {
            Some(false) if forced => {
                debug!("forced refresh queued behind running acquisition");
                self.coalesced_force = true;
                return;
            }
            Some(_) => {
                debug!(forced, "acquisition already running, trigger ignored");
                return;
            }
            None => {}
        }

        self.in_flight = Some(forced);
        self.last_attempt = Some(Instant::now());
        self.state = SessionState::Acquiring;

        let request = TokenRequest {
            template: self.template.clone(),
            skip_cache: forced,
        };
        let auth = Arc::clone(&self.auth);
        let tx = self.tx.clone();
        let epoch = self.epoch;
        debug!(epoch, skip_cache = forced, "requesting token");

        self.acquisition = Some(tokio::spawn(async move {
            let outcome = auth.get_token(&request).await.map_err(|e| e.to_string());
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Event::Acquired { epoch, outcome });
            }
        }));
    }

    async fn on_acquired(&mut self, epoch: u64, outcome: Result<Option<String>, String>) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "stale acquisition result dropped");
            return;
        }
        self.in_flight = None;
        self.acquisition = None;

        let result = match outcome {
            Ok(Some(raw)) => {
                let token = IdentityToken::new(raw);
                self.create_or_update_client(&token).await.map(|()| token)
            }
            Ok(None) => Err("identity provider returned no token".to_string()),
            Err(e) => Err(e),
        };

        match result {
            Ok(token) => {
                self.failures = 0;
                self.state = SessionState::Authenticated;
                self.schedule_refresh(&token);
            }
            Err(reason) => {
                self.failures = self.failures.saturating_add(1);
                let delay = self.policy.retry_delay(self.failures);
                warn!(
                    failures = self.failures,
                    retry_in_secs = delay.as_secs(),
                    error = %reason,
                    "token acquisition failed"
                );
                self.arm(delay);
            }
        }

        if std::mem::take(&mut self.coalesced_force) {
            self.trigger(true);
        }
    }

    /// Bind `token` to the client, creating it on first use.
    ///
    /// No-op when `token` is already bound. On error the previous token and
    /// client stay in place.
    async fn create_or_update_client(&mut self, token: &IdentityToken) -> Result<(), String> {
        if self.bound.as_ref() == Some(token) {
            debug!("token unchanged, client left as is");
            return Ok(());
        }

        match self.client.clone() {
            Some(client) => {
                client
                    .rebind(token.as_str())
                    .await
                    .map_err(|e| format!("rebinding client: {e}"))?;
                debug!(token = ?token, "client rebound");
            }
            None => {
                let client = self
                    .factory
                    .create(token.as_str())
                    .map_err(|e| format!("creating client: {e}"))?;
                self.client = Some(Arc::new(client));
                info!(token = ?token, "data client created");
            }
        }
        self.bound = Some(token.clone());
        Ok(())
    }

    // ---- scheduling ---------------------------------------------------------

    fn schedule_refresh(&mut self, token: &IdentityToken) {
        let delay = match token.expires_at() {
            Ok(expires_at) => {
                let delay = self.policy.refresh_delay(expires_at, Utc::now());
                debug!(%expires_at, refresh_in_secs = delay.as_secs(), "token expiry read");
                delay
            }
            Err(e) => {
                warn!(error = %e, "token expiry unreadable, using fallback delay");
                self.policy.fallback_delay
            }
        };
        self.arm(delay);
    }

    fn arm(&mut self, delay: std::time::Duration) {
        let tx = self.tx.clone();
        let id = self.timer.schedule(delay, move |id| {
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Event::TimerFired(id));
            }
        });
        debug!(timer = id, delay_secs = delay.as_secs(), "refresh scheduled");
    }

    fn publish(&self) {
        let state = self.state;
        let loading = !self.initialized;
        let next_refresh = self.timer.deadline();
        let client = self.client.clone();

        self.view.send_if_modified(|view| {
            let same_client = match (&view.client, &client) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same_client
                && view.state == state
                && view.loading == loading
                && view.next_refresh == next_refresh
            {
                return false;
            }
            *view = SessionView {
                state,
                client,
                loading,
                next_refresh,
            };
            true
        });
    }
}
