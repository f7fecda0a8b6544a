use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;

use crate::access::AccessPolicy;
use crate::config::AppConfig;
use crate::identity::{IdentityError, IdentityState};
use crate::menu::{DASHBOARD_PATH, LOGIN_PATH};
use crate::models::UserProfile;
use crate::roles::Role;
use crate::session::SessionStore;

// --- Auth State ---

/// AuthState
///
/// The four states one hydration cycle can be in. `Loading` is always the
/// initial state of every fresh cycle; it is never restored from storage.
/// While loading, no protected content may be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Loading,
    Authenticated,
    NoAuth,
    /// A failed identity check, with a human-readable message for display.
    Error(String),
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }
}

/// AuthSnapshot
///
/// The state one cycle has resolved to, plus the profile it resolved. The
/// route guard reads snapshots and nothing else; it re-evaluates on every
/// call, so consumers always see the latest committed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub state: AuthState,
    pub user: Option<UserProfile>,
}

impl AuthSnapshot {
    fn loading() -> Self {
        Self {
            state: AuthState::Loading,
            user: None,
        }
    }

    fn no_auth() -> Self {
        Self {
            state: AuthState::NoAuth,
            user: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            state: AuthState::Error(message),
            user: None,
        }
    }

    fn authenticated(user: UserProfile) -> Self {
        Self {
            state: AuthState::Authenticated,
            user: Some(user),
        }
    }

    /// The resolved role of the authenticated user, if any. Unresolvable role
    /// strings yield `None` and fail every gated check downstream.
    pub fn resolved_role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|u| u.resolved_role())
    }
}

// --- Navigation Seam ---

/// Navigator
///
/// The redirect seam. The hydrator and guard express "go to the login screen"
/// through this trait; the presentation shell decides what a navigation
/// physically means.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

pub type NavigatorState = Arc<dyn Navigator>;

/// RecordingNavigator
///
/// Queues requested targets for the embedding shell (or a test) to drain.
/// Doubles as the reference implementation of the seam.
#[derive(Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every navigation requested so far, oldest first.
    pub fn drain(&self) -> Vec<String> {
        match self.targets.lock() {
            Ok(mut targets) => std::mem::take(&mut *targets),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// The most recently requested target, without consuming the queue.
    pub fn last(&self) -> Option<String> {
        match self.targets.lock() {
            Ok(targets) => targets.last().cloned(),
            Err(poisoned) => poisoned.into_inner().last().cloned(),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        match self.targets.lock() {
            Ok(mut targets) => targets.push(target.to_string()),
            Err(poisoned) => poisoned.into_inner().push(target.to_string()),
        }
    }
}

// --- Session Hydrator ---

/// SessionHydrator
///
/// Reconciles the persisted session against the remote identity endpoint and
/// owns the in-memory auth state. One `hydrate` call is one cycle; cycles are
/// identified by a generation counter, and a cycle that is no longer current
/// can neither commit state nor issue redirects. Login, logout, and the
/// cross-cutting unauthorized handler each start a new generation, so a stale
/// in-flight identity check cannot overwrite their outcome.
///
/// The hydrator absorbs identity-check failures into state transitions; the
/// only error that crosses its boundary is a login failure, which the form
/// layer displays.
pub struct SessionHydrator {
    store: SessionStore,
    identity: IdentityState,
    policy: Arc<AccessPolicy>,
    navigator: NavigatorState,
    trusted_session_cache: bool,
    identity_timeout: Duration,
    state: Mutex<AuthSnapshot>,
    generation: AtomicU64,
}

impl SessionHydrator {
    pub fn new(
        store: SessionStore,
        identity: IdentityState,
        policy: Arc<AccessPolicy>,
        navigator: NavigatorState,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            identity,
            policy,
            navigator,
            // AppConfig::load only ever sets this in Env::Local.
            trusted_session_cache: config.trusted_session_cache,
            identity_timeout: config.identity_timeout,
            state: Mutex::new(AuthSnapshot::loading()),
            generation: AtomicU64::new(0),
        }
    }

    /// The latest committed snapshot. Cheap; the guard calls this on every
    /// evaluation.
    pub fn snapshot(&self) -> AuthSnapshot {
        match self.state.lock() {
            Ok(snapshot) => snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().state.is_loading()
    }

    pub fn navigator(&self) -> &NavigatorState {
        &self.navigator
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn policy(&self) -> &Arc<AccessPolicy> {
        &self.policy
    }

    /// hydrate
    ///
    /// Runs one full hydration cycle for the given current location:
    ///
    /// 1. No stored token resolves to `NoAuth`; a protected location redirects
    ///    to the login screen.
    /// 2. With a token, either adopt the cached profile (trusted cache only)
    ///    or verify against the identity endpoint under a timeout. A valid
    ///    profile refreshes the cache and resolves `Authenticated`; an empty
    ///    identity resolves `NoAuth`; a rejected token clears the store and
    ///    resolves `Error`; transport failures and timeouts resolve `Error`.
    ///    Every non-authenticated terminal redirects protected locations to
    ///    the login screen.
    /// 3. An authenticated user sitting on the login screen is redirected to
    ///    the dashboard.
    ///
    /// Steps execute strictly in order within one cycle; a cycle superseded
    /// while suspended commits nothing.
    pub async fn hydrate(&self, current_path: &str) {
        let generation = self.begin_cycle();
        self.commit(generation, AuthSnapshot::loading());

        // Step 1: cheap token presence check before any network traffic.
        let Some(token) = self.store.token() else {
            tracing::debug!("no stored access token, resolving to no-auth");
            self.commit(generation, AuthSnapshot::no_auth());
            self.redirect_if_protected(generation, current_path);
            return;
        };

        // Step 2a: trusted-environment fast path. Off unless explicitly
        // configured, and AppConfig only allows it in Env::Local.
        if self.trusted_session_cache {
            if let Some(session) = self.store.get() {
                tracing::warn!(
                    username = %session.user.username,
                    "adopting cached profile WITHOUT remote verification (trusted session cache)"
                );
                self.commit(generation, AuthSnapshot::authenticated(session.user));
                self.redirect_away_from_login(generation, current_path);
                return;
            }
            // Token without a readable profile: fall through to verification.
        }

        // Step 2b: verification path, bounded by the configured timeout.
        match timeout(self.identity_timeout, self.identity.me(&token)).await {
            Ok(Ok(Some(profile))) => {
                // Refresh the cached profile, tokens rewritten unchanged. A
                // superseded cycle must not repopulate a store that a newer
                // logout has already cleared, so the rewrite is gated too.
                if self.is_current(generation) {
                    let refresh = self.store.get().and_then(|s| s.refresh_token);
                    self.store.set(&token, refresh.as_deref(), &profile);
                    if !self.is_current(generation) {
                        // A logout raced the rewrite; restore its cleared store.
                        self.store.clear();
                    }
                }
                tracing::debug!(username = %profile.username, role = %profile.role, "identity verified");
                self.commit(generation, AuthSnapshot::authenticated(profile));
                self.redirect_away_from_login(generation, current_path);
            }
            Ok(Ok(None)) => {
                // Well-formed response, no usable identity. Treated leniently
                // as an absent session; no extra cache clearing.
                tracing::debug!("identity endpoint yielded no profile, resolving to no-auth");
                self.commit(generation, AuthSnapshot::no_auth());
                self.redirect_if_protected(generation, current_path);
            }
            Ok(Err(IdentityError::Unauthorized)) => {
                // Security event: the token is known-invalid, so caching it
                // further is actively harmful.
                tracing::warn!("stored token rejected by identity endpoint, clearing session");
                self.store.clear();
                self.commit(
                    generation,
                    AuthSnapshot::error(IdentityError::Unauthorized.to_string()),
                );
                self.redirect_if_protected(generation, current_path);
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "identity verification failed");
                self.commit(generation, AuthSnapshot::error(e.to_string()));
                self.redirect_if_protected(generation, current_path);
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.identity_timeout.as_secs(),
                    "identity verification timed out"
                );
                self.commit(
                    generation,
                    AuthSnapshot::error(
                        "la verificación de identidad superó el tiempo de espera".to_string(),
                    ),
                );
                self.redirect_if_protected(generation, current_path);
            }
        }
    }

    /// login
    ///
    /// Exchanges credentials for a session. On success the store is written,
    /// the state becomes `Authenticated`, and the shell is sent to the
    /// dashboard. On failure the error propagates to the caller and the store
    /// is left untouched; there is no automatic retry.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, IdentityError> {
        let response = self.identity.login(username, password).await?;

        self.store.set(
            &response.access_token,
            response.refresh_token.as_deref(),
            &response.user,
        );

        let generation = self.begin_cycle();
        tracing::info!(username = %response.user.username, "login succeeded");
        self.commit(generation, AuthSnapshot::authenticated(response.user.clone()));
        self.navigator.navigate(DASHBOARD_PATH);
        Ok(response.user)
    }

    /// logout
    ///
    /// Unconditional: clears the store, resets the in-memory state, redirects
    /// to the login screen. Never fails, never blocks.
    pub fn logout(&self) {
        let generation = self.begin_cycle();
        self.store.clear();
        self.commit(generation, AuthSnapshot::no_auth());
        self.navigator.navigate(LOGIN_PATH);
        tracing::info!("session closed");
    }

    /// handle_unauthorized
    ///
    /// The cross-cutting contract for any authenticated API call that comes
    /// back unauthorized: clear the session and force navigation to the login
    /// screen, uniformly across all call sites.
    pub fn handle_unauthorized(&self) {
        tracing::warn!("authenticated request rejected, forcing logout");
        let generation = self.begin_cycle();
        self.store.clear();
        self.commit(generation, AuthSnapshot::no_auth());
        self.navigator.navigate(LOGIN_PATH);
    }

    // --- Cycle Bookkeeping ---

    /// Starts a new generation, invalidating any cycle still in flight.
    fn begin_cycle(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Commits a snapshot only while the cycle is still current. Last writer
    /// wins is exactly what this prevents: a superseded cycle loses.
    fn commit(&self, generation: u64, snapshot: AuthSnapshot) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding result of superseded hydration cycle");
            return false;
        }
        match self.state.lock() {
            Ok(mut state) => *state = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        true
    }

    fn redirect(&self, generation: u64, target: &str) {
        if self.is_current(generation) {
            self.navigator.navigate(target);
        }
    }

    fn redirect_if_protected(&self, generation: u64, current_path: &str) {
        if self.policy.is_protected(current_path) {
            self.redirect(generation, LOGIN_PATH);
        }
    }

    fn redirect_away_from_login(&self, generation: u64, current_path: &str) {
        // An authenticated user must not be left sitting on the login form.
        if current_path == LOGIN_PATH {
            self.redirect(generation, DASHBOARD_PATH);
        }
    }
}
