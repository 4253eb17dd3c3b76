//! Single-flight token refresh coordination.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Duration;
use gigachat_domain::{AccessToken, TokenError, TokenStatus};
use tokio::sync::watch;

use crate::ports::{Clock, TokenSource};

/// Usable token lifetime. The provider issues 30-minute tokens; five
/// minutes of margin keep an in-flight request from racing the real expiry.
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 25;

/// Outcome of one refresh cycle, fanned out to every coalesced caller.
type RefreshOutcome = Result<AccessToken, TokenError>;

/// Cached token plus refresh-in-progress marker.
///
/// Both fields are mutated under one lock: deciding "cache hit", "join the
/// in-flight refresh", or "become the refresh leader" happens in a single
/// critical section, so two tasks can never both observe an idle state and
/// start competing refreshes. The lock is never held across an `.await`.
struct CoordinatorState {
    cached: Option<AccessToken>,
    /// `Some` exactly while a refresh is in flight. Waiters clone the
    /// receiver and await the published outcome.
    inflight: Option<watch::Receiver<Option<RefreshOutcome>>>,
}

/// What the locked triage decided for one `token()` call.
enum Role {
    /// A refresh is already running; await its broadcast outcome.
    Waiter(watch::Receiver<Option<RefreshOutcome>>),
    /// This call owns the refresh and publishes the outcome.
    Leader(watch::Sender<Option<RefreshOutcome>>),
}

/// Coordinates bearer-token acquisition against one token endpoint.
///
/// At most one outstanding refresh request exists at any time, no matter
/// how many tasks observe a missing or expired token simultaneously: the
/// first becomes the leader, the rest suspend on the leader's broadcast
/// channel and receive the identical token or the identical failure.
///
/// Construct one instance at the composition root and share it via `Arc`.
pub struct TokenCoordinator {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<CoordinatorState>,
}

impl TokenCoordinator {
    /// Creates a coordinator with the default 25-minute token lifetime.
    #[must_use]
    pub fn new(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            state: Mutex::new(CoordinatorState {
                cached: None,
                inflight: None,
            }),
        }
    }

    /// Overrides the usable token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns a bearer token, fetching one if needed.
    ///
    /// With `force_refresh` false, a cached token that is still valid is
    /// returned without I/O. Otherwise the call either joins a refresh that
    /// is already in flight or performs one itself; either way all callers
    /// coalesced on the same refresh observe the same outcome.
    ///
    /// # Errors
    /// Returns `TokenError` when the refresh fails. A failed refresh leaves
    /// a previously cached token in place.
    pub async fn token(&self, force_refresh: bool) -> Result<String, TokenError> {
        let role = {
            let mut state = self.lock_state();
            if !force_refresh
                && let Some(token) = &state.cached
                && token.is_valid_at(self.clock.now())
            {
                return Ok(token.secret.clone());
            }
            if let Some(rx) = &state.inflight {
                Role::Waiter(rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                state.inflight = Some(rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Waiter(rx) => Self::wait_for_refresh(rx).await,
            Role::Leader(tx) => self.run_refresh(&tx).await,
        }
        .map(|token| token.secret)
    }

    /// Clears the cache and fetches a fresh token unconditionally.
    ///
    /// # Errors
    /// Returns `TokenError` when the refresh fails.
    pub async fn force_refresh(&self) -> Result<String, TokenError> {
        self.lock_state().cached = None;
        self.token(true).await
    }

    /// Drops the cached token so the next `token()` call refreshes.
    ///
    /// Called when the provider rejects the token before its tracked expiry.
    pub fn invalidate(&self) {
        self.lock_state().cached = None;
        tracing::debug!("cached token invalidated");
    }

    /// Snapshot of the cached token state. No I/O, no mutation.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        self.lock_state()
            .cached
            .as_ref()
            .map_or_else(TokenStatus::empty, |token| {
                TokenStatus::of(token, self.clock.now())
            })
    }

    /// Performs the single network refresh and publishes its outcome.
    async fn run_refresh(&self, tx: &watch::Sender<Option<RefreshOutcome>>) -> RefreshOutcome {
        tracing::info!("requesting new access token");
        // Restores the idle state even if this task is dropped mid-fetch;
        // the dropped sender then wakes waiters with `Interrupted`.
        let mut guard = RefreshGuard::new(&self.state);

        let fetched = self.source.fetch_token().await;
        let outcome = {
            let mut state = self.lock_state();
            state.inflight = None;
            match fetched {
                Ok(secret) => {
                    let token = AccessToken::new(secret, self.clock.now(), self.ttl);
                    state.cached = Some(token.clone());
                    Ok(token)
                }
                // A previously cached token stays in place; it may still
                // be valid even though this refresh failed.
                Err(err) => Err(err),
            }
        };
        guard.disarm();

        match &outcome {
            Ok(token) => {
                tracing::info!(expires_at = %token.expires_at, "access token obtained");
            }
            Err(err) => tracing::warn!(error = %err, "token refresh failed"),
        }
        // Waiters may all have given up; an unreceived broadcast is fine.
        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    /// Suspends until the in-flight refresh publishes its outcome.
    async fn wait_for_refresh(
        mut rx: watch::Receiver<Option<RefreshOutcome>>,
    ) -> RefreshOutcome {
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // The leader was dropped without publishing.
                return Err(TokenError::Interrupted);
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TokenCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCoordinator")
            .field("ttl", &self.ttl)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight marker on drop unless the refresh published first.
struct RefreshGuard<'a> {
    state: &'a Mutex<CoordinatorState>,
    armed: bool,
}

impl<'a> RefreshGuard<'a> {
    const fn new(state: &'a Mutex<CoordinatorState>) -> Self {
        Self { state, armed: true }
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .inflight = None;
        }
    }
}
