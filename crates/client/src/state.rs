//! Observable client auth state.
//!
//! Every async operation takes a [`RequestSeq`] from [`AuthStore::begin`] and
//! reports back through [`AuthStore::resolve`]. Only the most recently begun
//! operation may change the state; a slower, older response is dropped so it
//! can never overwrite what a newer one established.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use harvestgate_auth::{AuthView, Role};

/// The signed-in user as the client knows it.
///
/// Login returns the full account; `check-auth` only returns the decoded
/// token, so name and email are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionUser {
    /// `None` when the server sent a role this client does not know.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Immutable view of the auth state at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    user: Option<SessionUser>,
    loading: bool,
    error: Option<String>,
}

impl AuthSnapshot {
    /// Derived from `user`; the two can never disagree.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn auth_view(&self) -> AuthView {
        match &self.user {
            Some(user) => AuthView::Authenticated(user.role()),
            None => AuthView::Anonymous,
        }
    }
}

/// How a finished operation changes the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Login or auth check succeeded.
    SignedIn(SessionUser),
    /// Logout succeeded.
    SignedOut,
    /// Succeeded without touching the session (e.g. registering someone).
    Completed,
    /// Failed; `sign_out` drops the current user (login and auth check do).
    Failed { message: String, sign_out: bool },
}

/// Ticket for one in-flight operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestSeq(u64);

#[derive(Debug)]
pub struct AuthStore {
    tx: watch::Sender<AuthSnapshot>,
    latest: AtomicU64,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::default());
        Self {
            tx,
            latest: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    /// Start an operation: marks the state loading and supersedes anything
    /// still in flight.
    pub fn begin(&self) -> RequestSeq {
        let mut seq = 0;
        self.tx.send_modify(|s| {
            seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
            s.error = None;
        });
        RequestSeq(seq)
    }

    /// Apply an operation's outcome. Returns `false` (and changes nothing)
    /// when a newer operation has begun since `seq` was issued.
    pub fn resolve(&self, seq: RequestSeq, outcome: AuthOutcome) -> bool {
        self.resolve_with(seq, outcome, || {})
    }

    /// Like [`AuthStore::resolve`], running `effect` only if the outcome is
    /// applied. The sequence check, `effect` and the state change happen under
    /// one lock, so no `begin` can interleave.
    pub fn resolve_with(&self, seq: RequestSeq, outcome: AuthOutcome, effect: impl FnOnce()) -> bool {
        let applied = self.tx.send_if_modified(|s| {
            if self.latest.load(Ordering::SeqCst) != seq.0 {
                return false;
            }
            effect();
            s.loading = false;
            match outcome {
                AuthOutcome::SignedIn(user) => s.user = Some(user),
                AuthOutcome::SignedOut => s.user = None,
                AuthOutcome::Completed => {}
                AuthOutcome::Failed { message, sign_out } => {
                    if sign_out {
                        s.user = None;
                    }
                    s.error = Some(message);
                }
            }
            true
        });

        if !applied {
            tracing::debug!(seq = seq.0, "discarding superseded auth result");
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> SessionUser {
        SessionUser {
            id: "u-1".into(),
            role: role.into(),
            name: None,
            email: None,
        }
    }

    #[test]
    fn starts_signed_out() {
        let store = AuthStore::new();
        let s = store.snapshot();
        assert!(!s.is_authenticated());
        assert!(!s.loading());
        assert_eq!(s.auth_view(), AuthView::Anonymous);
    }

    #[test]
    fn sign_in_then_out() {
        let store = AuthStore::new();
        let seq = store.begin();
        assert!(store.snapshot().loading());

        assert!(store.resolve(seq, AuthOutcome::SignedIn(user("FARMER"))));
        let s = store.snapshot();
        assert!(s.is_authenticated());
        assert!(!s.loading());
        assert_eq!(s.auth_view(), AuthView::Authenticated(Some(Role::Farmer)));

        let seq = store.begin();
        store.resolve(seq, AuthOutcome::SignedOut);
        assert!(!store.snapshot().is_authenticated());
    }

    #[test]
    fn stale_result_cannot_override_newer_state() {
        let store = AuthStore::new();
        let slow_check = store.begin();
        let logout = store.begin();

        assert!(store.resolve(logout, AuthOutcome::SignedOut));
        assert!(!store.resolve(slow_check, AuthOutcome::SignedIn(user("ADMIN"))));
        assert!(!store.snapshot().is_authenticated());
    }

    #[test]
    fn side_effect_runs_only_for_the_latest_operation() {
        let store = AuthStore::new();
        let stale = store.begin();
        let latest = store.begin();

        let mut saved = Vec::new();
        assert!(!store.resolve_with(stale, AuthOutcome::SignedIn(user("ADMIN")), || saved.push("stale")));
        assert!(store.resolve_with(latest, AuthOutcome::SignedIn(user("FARMER")), || saved.push("latest")));
        assert_eq!(saved, ["latest"]);
        assert_eq!(store.snapshot().user().map(|u| u.role.as_str()), Some("FARMER"));
    }

    #[test]
    fn superseded_operation_keeps_loading_until_latest_resolves() {
        let store = AuthStore::new();
        let first = store.begin();
        let second = store.begin();
        store.resolve(first, AuthOutcome::Completed);
        assert!(store.snapshot().loading());
        store.resolve(second, AuthOutcome::Completed);
        assert!(!store.snapshot().loading());
    }

    #[test]
    fn failures_record_error_and_optionally_sign_out() {
        let store = AuthStore::new();
        let seq = store.begin();
        store.resolve(seq, AuthOutcome::SignedIn(user("OPERATOR")));

        let seq = store.begin();
        store.resolve(
            seq,
            AuthOutcome::Failed {
                message: "Email already exists".into(),
                sign_out: false,
            },
        );
        let s = store.snapshot();
        assert!(s.is_authenticated());
        assert_eq!(s.error(), Some("Email already exists"));

        let seq = store.begin();
        assert_eq!(store.snapshot().error(), None);
        store.resolve(
            seq,
            AuthOutcome::Failed {
                message: "Invalid or expired token".into(),
                sign_out: true,
            },
        );
        assert!(!store.snapshot().is_authenticated());
    }

    #[test]
    fn unknown_role_is_authenticated_without_role() {
        let store = AuthStore::new();
        let seq = store.begin();
        store.resolve(seq, AuthOutcome::SignedIn(user("AGRONOMIST")));
        assert_eq!(store.snapshot().auth_view(), AuthView::Authenticated(None));
    }

    #[test]
    fn subscribers_see_transitions() {
        let store = AuthStore::new();
        let mut rx = store.subscribe();
        let seq = store.begin();
        store.resolve(seq, AuthOutcome::SignedIn(user("ADMIN")));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }
}
