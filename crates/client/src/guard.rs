//! Client-side route guard.
//!
//! Re-applies the navigation policy whenever the auth state or the current
//! path changes, issuing at most one navigation per distinct input.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use harvestgate_auth::{AuthView, route_decision};

use crate::state::AuthSnapshot;

/// Performs a navigation. Fire-and-forget: the guard never waits on it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

impl Navigator for mpsc::UnboundedSender<String> {
    fn navigate(&self, target: &str) {
        if self.send(target.to_string()).is_err() {
            tracing::debug!(target, "navigator receiver dropped");
        }
    }
}

#[derive(Debug, Default)]
pub struct RouteGuard {
    last_input: Option<(String, AuthView)>,
    last_target: Option<&'static str>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where to navigate for this input, or `None` to stay put.
    ///
    /// Repeating the previous input yields `None`, as does a decision that
    /// would re-issue the navigation already pending for the same path.
    pub fn evaluate(&mut self, path: &str, snapshot: &AuthSnapshot) -> Option<&'static str> {
        let view = snapshot.auth_view();
        let same_path = match &self.last_input {
            Some((last_path, last_view)) if last_path == path => {
                if *last_view == view {
                    return None;
                }
                true
            }
            _ => false,
        };
        self.last_input = Some((path.to_string(), view));

        let target = route_decision(path, view).target();
        if same_path && target.is_some() && target == self.last_target {
            return None;
        }
        self.last_target = target;
        target
    }

    /// Drive the guard until either channel closes.
    pub async fn run(
        mut self,
        mut auth: watch::Receiver<AuthSnapshot>,
        mut path: watch::Receiver<String>,
        navigator: Arc<dyn Navigator>,
    ) {
        loop {
            let current_path = path.borrow_and_update().clone();
            let snapshot = auth.borrow_and_update().clone();
            if let Some(target) = self.evaluate(&current_path, &snapshot) {
                tracing::debug!(from = %current_path, to = target, "route guard redirect");
                navigator.navigate(target);
            }

            tokio::select! {
                changed = auth.changed() => if changed.is_err() { break },
                changed = path.changed() => if changed.is_err() { break },
            }
        }
    }

    /// Spawn [`RouteGuard::run`] on the current runtime.
    pub fn watch(
        auth: watch::Receiver<AuthSnapshot>,
        path: watch::Receiver<String>,
        navigator: Arc<dyn Navigator>,
    ) -> JoinHandle<()> {
        tokio::spawn(Self::new().run(auth, path, navigator))
    }
}
