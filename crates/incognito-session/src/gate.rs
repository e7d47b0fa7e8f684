//! Access gate presentation wrapper
//!
//! Follows controller snapshots and picks one of three views for the
//! top-level composition. The decision itself is [`incognito_core::decide`].

use crate::controller::{ControllerState, SessionController};
use incognito_core::{AccessDecision, StatusClient};
use tokio::sync::watch;

/// Render gate bound to one controller
#[derive(Debug, Clone)]
pub struct AccessGate {
    state: watch::Receiver<ControllerState>,
}

impl AccessGate {
    /// Gate following `controller`
    pub fn new<C: StatusClient>(controller: &SessionController<C>) -> Self {
        Self {
            state: controller.subscribe(),
        }
    }

    /// Decision for the latest snapshot
    pub fn decision(&self) -> AccessDecision {
        self.state.borrow().decision()
    }

    /// Wait for the next state change and return the new decision.
    ///
    /// Returns `None` once the controller has been dropped.
    pub async fn changed(&mut self) -> Option<AccessDecision> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().decision())
    }

    /// Build whichever view the current decision calls for
    pub fn render<T>(
        &self,
        loading: impl FnOnce() -> T,
        challenge: impl FnOnce() -> T,
        content: impl FnOnce() -> T,
    ) -> T {
        match self.decision() {
            AccessDecision::Loading => loading(),
            AccessDecision::Challenge => challenge(),
            AccessDecision::Content => content(),
        }
    }
}
