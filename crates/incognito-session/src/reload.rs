//! Application reload hook
//!
//! Unlocking or leaving incognito mode can expose very different account data.
//! Instead of patching views in place, the application reloads its whole view
//! of backend state.

use crate::controller::SessionController;
use async_trait::async_trait;
use incognito_core::StatusClient;
use std::sync::Arc;
use tracing::info;

/// Full application reload
#[async_trait]
pub trait AppReloader: Send + Sync {
    /// Rebuild application state from the backend
    async fn reload(&self);
}

/// Reloader that re-reads session status through the controller
pub struct ControllerReloader<C> {
    controller: Arc<SessionController<C>>,
}

impl<C: StatusClient> ControllerReloader<C> {
    /// Reloader for `controller`
    pub fn new(controller: Arc<SessionController<C>>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl<C: StatusClient> AppReloader for ControllerReloader<C> {
    async fn reload(&self) {
        info!("Reloading application state");
        self.controller.refresh_status().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incognito_core::{MockStatusClient, SessionStatus};

    #[tokio::test]
    async fn test_controller_reloader_refreshes() {
        let controller = Arc::new(SessionController::new(MockStatusClient::new()));
        let reloader = ControllerReloader::new(Arc::clone(&controller));

        reloader.reload().await;
        assert!(controller.is_initialized());
        assert_eq!(controller.status(), SessionStatus::new(false, false));
        assert_eq!(controller.client().call_counts().query, 1);
    }
}
