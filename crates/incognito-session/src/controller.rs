//! Session controller
//!
//! Single owner of the incognito session state. Every transition goes through
//! here and every write is followed by a fresh status read, so the local view
//! is always whatever the backend last reported.
//!
//! ## Ordering
//!
//! Writes are refused with [`Error::NotInitialized`] until the first status
//! load has finished. Without this, a default "off" status could be written
//! back at start-up and wipe backend session state that was never read.
//! Once initialized, writes are serialised: a write and its resync complete
//! before the next write reaches the backend.
//!
//! ## Failure policy
//!
//! A failed status read is replaced with [`SessionStatus::fail_closed`].
//! Failed writes are logged and returned to the caller unchanged.
//!
//! ## Overlapping reads
//!
//! Each status read takes a sequence number before calling the backend. A
//! read that completes after a newer one has been applied is discarded.

use crate::config::ConfigStore;
use incognito_core::{
    decide, AccessDecision, Error, Password, Result, SessionStatus, StatusClient, StatusOperation,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Controller-owned session state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    /// Last status applied
    pub status: SessionStatus,
    /// Set once by the first status load and never cleared
    pub initialized: bool,
}

impl ControllerState {
    /// Render decision for this snapshot
    pub fn decision(&self) -> AccessDecision {
        decide(self.status, self.initialized)
    }
}

/// Incognito session controller
pub struct SessionController<C> {
    client: C,
    state: watch::Sender<ControllerState>,
    write_lock: Mutex<()>,
    config: Option<ConfigStore>,
    /// Last sequence number handed to a status read
    issued_reads: AtomicU64,
    /// Sequence number of the read currently applied; only touched under the watch lock
    applied_read: AtomicU64,
}

impl<C: StatusClient> SessionController<C> {
    /// Create a controller with nothing loaded yet
    pub fn new(client: C) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            client,
            state,
            write_lock: Mutex::new(()),
            config: None,
            issued_reads: AtomicU64::new(0),
            applied_read: AtomicU64::new(0),
        }
    }

    /// Create a controller that records the incognito flag in `config`
    pub fn with_config(client: C, config: ConfigStore) -> Self {
        Self {
            config: Some(config),
            ..Self::new(client)
        }
    }

    /// Create a controller and run the initial status load
    pub async fn start(client: C) -> Self {
        let controller = Self::new(client);
        controller.refresh_status().await;
        controller
    }

    /// Backend client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Current state snapshot
    pub fn state(&self) -> ControllerState {
        *self.state.borrow()
    }

    /// Last applied status
    pub fn status(&self) -> SessionStatus {
        self.state().status
    }

    /// Whether the first status load has happened
    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    /// Render decision for the current state
    pub fn decision(&self) -> AccessDecision {
        self.state().decision()
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Wait for the first status load
    pub async fn wait_initialized(&self) -> ControllerState {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(|state| state.initialized).await {
            Ok(state) => *state,
            // Sender lives in `self`, so the channel cannot close while borrowed
            Err(_) => self.state(),
        };
        state
    }

    /// Stored incognito flag from the local config, if any.
    ///
    /// Informational only; the gate and all writes use backend status.
    pub fn config_hint(&self) -> Option<bool> {
        let config = self.config.as_ref()?;
        match config.incognito_hint() {
            Ok(hint) => hint,
            Err(e) => {
                warn!("Failed to read incognito config hint: {}", e);
                None
            }
        }
    }

    /// Reload status from the backend.
    ///
    /// On failure the fail-closed status is applied instead. Either way the
    /// controller is initialized afterwards. A read overtaken by a newer one
    /// is dropped. Returns the status in effect afterwards.
    pub async fn refresh_status(&self) -> SessionStatus {
        let seq = self.issued_reads.fetch_add(1, Ordering::SeqCst) + 1;

        let (status, loaded) = match self.client.query_status().await {
            Ok(status) => {
                debug!(
                    "Session status loaded: incognito={} locked={}",
                    status.incognito, status.locked
                );
                (status, true)
            }
            Err(e) => {
                warn!("Failed to query session status, failing closed: {}", e);
                (SessionStatus::fail_closed(), false)
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if seq < self.applied_read.load(Ordering::SeqCst) {
                return false;
            }
            self.applied_read.store(seq, Ordering::SeqCst);
            state.status = status;
            state.initialized = true;
            true
        });

        if !applied {
            debug!("Discarding status read #{}: a newer read was applied", seq);
            return self.status();
        }
        if loaded {
            self.record_hint(status).await;
        }
        status
    }

    /// Turn incognito mode on with `password`
    pub async fn enable(&self, password: &str) -> Result<SessionStatus> {
        let password = Password::new(password)?;
        let _write = self.begin_write(StatusOperation::Enable).await?;

        info!("Enabling incognito mode");
        self.client
            .enable(&password)
            .await
            .map_err(|e| write_failed(StatusOperation::Enable, e))?;
        Ok(self.refresh_status().await)
    }

    /// Turn incognito mode off
    pub async fn disable(&self) -> Result<SessionStatus> {
        let _write = self.begin_write(StatusOperation::Disable).await?;

        info!("Disabling incognito mode");
        self.client
            .disable()
            .await
            .map_err(|e| write_failed(StatusOperation::Disable, e))?;
        Ok(self.refresh_status().await)
    }

    /// Unlock incognito data with `password`.
    ///
    /// A wrong password comes back as [`Error::InvalidCredential`].
    pub async fn unlock(&self, password: &str) -> Result<SessionStatus> {
        let password = Password::new(password)?;
        let _write = self.begin_write(StatusOperation::Unlock).await?;

        info!("Unlocking incognito session");
        self.client
            .unlock(&password)
            .await
            .map_err(|e| write_failed(StatusOperation::Unlock, e))?;
        Ok(self.refresh_status().await)
    }

    /// Drop the held credential while staying in incognito mode
    pub async fn lock(&self) -> Result<SessionStatus> {
        let _write = self.begin_write(StatusOperation::Lock).await?;

        info!("Locking incognito session");
        self.client
            .lock()
            .await
            .map_err(|e| write_failed(StatusOperation::Lock, e))?;
        Ok(self.refresh_status().await)
    }

    async fn begin_write(&self, op: StatusOperation) -> Result<MutexGuard<'_, ()>> {
        let initialized = self.state.borrow().initialized;
        if !initialized {
            warn!("Refusing {} before session status is loaded", op);
            return Err(Error::NotInitialized);
        }
        Ok(self.write_lock.lock().await)
    }

    async fn record_hint(&self, status: SessionStatus) {
        let Some(config) = self.config.clone() else {
            return;
        };
        let result =
            tokio::task::spawn_blocking(move || config.set_incognito_hint(status.incognito)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to persist incognito config hint: {}", e),
            Err(e) => warn!("Config hint task failed: {}", e),
        }
    }
}

fn write_failed(op: StatusOperation, error: Error) -> Error {
    if error.is_invalid_credential() {
        info!("{} refused: wrong password", op);
    } else {
        warn!("{} failed: {}", op, error);
    }
    error
}
