//! Unlock challenge
//!
//! Password entry flow shown while the session is locked:
//!
//! ```text
//! Idle --submit--> Submitting --> Unlocked | Failed(InvalidCredential) | Failed(Transport)
//! Idle|Failed --request_deactivate--> DeactivateRequested --confirm--> Deactivating
//!     --> Deactivated | Failed(Deactivate)
//! ```
//!
//! Only one backend write may be in flight: while `Submitting` or
//! `Deactivating`, both actions are refused with [`Error::Busy`]. The typed
//! password is zeroized on every exit path.

use crate::controller::SessionController;
use crate::reload::AppReloader;
use incognito_core::{Error, Result, StatusClient};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Shown after a wrong password
pub const WRONG_PASSWORD_MESSAGE: &str = "Wrong password. Please try again.";

/// Why the last attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeFailure {
    /// Backend refused the password
    InvalidCredential,
    /// Any other unlock failure, reported generically
    Transport(String),
    /// Leaving incognito mode failed
    Deactivate(String),
}

impl ChallengeFailure {
    /// Message for the user
    pub fn message(&self) -> String {
        match self {
            Self::InvalidCredential => WRONG_PASSWORD_MESSAGE.to_string(),
            Self::Transport(reason) => format!("Unlock failed: {}", reason),
            Self::Deactivate(reason) => format!("Could not disable incognito mode: {}", reason),
        }
    }
}

/// Challenge flow state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeState {
    /// Waiting for a password
    Idle,
    /// Unlock request in flight
    Submitting,
    /// Unlocked; application reload triggered
    Unlocked,
    /// User asked to leave incognito mode, awaiting confirmation
    DeactivateRequested,
    /// Disable request in flight
    Deactivating,
    /// Incognito mode disabled; application reload triggered
    Deactivated,
    /// Last action failed; input is available again
    Failed(ChallengeFailure),
}

impl ChallengeState {
    /// A backend write is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting | Self::Deactivating)
    }

    /// Flow finished; the challenge is no longer needed
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Unlocked | Self::Deactivated)
    }
}

struct ChallengeInner {
    state: ChallengeState,
    password: Zeroizing<String>,
}

impl ChallengeInner {
    fn clear_password(&mut self) {
        self.password = Zeroizing::new(String::new());
    }
}

/// Unlock challenge bound to a controller
pub struct UnlockChallenge<C> {
    controller: Arc<SessionController<C>>,
    reloader: Arc<dyn AppReloader>,
    inner: Mutex<ChallengeInner>,
}

impl<C: StatusClient> UnlockChallenge<C> {
    /// Create a challenge in `Idle`
    pub fn new(controller: Arc<SessionController<C>>, reloader: Arc<dyn AppReloader>) -> Self {
        Self {
            controller,
            reloader,
            inner: Mutex::new(ChallengeInner {
                state: ChallengeState::Idle,
                password: Zeroizing::new(String::new()),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> ChallengeState {
        self.inner.lock().state.clone()
    }

    /// Error to display, kept until the next action
    pub fn error_message(&self) -> Option<String> {
        match &self.inner.lock().state {
            ChallengeState::Failed(failure) => Some(failure.message()),
            _ => None,
        }
    }

    /// Replace the password field contents
    pub fn set_password(&self, password: &str) {
        self.inner.lock().password = Zeroizing::new(password.to_string());
    }

    /// Whether the password field holds anything
    pub fn has_password(&self) -> bool {
        !self.inner.lock().password.is_empty()
    }

    /// Whether the submit action is enabled
    pub fn can_submit(&self) -> bool {
        let inner = self.inner.lock();
        !inner.password.is_empty() && !inner.state.is_busy() && !inner.state.is_finished()
    }

    /// Submit the typed password.
    ///
    /// An empty field is a no-op. Returns [`Error::Busy`] while another
    /// action is in flight.
    pub async fn submit(&self) -> Result<ChallengeState> {
        let password = {
            let mut inner = self.inner.lock();
            if inner.state.is_busy() {
                return Err(Error::Busy);
            }
            if inner.password.is_empty() || inner.state.is_finished() {
                return Ok(inner.state.clone());
            }
            inner.state = ChallengeState::Submitting;
            Zeroizing::new(std::mem::take(&mut *inner.password))
        };

        let result = self.controller.unlock(&password).await;
        drop(password);

        let state = match result {
            Ok(_) => ChallengeState::Unlocked,
            Err(Error::InvalidCredential) => {
                ChallengeState::Failed(ChallengeFailure::InvalidCredential)
            }
            Err(e) => ChallengeState::Failed(ChallengeFailure::Transport(e.to_string())),
        };
        self.finish(state.clone());

        if state == ChallengeState::Unlocked {
            info!("Incognito session unlocked");
            self.reloader.reload().await;
        }
        Ok(state)
    }

    /// Ask to leave incognito mode instead of unlocking
    pub fn request_deactivate(&self) -> Result<ChallengeState> {
        let mut inner = self.inner.lock();
        match inner.state {
            ChallengeState::Submitting | ChallengeState::Deactivating => Err(Error::Busy),
            ChallengeState::Idle | ChallengeState::Failed(_) => {
                inner.state = ChallengeState::DeactivateRequested;
                Ok(inner.state.clone())
            }
            _ => Ok(inner.state.clone()),
        }
    }

    /// Back out of a deactivate request
    pub fn cancel_deactivate(&self) -> ChallengeState {
        let mut inner = self.inner.lock();
        if inner.state == ChallengeState::DeactivateRequested {
            inner.state = ChallengeState::Idle;
        }
        inner.state.clone()
    }

    /// Confirm a deactivate request and disable incognito mode
    pub async fn confirm_deactivate(&self) -> Result<ChallengeState> {
        {
            let mut inner = self.inner.lock();
            match inner.state {
                ChallengeState::Submitting | ChallengeState::Deactivating => {
                    return Err(Error::Busy)
                }
                ChallengeState::DeactivateRequested => {
                    inner.state = ChallengeState::Deactivating;
                }
                _ => return Ok(inner.state.clone()),
            }
        }

        let state = match self.controller.disable().await {
            Ok(_) => ChallengeState::Deactivated,
            Err(e) => ChallengeState::Failed(ChallengeFailure::Deactivate(e.to_string())),
        };
        self.finish(state.clone());

        if state == ChallengeState::Deactivated {
            info!("Incognito mode disabled from unlock challenge");
            self.reloader.reload().await;
        }
        Ok(state)
    }

    /// Close the challenge, discarding input and any error.
    ///
    /// An in-flight action keeps running; only the input is cleared then.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.clear_password();
        if !inner.state.is_busy() {
            inner.state = ChallengeState::Idle;
        }
    }

    fn finish(&self, state: ChallengeState) {
        if let ChallengeState::Failed(failure) = &state {
            warn!("Unlock challenge failed: {:?}", failure);
        }
        let mut inner = self.inner.lock();
        inner.clear_password();
        inner.state = state;
    }
}
