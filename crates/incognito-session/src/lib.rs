//! Incognito session controller
//!
//! Owns the authoritative view of the incognito session and everything that
//! reacts to it:
//!
//! - **Session controller**: status loading, fail-closed defaults, write gating
//! - **Access gate**: render decision for the top-level view
//! - **Unlock challenge**: password entry flow for a locked session
//! - **Toggle surface**: device check, password setup and direct disable
//! - **Config hint**: persisted `incognito` flag, never authoritative
//!
//! ## Lifecycle
//!
//! One [`SessionController`] is built at application start, wrapped in an
//! `Arc`, and handed to the gate, the challenge and the settings toggle.
//! Dropping the last handle tears it down.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod controller;
pub mod gate;
pub mod reload;
pub mod toggle;
pub mod unlock;

pub use config::{ConfigStore, FrontendSettings, StoredIncognitoConfig};
pub use controller::{ControllerState, SessionController};
pub use gate::AccessGate;
pub use reload::{AppReloader, ControllerReloader};
pub use toggle::{
    DeviceConnectedDialog, DevicePresence, IncognitoToggle, PasswordSetupDialog,
    StaticDevicePresence, ToggleOutcome,
};
pub use unlock::{ChallengeFailure, ChallengeState, UnlockChallenge};

pub use incognito_core::{
    decide, AccessDecision, Error, MockStatusClient, Password, Result, SessionStatus,
    StatusClient,
};
