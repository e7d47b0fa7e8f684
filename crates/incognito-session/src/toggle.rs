//! Incognito toggle and password setup
//!
//! Settings affordance for switching incognito mode. Before anything reaches
//! the controller:
//!
//! 1. A connected hardware device blocks the toggle and opens an info dialog.
//! 2. Switching on opens the password setup dialog (two matching, non-empty fields).
//! 3. Switching off disables directly.

use crate::controller::SessionController;
use incognito_core::{Error, Result, SessionStatus, StatusClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Shown when the two setup fields differ
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Connected hardware device detection
pub trait DevicePresence: Send + Sync {
    /// Whether a hardware device session is open
    fn has_connected_device(&self) -> bool;
}

/// Device presence set explicitly by the caller
#[derive(Debug, Default)]
pub struct StaticDevicePresence {
    connected: AtomicBool,
}

impl StaticDevicePresence {
    /// Presence with the given initial value
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    /// Update presence
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl DevicePresence for StaticDevicePresence {
    fn has_connected_device(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Result of clicking the toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Blocked by a connected device; info dialog opened
    DeviceConnected,
    /// Password setup dialog opened
    SetupRequired,
    /// Incognito mode disabled
    Disabled(SessionStatus),
}

/// Info dialog shown when a device blocks the toggle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConnectedDialog {
    open: bool,
}

impl DeviceConnectedDialog {
    /// Whether the dialog is visible
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the dialog
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Dismiss the dialog
    pub fn close(&mut self) {
        self.open = false;
    }
}

/// Password setup dialog for enabling incognito mode
#[derive(Default)]
pub struct PasswordSetupDialog {
    open: bool,
    submitting: bool,
    password: Zeroizing<String>,
    confirmation: Zeroizing<String>,
    error: Option<String>,
}

impl PasswordSetupDialog {
    /// Whether the dialog is visible
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the dialog with empty fields
    pub fn open(&mut self) {
        self.clear();
        self.open = true;
    }

    /// Hide the dialog and discard input
    pub fn close(&mut self) {
        self.clear();
        self.open = false;
    }

    /// Set the password field
    pub fn set_password(&mut self, password: &str) {
        self.password = Zeroizing::new(password.to_string());
    }

    /// Set the confirmation field
    pub fn set_confirmation(&mut self, confirmation: &str) {
        self.confirmation = Zeroizing::new(confirmation.to_string());
    }

    /// Whether the confirmation field holds anything
    pub fn has_confirmation(&self) -> bool {
        !self.confirmation.is_empty()
    }

    /// Error to display
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Both fields non-empty and equal
    pub fn passwords_match(&self) -> bool {
        !self.password.is_empty() && self.password == self.confirmation
    }

    /// Whether the submit button is enabled
    pub fn can_submit(&self) -> bool {
        self.open && !self.submitting && self.passwords_match()
    }

    /// Enable incognito mode with the entered password.
    ///
    /// A closed dialog, mismatched fields or empty fields fail with
    /// [`Error::Validation`] without contacting the backend. A mismatch
    /// clears the confirmation and keeps the password for correction.
    /// Otherwise fields are cleared whatever the outcome; on success the
    /// dialog closes, on failure it stays open with the error.
    pub async fn submit<C: StatusClient>(
        &mut self,
        controller: &SessionController<C>,
    ) -> Result<SessionStatus> {
        if self.submitting {
            return Err(Error::Busy);
        }
        if !self.open {
            self.clear();
            return Err(Error::Validation("Password setup is not open".to_string()));
        }
        if self.password != self.confirmation {
            self.confirmation = Zeroizing::new(String::new());
            self.error = Some(PASSWORDS_DO_NOT_MATCH.to_string());
            return Err(Error::Validation(PASSWORDS_DO_NOT_MATCH.to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::Validation("Password must not be empty".to_string()));
        }

        let password = Zeroizing::new(std::mem::take(&mut *self.password));
        self.confirmation = Zeroizing::new(String::new());
        self.error = None;
        self.submitting = true;

        let result = controller.enable(&password).await;
        self.submitting = false;

        match result {
            Ok(status) => {
                self.close();
                Ok(status)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn clear(&mut self) {
        self.password = Zeroizing::new(String::new());
        self.confirmation = Zeroizing::new(String::new());
        self.error = None;
    }
}

/// Settings toggle for incognito mode
pub struct IncognitoToggle<C> {
    controller: Arc<SessionController<C>>,
    devices: Arc<dyn DevicePresence>,
    device_dialog: DeviceConnectedDialog,
    setup_dialog: PasswordSetupDialog,
}

impl<C: StatusClient> IncognitoToggle<C> {
    /// Toggle bound to `controller`, checking `devices` before each transition
    pub fn new(controller: Arc<SessionController<C>>, devices: Arc<dyn DevicePresence>) -> Self {
        Self {
            controller,
            devices,
            device_dialog: DeviceConnectedDialog::default(),
            setup_dialog: PasswordSetupDialog::default(),
        }
    }

    /// Whether the toggle renders as on
    pub fn is_checked(&self) -> bool {
        self.controller.status().incognito
    }

    /// Device info dialog
    pub fn device_dialog(&self) -> &DeviceConnectedDialog {
        &self.device_dialog
    }

    /// Dismiss the device info dialog
    pub fn close_device_dialog(&mut self) {
        self.device_dialog.close();
    }

    /// Password setup dialog
    pub fn setup_dialog(&self) -> &PasswordSetupDialog {
        &self.setup_dialog
    }

    /// Password setup dialog, for input
    pub fn setup_dialog_mut(&mut self) -> &mut PasswordSetupDialog {
        &mut self.setup_dialog
    }

    /// Handle a click on the toggle
    pub async fn click(&mut self) -> Result<ToggleOutcome> {
        if !self.controller.is_initialized() {
            warn!("Incognito toggle used before session status is loaded");
            return Err(Error::NotInitialized);
        }

        if self.devices.has_connected_device() {
            info!("Incognito toggle blocked: hardware device connected");
            self.device_dialog.open();
            return Ok(ToggleOutcome::DeviceConnected);
        }

        if !self.controller.status().incognito {
            self.setup_dialog.open();
            return Ok(ToggleOutcome::SetupRequired);
        }

        let status = self.controller.disable().await?;
        Ok(ToggleOutcome::Disabled(status))
    }

    /// Submit the setup dialog, re-checking the device precondition
    pub async fn submit_setup(&mut self) -> Result<SessionStatus> {
        if self.devices.has_connected_device() {
            info!("Incognito setup blocked: hardware device connected");
            self.setup_dialog.close();
            self.device_dialog.open();
            return Err(Error::Rejected("Hardware device connected".to_string()));
        }
        if self.controller.status().incognito {
            warn!("Incognito setup submitted while incognito mode is already on");
            self.setup_dialog.close();
            return Err(Error::Validation("Incognito mode is already on".to_string()));
        }
        self.setup_dialog.submit(self.controller.as_ref()).await
    }
}
