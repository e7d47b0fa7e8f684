//! Incognito session primitives
//!
//! Shared building blocks for the incognito-session workspace:
//!
//! - **Session status**: the backend-authoritative `{incognito, locked}` pair
//! - **Error taxonomy**: transport, credential, rejection and validation faults
//! - **Passwords**: zeroized-on-drop secret strings with redacted `Debug`
//! - **Status client**: the async request/response contract with the backend
//! - **Access gate**: the pure render decision (`Loading`/`Challenge`/`Content`)
//! - **Mock backend**: an in-memory `StatusClient` with fault injection

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod gate;
pub mod mock;
pub mod password;
pub mod status;

pub use client::{StatusClient, StatusOperation};
pub use error::{Error, Result};
pub use gate::{decide, AccessDecision};
pub use mock::{MockCallCounts, MockStatusClient};
pub use password::Password;
pub use status::SessionStatus;
