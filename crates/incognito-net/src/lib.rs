//! HTTP backend client
//!
//! Implements [`incognito_core::StatusClient`] over the backend's JSON API and
//! maps HTTP outcomes onto the shared error taxonomy. Request timeouts are
//! enforced here, at the transport boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
pub mod config;

pub use client::{classify_response, HttpStatusClient};
pub use config::HttpClientConfig;
