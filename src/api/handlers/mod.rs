//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// FAQ chat handler.
pub mod chat;
/// Contact-form relay handler.
pub mod contact;

/// Liveness check
pub async fn health() -> &'static str {
    "OK"
}
