//! # hatch-server
//!
//! Backend for the S-HATCH marketing site: a scripted FAQ chat endpoint and a
//! contact-form relay that forwards submissions by email.
//!
//! ## Overview
//!
//! hatch-server can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `hatch-server` binary
//! 2. **As a library** - Embed the FAQ responder or the whole router
//!
//! ## Quick Start (Library Usage)
//!
//! ### Answering a conversation
//!
//! ```rust
//! use hatch::{ChatMessage, FaqResponder};
//!
//! let faq = FaqResponder::builtin()?;
//! let reply = faq.answer(&[ChatMessage::user("What services do you offer?")]);
//! assert!(reply.contains("intelligent automation"));
//! # Ok::<(), hatch::faq::FaqError>(())
//! ```
//!
//! ### Serving the API
//!
//! ```rust,ignore
//! use hatch::{AppState, HatchConfigManager, api};
//! use std::sync::Arc;
//!
//! let manager = Arc::new(HatchConfigManager::new("hatch.toml")?);
//! let config = manager.config();
//! let state = AppState::new(manager, None);
//! let app = api::app(state, &config.server);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`faq`] - Rule table and responder
//! - [`api`] - REST API handlers and routes
//! - [`mail`] - Contact submission validation, rendering and SMTP delivery
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - TOML configuration with hot reload
//! - [`cli`] - Command-line interface

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface for the `hatch-server` binary.
pub mod cli;
/// Scripted FAQ responder.
pub mod faq;
/// Contact-form mail relay.
pub mod mail;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use faq::{FaqResponder, Rule};
pub use mail::{Mailer, SmtpMailer};
pub use types::{AppError, ChatMessage, MessageRole, Result};
pub use utils::toml_config::{HatchConfig, HatchConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration and the FAQ table built from it, with hot-reload support
    pub config_manager: Arc<HatchConfigManager>,
    /// Contact-form transport; `None` when mail credentials are not configured
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn new(config_manager: Arc<HatchConfigManager>, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self {
            config_manager,
            mailer,
        }
    }
}
