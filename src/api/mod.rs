//! # API Module
//!
//! HTTP endpoints of the local server used during authorization.
//!
//! ## Endpoints
//!
//! - [`callback`] - `GET /callback?code&state`, the OAuth redirect target.
//!   Checks the state, exchanges the code for a token and stores it in the
//!   user's session and token store.
//! - [`health`] - `GET /health`, status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use namethatsong::api::{CallbackContext, callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback).layer(Extension(context)))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::{CallbackContext, callback};
pub use health::health;
