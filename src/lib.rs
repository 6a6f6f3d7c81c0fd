//! Core engine for the IgniteBD business-development client.
//!
//! The crate owns the tenant-scoped contact cache, the authenticated sync
//! client for the IgniteBD backend, form-to-payload mapping, and the
//! pipeline grouping that powers the deal board. Hosts construct a
//! [`state::AppState`] once and drive everything through the [`services`]
//! facades; navigation comes back as [`session::Route`] data, never as a
//! side effect.

pub mod api;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
pub mod util;

pub use api::ApiClient;
pub use error::{ApiError, ConfigError, StoreError};
pub use session::{guard, GuardVerdict, Route, SessionContext, TokenProvider};
pub use state::AppState;
pub use types::{AppConfig, Contact};
