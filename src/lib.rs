//! Data-access layer for a portfolio site backed by a hosted
//! Appwrite-style platform (auth, document database, file storage).
//!
//! The crate is a thin client: every operation is one or two awaited
//! calls against the [`client::Backend`] seam. Content reads degrade to
//! empty defaults on backend failure ([`error::Fetched`]); writes and
//! auth propagate structured errors. Session state lives in an injected
//! [`session::SessionStore`], mutated only by the auth service.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod session;
pub mod state;
pub mod storage;

pub use auth::AuthService;
pub use client::{Backend, Query};
pub use config::AppConfig;
pub use error::{ApiError, Fetched};
pub use portfolio::PortfolioService;
pub use session::{SessionStore, User};
pub use state::AppState;
pub use storage::StorageService;
