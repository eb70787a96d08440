//! Profile administration service library crate.
//!
//! # Purpose
//! Exposes the catalog cache, profile editing sessions, full-replace
//! persistence, the policy store contracts with an in-memory backend, and the
//! configuration and observability wiring used by the binary and tests.
//!
//! # Notes
//! Policy rules themselves live in `rolegate_policy`; this crate sequences
//! them around store I/O.
pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod seed;
pub mod service;
pub mod session;
pub mod store;

pub use batch::WriteStrategy;
pub use error::{ProfileError, ProfileResult};
pub use service::ProfileAdmin;
pub use session::{ChangeReview, ProfileSession, SessionState, SubmitOutcome};
