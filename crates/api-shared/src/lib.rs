//! # API Shared
//!
//! Shared definitions for the Dority APIs.
//!
//! Contains:
//! - Request and response envelopes (`messages` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `dority` CLI for common functionality.

pub mod health;
pub mod messages;

pub use health::HealthService;
pub use messages::{DecisionReq, ErrorRes, HealthRes, StartSessionReq};
