//! Veil Engine - Privacy-Enforcing Aggregation Core
//!
//! Answers statistical queries against a personal-data dataset while
//! guaranteeing that no response can identify an individual:
//! - Sensitive attributes are stripped at dataset construction, never stored.
//! - Records are clustered into groups that serve as reusable summaries.
//! - Every count-bearing result passes through the privacy guard
//!   (k-anonymity minimum, max-result-size maximum) before leaving.
//!
//! The HTTP surface and CSV ingestion live in `veil-server`; this crate is
//! the engine only.

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use api::{Engine, EngineConfig};
pub use error::EngineError;
