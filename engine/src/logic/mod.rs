//! Engine Logic Modules
//!
//! Dependency order, leaves first: schema -> dataset -> features -> cluster,
//! then the read paths (query, aggregate) gated by privacy, and the
//! process-wide model slot.

pub mod aggregate;
pub mod cluster;
pub mod dataset;
pub mod features;
pub mod privacy;
pub mod query;
pub mod schema;
pub mod slot;
