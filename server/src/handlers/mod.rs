//! Request handlers

pub mod clusters;
pub mod health;
pub mod model;
pub mod stats;
