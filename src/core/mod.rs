//! Channel-agnostic types, configuration and the dispatcher seam

pub mod config;
pub mod dispatcher;
pub mod models;
