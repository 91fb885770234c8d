//! Deployment module

pub mod coordinator;
pub mod log_buffer;
pub mod runner;
pub mod status;
