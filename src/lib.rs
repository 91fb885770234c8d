//! Deployerd Library
//!
//! Core modules for the deployerd HTTP-triggered deployment runner.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod server;
pub mod storage;
pub mod utils;
