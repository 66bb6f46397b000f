//! Common utilities for taskbridge
//!
//! This crate provides the error taxonomy and configuration shared by the
//! bridge, its HTTP server and its clients.

pub mod config;
pub mod error;

pub use config::BridgeConfig;
pub use error::{BridgeError, ErrorDescriptor, Result};
