//! Task runners and command aliases for the MongoDB task bridge
//!
//! Test scenarios talk to the bridge through [`MongoCommands`], either
//! in-process via [`taskbridge_mongodb::TaskBridge`] or over HTTP via
//! [`HttpTaskClient`].

mod commands;
mod http;
mod runner;

pub use commands::MongoCommands;
pub use http::HttpTaskClient;
pub use runner::TaskRunner;
pub use taskbridge_mongodb::{TaskBridge, TaskOutcome};
