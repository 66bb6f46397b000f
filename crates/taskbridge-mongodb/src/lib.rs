//! MongoDB task bridge
//!
//! This crate maps a fixed set of named tasks onto single MongoDB driver calls
//! so that end-to-end test suites can prepare and inspect database state.
//!
//! # Features
//! - One short-lived connection per task, always closed before returning
//! - Extended JSON in, relaxed Extended JSON out
//! - Errors returned as `{ "error": message }` values
//! - Find options (projection, sort, skip, limit)

pub mod connection;
pub mod extjson;
pub mod outcome;
pub mod query;
pub mod tasks;
pub mod validation;

pub use connection::{check_health, with_collection, Connection};
pub use outcome::TaskOutcome;
pub use query::FindQuery;
pub use taskbridge_common::{BridgeConfig, BridgeError, ErrorDescriptor, Result};
pub use tasks::{
    DeleteAck, DeleteRequest, FindRequest, InsertAck, InsertRequest, TaskBridge, TaskName,
    UpdateAck, UpdateRequest,
};
pub use validation::ValidatedCollectionName;
