//! Shared types and utilities for the reverb tester client.
//!
//! Holds the data model observed by the UI, the Pusher channels protocol
//! vocabulary and the error types that cross the transport boundary.

pub mod error;
pub mod models;
pub mod protocol;

pub use error::*;
pub use models::*;
pub use protocol::*;
