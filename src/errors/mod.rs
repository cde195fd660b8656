//! # Error Handling
//!
//! Error types shared by the storage, service and API layers.

pub mod types;

pub use types::{ListenerError, Result};

/// Short alias used at the crate root
pub type Error = ListenerError;
