//! # REST API Components
//!
//! HTTP routing, handlers, DTOs and error mapping of the listener service.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub(crate) mod util;

pub use error::{ApiError, ErrorBody};
pub use routes::{build_router, ApiState, BASE_PATH};
pub use server::start_api_server;
