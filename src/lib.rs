//! # gitrdf-listener
//!
//! REST façade of the GitHub-to-RDF pipeline. Clients queue repositories for
//! conversion, poll for and download the produced Turtle file, and query the
//! rating, statistic and expert records an external analysis stage attaches to
//! each order.
//!
//! ## Architecture
//!
//! ```text
//! REST API (axum) → Services → Repository traits → PostgreSQL (sqlx)
//!       ↓                                       ↘ MemoryStore (memory://)
//! Observability (tracing, metrics)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gitrdf_listener::{api::start_api_server, storage::Repositories, Config, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     let repositories = Repositories::connect(&config.database).await?;
//!     start_api_server(config.api, repositories).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::Config;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
