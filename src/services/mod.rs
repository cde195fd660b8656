//! Business logic services
//!
//! This module contains service layer components that encapsulate
//! business logic, separated from HTTP concerns.

pub mod order_service;
pub mod ratings_service;
pub mod rdf_export;
pub mod statistics;

pub use order_service::{OrderOverview, OrderService};
pub use ratings_service::{MetricStatistics, OrderStatistics, RatingsService, RdfExport};
pub use rdf_export::{create_rdf_download, download_filename, DownloadKind, RdfDownload};
