//! Domain layer
//!
//! Pure domain entities of the listener service with no infrastructure
//! dependencies: ingestion orders, their filter configuration and the
//! analysis records the external pipeline attaches to them.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe numeric identifiers with NewType pattern
//! - `filter`: Repository and rating filter toggles
//! - `order`: Ingestion orders and their RDF large object
//! - `analysis`: Rating, statistic and expert records

pub mod analysis;
pub mod filter;
pub mod id;
pub mod order;

pub use analysis::{
    AnalysisKind, AnalysisRecord, NewAnalysisRecord, OrderIdentity, RdfPayload,
};
pub use filter::{CommitFilter, IssueFilter, RatingFilter, RepositoryFilter};
pub use id::{AnalysisId, OrderId};
pub use order::{NewOrder, Order, OrderLob, OrderStatus};
