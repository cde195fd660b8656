//! Repository modules for data access
//!
//! Each repository exposes an `async_trait` interface with a PostgreSQL
//! implementation; `storage::memory::MemoryStore` implements the same traits
//! in process.

pub mod analysis;
pub mod order;

pub use analysis::{
    AnalysisQuery, AnalysisRepository, AnalysisSummary, KindCounts, SqlxAnalysisRepository,
};
pub use order::{OrderRepository, SqlxOrderRepository};
