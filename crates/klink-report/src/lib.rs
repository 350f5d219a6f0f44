//! klink Report - Statistics aggregation and report output
//!
//! Aggregates entity, relation and link streams into per-corpus statistics
//! and writes the three report artifacts incrementally, one record at a
//! time.

pub mod aggregate;
pub mod counter;
pub mod writer;

pub use aggregate::{
    EntityAggregator, EntityStatistics, LinkStatistics, LinkStatsAccum, RelationAggregator,
    RelationStatistics,
};
pub use counter::FrequencyCounter;
pub use writer::{JsonArrayWriter, LinkReportWriter, ReportWriter};

/// Number of entries kept in every top-frequency ranking
pub const TOP_K: usize = 10;
