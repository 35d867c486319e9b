//! The aggregation engine. Pure functions over an in-memory entry sequence,
//! shared by every caller so the bucketing logic exists exactly once.

pub mod aggregate;
pub mod entry;
pub mod report;

pub use aggregate::{Bucket, Granularity};
pub use entry::Entry;
pub use report::{build_stats, StatsMeta, StatsReport};
