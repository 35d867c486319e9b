//! Simple cli for keeping a personal exercise log. Entries are timestamped
//! repetition counts, and the `stats` command renders totals over time at an
//! adaptive resolution (hourly for short ranges, daily otherwise).
//!

pub mod cli;
pub mod stats;
pub mod store;
pub mod utils;
