//! Storage is organized through [entry_store::FileEntryStore].
//! The basic idea is:
//!  - Entries live in a single json-lines file inside the application
//!    directory.
//!  - Every mutation rewrites or appends under an exclusive file lock, so
//!    concurrent invocations never interleave writes.
//!  - The aggregation engine never touches the store directly; callers load
//!    entries and hand them over as plain values.

pub mod entities;
pub mod entry_store;

use tracing::debug;

/// Invoked by callers after a mutating store operation so interested
/// listeners can refresh their view of the data. The aggregation engine
/// neither triggers nor listens to this.
pub trait ChangeNotifier {
    fn data_changed(&self);
}

/// Default notifier. There is no live subscriber in the cli, so a change is
/// only recorded in the log.
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    fn data_changed(&self) {
        debug!("entry data changed");
    }
}
