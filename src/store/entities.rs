use serde::{Deserialize, Serialize};

use crate::stats::Entry;

/// A stored exercise entry. Identifiers are assigned by the store and are
/// stable across edits; everything else mirrors [Entry].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryEntity {
    pub id: u64,
    pub timestamp: String,
    #[serde(default)]
    pub repetitions: u64,
    #[serde(default)]
    pub source: String,
}

impl From<EntryEntity> for Entry {
    fn from(
        EntryEntity {
            timestamp,
            repetitions,
            source,
            ..
        }: EntryEntity,
    ) -> Self {
        Entry {
            timestamp,
            repetitions,
            source,
        }
    }
}
