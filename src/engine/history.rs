//! Append-only match history
//!
//! One entry per processed match, holding a before/after snapshot of every
//! participant. Entries are never modified once appended; durable storage of the
//! trail is left to the caller.

use crate::types::{MatchHistoryEntry, ParticipantRecord};

/// Insertion-ordered audit trail of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchHistory {
    entries: Vec<MatchHistoryEntry>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next appended entry should carry
    pub fn next_sequence(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Append an entry
    pub fn record(&mut self, entry: MatchHistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MatchHistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&MatchHistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every record of one entity, in processing order
    pub fn for_entity<'a>(
        &'a self,
        entity_id: &'a str,
    ) -> impl Iterator<Item = (&'a MatchHistoryEntry, &'a ParticipantRecord)> + 'a {
        self.entries.iter().flat_map(move |entry| {
            entry
                .participants
                .iter()
                .filter(move |p| p.entity_id == entity_id)
                .map(move |p| (entry, p))
        })
    }

    /// Consume the history, returning its entries
    pub fn into_entries(self) -> Vec<MatchHistoryEntry> {
        self.entries
    }
}
