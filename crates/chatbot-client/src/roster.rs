//! Session roster: who is in the room right now.
//!
//! Filled by the `initial` snapshot, kept current by join/part/logout.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chatbot_core::Participant;

/// Connected participants: name -> record.
///
/// Every operation holds one mutex for its whole duration and never awaits
/// while holding it. Concurrent writers for the same name: last lock wins.
#[derive(Debug, Default)]
pub struct Roster {
    members: Mutex<HashMap<String, Participant>>,
}

impl Roster {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
        }
    }

    fn members(&self) -> MutexGuard<'_, HashMap<String, Participant>> {
        // No map operation panics midway; a poisoned map is still consistent.
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the record keyed by `participant.name`.
    pub fn upsert(&self, participant: Participant) -> Option<Participant> {
        self.members().insert(participant.name.clone(), participant)
    }

    /// Replace many records under a single lock acquisition.
    pub fn upsert_all(&self, participants: impl IntoIterator<Item = Participant>) -> usize {
        let mut members = self.members();
        let mut n = 0;
        for p in participants {
            members.insert(p.name.clone(), p);
            n += 1;
        }
        n
    }

    /// Remove `name`; unknown names are a no-op.
    pub fn remove(&self, name: &str) -> Option<Participant> {
        self.members().remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Participant> {
        self.members().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Snapshot sorted by name.
    pub fn snapshot(&self) -> Vec<Participant> {
        let mut all: Vec<Participant> = self.members().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
