use serde::{Deserialize, Serialize};

use crate::status::Channel;

/// A sounding note on a given channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveNote {
    pub note: u8,
    pub channel: Channel,
}

impl ActiveNote {
    /// Creates an entry for `note` on `channel`.
    pub const fn new(note: u8, channel: Channel) -> Self {
        Self { note, channel }
    }
}

/// Notes currently held, in note-on arrival order.
///
/// Repeated note-ons for the same note and channel are kept as separate
/// entries; each note-off releases only the oldest one.
#[derive(Clone, Debug, Default)]
pub struct ActiveNoteTracker {
    notes: Vec<ActiveNote>,
}

impl ActiveNoteTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate room for `capacity` notes so the dispatch path does not
    /// allocate until that many are held at once.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: Vec::with_capacity(capacity),
        }
    }

    /// Record a note-on at the end of the set.
    pub fn note_on(&mut self, note: u8, channel: Channel) {
        self.notes.push(ActiveNote::new(note, channel));
    }

    /// Remove the first matching entry. Returns whether one was found.
    pub fn note_off(&mut self, note: u8, channel: Channel) -> bool {
        let target = ActiveNote::new(note, channel);
        match self.notes.iter().position(|active| *active == target) {
            Some(index) => {
                self.notes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Held notes in note-on arrival order.
    pub fn active_notes(&self) -> &[ActiveNote] {
        &self.notes
    }

    /// Whether at least one entry matches `note` and `channel`.
    pub fn is_active(&self, note: u8, channel: Channel) -> bool {
        self.notes.contains(&ActiveNote::new(note, channel))
    }

    /// Number of held entries, duplicates included.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether no notes are held.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Forget every held note.
    pub fn clear(&mut self) {
        self.notes.clear();
    }
}
