//! Standup types: the period snapshot document.
//!
//! A standup covers `(range_start, range_end]`. It is open (editable) until
//! published; publishing fixes `range_end` and is one-way. Each included
//! workstream gets one `StandupEntry` holding draft and final text for both
//! directions. Entries reference their workstream by id only — the
//! workstream may be deleted out from under them.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which section of a standup a piece of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Work done since the previous standup.
    Minus24,
    /// Work planned next.
    Plus24,
}

/// A periodic snapshot summarizing work done and work planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standup {
    pub id: Uuid,
    pub title: String,

    /// Start of the covered period: the previous published standup's
    /// `range_end`, or the distant past for the first standup.
    pub range_start: Timestamp,

    /// Set exactly once, at publish. `None` while the standup is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<Timestamp>,

    /// The chronologically prior standup, set at creation, never mutated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_standup_id: Option<Uuid>,

    pub created: Timestamp,
    pub updated: Timestamp,

    /// At most one entry per workstream; order is insertion order.
    #[serde(default)]
    pub entries: Vec<StandupEntry>,
}

/// Per-workstream standup content.
///
/// Draft fields are machine-suggested and freely regenerable. Final fields
/// are the user-approved text; published output reads finals only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupEntry {
    pub id: Uuid,

    /// Weak reference: resolve against the workspace, tolerate absence.
    pub workstream_id: Uuid,

    #[serde(default)]
    pub reviewed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minus24_draft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minus24_draft_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minus24_final: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minus24_edited_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus24_draft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus24_draft_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus24_final: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus24_edited_at: Option<Timestamp>,
}

impl Standup {
    /// Published standups are frozen; publishing is one-way.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.range_end.is_some()
    }

    /// The standup's content for a workstream, if included.
    #[must_use]
    pub fn entry_for(&self, workstream_id: Uuid) -> Option<&StandupEntry> {
        self.entries.iter().find(|e| e.workstream_id == workstream_id)
    }

    pub(crate) fn entry_for_mut(&mut self, workstream_id: Uuid) -> Option<&mut StandupEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.workstream_id == workstream_id)
    }
}

impl StandupEntry {
    /// An empty entry for a workstream: no drafts, no finals, unreviewed.
    #[must_use]
    pub fn new(workstream_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            workstream_id,
            reviewed: false,
            minus24_draft: None,
            minus24_draft_notes: None,
            minus24_final: None,
            minus24_edited_at: None,
            plus24_draft: None,
            plus24_draft_notes: None,
            plus24_final: None,
            plus24_edited_at: None,
        }
    }

    #[must_use]
    pub fn draft(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Minus24 => self.minus24_draft.as_deref(),
            Direction::Plus24 => self.plus24_draft.as_deref(),
        }
    }

    #[must_use]
    pub fn draft_notes(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Minus24 => self.minus24_draft_notes.as_deref(),
            Direction::Plus24 => self.plus24_draft_notes.as_deref(),
        }
    }

    #[must_use]
    pub fn final_text(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Minus24 => self.minus24_final.as_deref(),
            Direction::Plus24 => self.plus24_final.as_deref(),
        }
    }

    pub(crate) fn set_draft(&mut self, direction: Direction, text: String) {
        match direction {
            Direction::Minus24 => self.minus24_draft = Some(text),
            Direction::Plus24 => self.plus24_draft = Some(text),
        }
        self.touch(direction);
    }

    pub(crate) fn set_draft_notes(&mut self, direction: Direction, text: String) {
        match direction {
            Direction::Minus24 => self.minus24_draft_notes = Some(text),
            Direction::Plus24 => self.plus24_draft_notes = Some(text),
        }
        self.touch(direction);
    }

    pub(crate) fn set_final(&mut self, direction: Direction, text: String) {
        match direction {
            Direction::Minus24 => self.minus24_final = Some(text),
            Direction::Plus24 => self.plus24_final = Some(text),
        }
        self.touch(direction);
    }

    fn touch(&mut self, direction: Direction) {
        let now = Some(Timestamp::now());
        match direction {
            Direction::Minus24 => self.minus24_edited_at = now,
            Direction::Plus24 => self.plus24_edited_at = now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_empty() {
        let entry = StandupEntry::new(Uuid::new_v4());

        for direction in [Direction::Minus24, Direction::Plus24] {
            assert!(entry.draft(direction).is_none());
            assert!(entry.draft_notes(direction).is_none());
            assert!(entry.final_text(direction).is_none());
        }
        assert!(!entry.reviewed);
    }

    #[test]
    fn draft_and_final_are_independent() {
        let mut entry = StandupEntry::new(Uuid::new_v4());

        entry.set_draft(Direction::Minus24, "suggested text".into());
        entry.set_final(Direction::Minus24, "approved text".into());

        assert_eq!(entry.draft(Direction::Minus24), Some("suggested text"));
        assert_eq!(entry.final_text(Direction::Minus24), Some("approved text"));
    }

    #[test]
    fn directions_do_not_bleed_into_each_other() {
        let mut entry = StandupEntry::new(Uuid::new_v4());

        entry.set_draft(Direction::Minus24, "past".into());
        entry.set_draft(Direction::Plus24, "future".into());

        assert_eq!(entry.draft(Direction::Minus24), Some("past"));
        assert_eq!(entry.draft(Direction::Plus24), Some("future"));
        assert!(entry.minus24_edited_at.is_some());
        assert!(entry.plus24_edited_at.is_some());
    }

    #[test]
    fn published_is_derived_from_range_end() {
        let now = Timestamp::now();
        let mut standup = Standup {
            id: Uuid::new_v4(),
            title: "Standup".into(),
            range_start: Timestamp::MIN,
            range_end: None,
            previous_standup_id: None,
            created: now,
            updated: now,
            entries: Vec::new(),
        };

        assert!(!standup.is_published());
        standup.range_end = Some(now);
        assert!(standup.is_published());
    }
}
