//! Workstream types: a named unit of ongoing work and its note log.
//!
//! The entry log is append-only. A "deleted" entry is only flagged, never
//! removed, so standups that already cover its period keep their history.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::IsoDay;

/// A named unit of ongoing work with an append-only log of dated entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workstream {
    pub id: Uuid,
    pub title: String,

    /// External tracker reference (e.g. "PAY-142"), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_key: Option<String>,

    pub status: WorkstreamStatus,

    #[serde(default)]
    pub deleted: bool,

    pub created: Timestamp,
    pub updated: Timestamp,

    /// Insertion order is chronological order of creation.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Where a workstream stands in its lifecycle.
///
/// Only active workstreams are carried into new standups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkstreamStatus {
    Active,
    Paused,
    Completed,
}

/// A single dated, free-text note logged against a workstream.
///
/// The body is immutable once created; edits are not supported, only
/// deletion, and deletion only sets the flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    pub body: String,

    /// Primary temporal key: decides which standup period the entry
    /// belongs to.
    pub created: Timestamp,

    /// The calendar day the entry was recorded, for by-day display.
    pub day: IsoDay,

    #[serde(default)]
    pub deleted: bool,
}

impl Workstream {
    /// Creates an active workstream with an empty log.
    #[must_use]
    pub fn new(title: impl Into<String>, issue_key: Option<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            issue_key,
            status: WorkstreamStatus::Active,
            deleted: false,
            created: now,
            updated: now,
            entries: Vec::new(),
        }
    }

    /// Appends a new entry dated now. Always succeeds.
    pub fn add_entry(&mut self, body: impl Into<String>) -> Uuid {
        let now = Timestamp::now();
        let entry = Entry {
            id: Uuid::new_v4(),
            body: body.into(),
            created: now,
            day: IsoDay::today(),
            deleted: false,
        };
        let id = entry.id;
        self.entries.push(entry);
        self.updated = now;
        id
    }

    /// Soft-deletes an entry. Idempotent; unknown ids are ignored.
    pub fn delete_entry(&mut self, id: Uuid) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id)
            && !entry.deleted
        {
            entry.deleted = true;
            self.updated = Timestamp::now();
        }
    }

    /// Visible (not soft-deleted) entries. The one filter every view applies.
    pub fn visible_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.deleted)
    }

    /// Visible entries with `created` in `(start, end]`.
    ///
    /// `end = None` means "now" — the open period of an unpublished standup.
    /// Ranges are left-exclusive, right-inclusive, so an entry created
    /// exactly on a boundary lands in exactly one of two adjacent periods.
    /// Both display and prompt construction go through this query.
    #[must_use]
    pub fn entries_for_period(&self, start: Timestamp, end: Option<Timestamp>) -> Vec<&Entry> {
        let end = end.unwrap_or_else(Timestamp::now);
        self.visible_entries()
            .filter(|e| e.created > start && e.created <= end)
            .collect()
    }

    /// Visible entries grouped by the day they were recorded. Display only.
    #[must_use]
    pub fn entries_by_day(&self) -> BTreeMap<IsoDay, Vec<&Entry>> {
        let mut days: BTreeMap<IsoDay, Vec<&Entry>> = BTreeMap::new();
        for entry in self.visible_entries() {
            days.entry(entry.day).or_default().push(entry);
        }
        days
    }

    /// Days with at least one visible entry, ascending.
    #[must_use]
    pub fn days_with_entries(&self) -> Vec<IsoDay> {
        self.entries_by_day().into_keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::new(seconds, 0).unwrap()
    }

    fn entry_at(body: &str, seconds: i64) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            body: body.into(),
            created: ts(seconds),
            day: IsoDay::new(2026, 8, 6).unwrap(),
            deleted: false,
        }
    }

    fn sample_stream() -> Workstream {
        Workstream::new("Payments migration", Some("PAY-142".into()))
    }

    #[test]
    fn add_entry_appends_and_touches_updated() {
        let mut stream = sample_stream();
        let before = stream.updated;

        let id = stream.add_entry("moved ledger writes");

        assert_eq!(stream.entries.len(), 1);
        assert_eq!(stream.entries[0].id, id);
        assert_eq!(stream.entries[0].body, "moved ledger writes");
        assert!(stream.updated >= before);
    }

    #[test]
    fn deleted_entry_hidden_from_views_but_still_stored() {
        let mut stream = sample_stream();
        let keep = stream.add_entry("did X");
        let drop = stream.add_entry("did Y");

        stream.delete_entry(drop);

        let visible: Vec<_> = stream.visible_entries().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, keep);

        let period = stream.entries_for_period(Timestamp::MIN, None);
        assert!(period.iter().all(|e| e.id != drop));

        let by_day = stream.entries_by_day();
        assert!(by_day.values().flatten().all(|e| e.id != drop));

        // Total stored count is unchanged: deletion only flags.
        assert_eq!(stream.entries.len(), 2);
    }

    #[test]
    fn delete_entry_is_idempotent_and_ignores_unknown_ids() {
        let mut stream = sample_stream();
        let id = stream.add_entry("did X");

        stream.delete_entry(id);
        let after_first = stream.clone();
        stream.delete_entry(id);
        stream.delete_entry(Uuid::new_v4());

        assert_eq!(stream.entries, after_first.entries);
    }

    #[test]
    fn period_is_left_exclusive_right_inclusive() {
        let mut stream = sample_stream();
        stream.entries = vec![
            entry_at("at start", 100),
            entry_at("inside", 150),
            entry_at("at end", 200),
            entry_at("after", 250),
        ];

        let hits = stream.entries_for_period(ts(100), Some(ts(200)));
        let bodies: Vec<_> = hits.iter().map(|e| e.body.as_str()).collect();

        // The entry at the start boundary is excluded, the one at the end
        // boundary is included.
        assert_eq!(bodies, ["inside", "at end"]);
    }

    #[test]
    fn adjacent_periods_partition_entries() {
        let mut stream = sample_stream();
        stream.entries = vec![
            entry_at("a", 101),
            entry_at("b", 200),
            entry_at("c", 201),
            entry_at("d", 300),
        ];

        let first = stream.entries_for_period(ts(100), Some(ts(200)));
        let second = stream.entries_for_period(ts(200), Some(ts(300)));

        let mut seen: Vec<Uuid> = first.iter().chain(second.iter()).map(|e| e.id).collect();
        let full: Vec<Uuid> = stream
            .entries_for_period(ts(100), Some(ts(300)))
            .iter()
            .map(|e| e.id)
            .collect();

        // Every entry in (100, 300] appears in exactly one of the halves.
        seen.sort();
        let mut expected = full.clone();
        expected.sort();
        assert_eq!(seen, expected);
        assert_eq!(first.len() + second.len(), full.len());
    }

    #[test]
    fn open_period_upper_bound_is_now() {
        let mut stream = sample_stream();
        stream.add_entry("recent");

        let hits = stream.entries_for_period(Timestamp::MIN, None);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn groups_entries_by_day() {
        let mut stream = sample_stream();
        let monday = IsoDay::new(2026, 8, 3).unwrap();
        let tuesday = IsoDay::new(2026, 8, 4).unwrap();
        stream.entries = vec![
            Entry {
                day: monday,
                ..entry_at("one", 100)
            },
            Entry {
                day: tuesday,
                ..entry_at("two", 200)
            },
            Entry {
                day: monday,
                ..entry_at("three", 300)
            },
        ];

        let by_day = stream.entries_by_day();
        assert_eq!(by_day[&monday].len(), 2);
        assert_eq!(by_day[&tuesday].len(), 1);
        assert_eq!(stream.days_with_entries(), vec![monday, tuesday]);
    }
}
