//! The workspace aggregate: one user's workstreams and standups.
//!
//! Both collections are owned here as siblings and cross-referenced by id
//! only. All mutation flows through this API, and a mutation that names an
//! absent id is a silent no-op: the UI may race a deletion against a pending
//! edit, and the workspace swallows the stale call instead of failing it.
//!
//! Workstreams and standups are hard-deleted at this level; note entries
//! inside a workstream are soft-deleted (see [`Workstream`]).

use jiff::Timestamp;
use uuid::Uuid;

use super::{Direction, Standup, StandupEntry, Workstream, WorkstreamStatus};

/// Sentinel start for the first standup: its period covers everything
/// before now.
const DISTANT_PAST: Timestamp = Timestamp::MIN;

/// Top-level container for one user's workstreams and standups.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub id: Uuid,
    pub title: String,
    pub created: Timestamp,
    pub updated: Timestamp,
    workstreams: Vec<Workstream>,
    standups: Vec<Standup>,
}

impl Workspace {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created: now,
            updated: now,
            workstreams: Vec::new(),
            standups: Vec::new(),
        }
    }

    /// Reassembles a workspace from persisted parts.
    pub(crate) fn from_parts(
        id: Uuid,
        title: String,
        created: Timestamp,
        updated: Timestamp,
        workstreams: Vec<Workstream>,
        standups: Vec<Standup>,
    ) -> Self {
        Self {
            id,
            title,
            created,
            updated,
            workstreams,
            standups,
        }
    }

    // ── Workstreams ──

    /// All workstreams, in creation order.
    #[must_use]
    pub fn workstreams(&self) -> &[Workstream] {
        &self.workstreams
    }

    /// Looks up a workstream by id. Explicitly resolve-or-none: callers must
    /// tolerate absence, since standup entries can outlive their workstream.
    #[must_use]
    pub fn workstream(&self, id: Uuid) -> Option<&Workstream> {
        self.workstreams.iter().find(|w| w.id == id)
    }

    fn workstream_mut(&mut self, id: Uuid) -> Option<&mut Workstream> {
        self.workstreams.iter_mut().find(|w| w.id == id)
    }

    /// Workstreams eligible for standup carry-forward, in list order.
    pub fn active_workstreams(&self) -> impl Iterator<Item = &Workstream> {
        self.workstreams
            .iter()
            .filter(|w| w.status == WorkstreamStatus::Active && !w.deleted)
    }

    /// Appends a new active workstream and returns its id. Never fails.
    pub fn create_workstream(
        &mut self,
        title: impl Into<String>,
        issue_key: Option<String>,
    ) -> Uuid {
        let stream = Workstream::new(title, issue_key);
        let id = stream.id;
        self.workstreams.push(stream);
        self.touch();
        id
    }

    /// Replaces a workstream in place, keyed by id. No-op if absent.
    pub fn update_workstream(&mut self, stream: Workstream) {
        if let Some(slot) = self.workstream_mut(stream.id) {
            *slot = stream;
            self.touch();
        }
    }

    /// Removes a workstream from the collection. Idempotent.
    ///
    /// Hard delete: standup entries referencing it keep their text and
    /// resolve the id to none from then on.
    pub fn delete_workstream(&mut self, id: Uuid) {
        let before = self.workstreams.len();
        self.workstreams.retain(|w| w.id != id);
        if self.workstreams.len() != before {
            self.touch();
        }
    }

    /// Logs a note against a workstream. Returns the new entry's id, or
    /// `None` if the workstream is missing or soft-deleted.
    pub fn add_workstream_entry(
        &mut self,
        stream_id: Uuid,
        body: impl Into<String>,
    ) -> Option<Uuid> {
        let stream = self.workstream_mut(stream_id).filter(|w| !w.deleted)?;
        let id = stream.add_entry(body);
        self.touch();
        Some(id)
    }

    /// Soft-deletes a note entry. No-op if the workstream or entry is absent.
    pub fn delete_workstream_entry(&mut self, stream_id: Uuid, entry_id: Uuid) {
        if let Some(stream) = self.workstream_mut(stream_id) {
            stream.delete_entry(entry_id);
            self.touch();
        }
    }

    // ── Standups ──

    /// All standups, in creation order.
    #[must_use]
    pub fn standups(&self) -> &[Standup] {
        &self.standups
    }

    /// Looks up a standup by id.
    #[must_use]
    pub fn standup(&self, id: Uuid) -> Option<&Standup> {
        self.standups.iter().find(|s| s.id == id)
    }

    fn standup_mut(&mut self, id: Uuid) -> Option<&mut Standup> {
        self.standups.iter_mut().find(|s| s.id == id)
    }

    /// The most recently published standup, by `range_end`.
    #[must_use]
    pub fn latest_published(&self) -> Option<&Standup> {
        self.standups
            .iter()
            .filter(|s| s.is_published())
            .max_by_key(|s| s.range_end)
    }

    /// Assembles a new open standup and returns its id. Never fails.
    ///
    /// The period starts where the last published standup ended (or at the
    /// distant past for the first). Every currently-active workstream gets
    /// an empty entry, snapshotted now: later status changes elsewhere do
    /// not reshuffle this standup, and the standup's membership can be
    /// edited without touching "active" anywhere else.
    pub fn create_standup(&mut self, title: impl Into<String>) -> Uuid {
        let previous = self.latest_published();
        let range_start = previous.and_then(|s| s.range_end).unwrap_or(DISTANT_PAST);
        let previous_standup_id = previous.map(|s| s.id);

        let entries: Vec<StandupEntry> = self
            .active_workstreams()
            .map(|w| StandupEntry::new(w.id))
            .collect();

        let now = Timestamp::now();
        let standup = Standup {
            id: Uuid::new_v4(),
            title: title.into(),
            range_start,
            range_end: None,
            previous_standup_id,
            created: now,
            updated: now,
            entries,
        };
        let id = standup.id;
        self.standups.push(standup);
        self.touch();
        id
    }

    /// Publishes a standup: fixes `range_end` at now. Terminal and one-way.
    /// No-op if the standup is absent or already published.
    pub fn publish_standup(&mut self, id: Uuid) {
        if let Some(standup) = self.standup_mut(id)
            && !standup.is_published()
        {
            let now = Timestamp::now();
            standup.range_end = Some(now);
            standup.updated = now;
            self.touch();
        }
    }

    /// Replaces a standup in place, keyed by id. No-op if absent.
    pub fn update_standup(&mut self, standup: Standup) {
        if let Some(slot) = self.standup_mut(standup.id) {
            *slot = standup;
            self.touch();
        }
    }

    /// Removes a standup from the collection. Idempotent.
    pub fn delete_standup(&mut self, id: Uuid) {
        let before = self.standups.len();
        self.standups.retain(|s| s.id != id);
        if self.standups.len() != before {
            self.touch();
        }
    }

    /// Includes a workstream in a standup, returning the entry's id.
    ///
    /// Returns the existing entry's id if the workstream is already
    /// included. `None` if the standup is absent or published. Does not
    /// care whether the workstream currently exists: membership is by id.
    pub fn add_workstream_to_standup(&mut self, standup_id: Uuid, stream_id: Uuid) -> Option<Uuid> {
        let standup = self.standup_mut(standup_id).filter(|s| !s.is_published())?;
        if let Some(existing) = standup.entry_for(stream_id) {
            return Some(existing.id);
        }
        let entry = StandupEntry::new(stream_id);
        let id = entry.id;
        standup.entries.push(entry);
        standup.updated = Timestamp::now();
        self.touch();
        Some(id)
    }

    /// Drops a workstream's entry from a standup. The workstream itself and
    /// its notes are untouched. No-op if absent or published.
    pub fn remove_workstream_from_standup(&mut self, standup_id: Uuid, stream_id: Uuid) {
        if let Some(standup) = self.standup_mut(standup_id).filter(|s| !s.is_published()) {
            let before = standup.entries.len();
            standup.entries.retain(|e| e.workstream_id != stream_id);
            if standup.entries.len() != before {
                standup.updated = Timestamp::now();
                self.touch();
            }
        }
    }

    /// Sets the machine-suggested draft for one section. No-op if the
    /// standup or entry is absent, or the standup is published.
    pub fn set_draft(
        &mut self,
        standup_id: Uuid,
        stream_id: Uuid,
        direction: Direction,
        text: impl Into<String>,
    ) {
        self.with_entry(standup_id, stream_id, |entry| {
            entry.set_draft(direction, text.into());
        });
    }

    /// Sets the free-form guidance that steers the next draft generation.
    pub fn set_draft_notes(
        &mut self,
        standup_id: Uuid,
        stream_id: Uuid,
        direction: Direction,
        text: impl Into<String>,
    ) {
        self.with_entry(standup_id, stream_id, |entry| {
            entry.set_draft_notes(direction, text.into());
        });
    }

    /// Sets the user-approved final text for one section.
    pub fn set_final(
        &mut self,
        standup_id: Uuid,
        stream_id: Uuid,
        direction: Direction,
        text: impl Into<String>,
    ) {
        self.with_entry(standup_id, stream_id, |entry| {
            entry.set_final(direction, text.into());
        });
    }

    /// Marks a standup entry reviewed (or not).
    pub fn set_entry_reviewed(&mut self, standup_id: Uuid, stream_id: Uuid, reviewed: bool) {
        self.with_entry(standup_id, stream_id, |entry| {
            entry.reviewed = reviewed;
        });
    }

    /// Applies a mutation to one standup entry, guarding the publish freeze
    /// and the absent-id no-op contract in a single place.
    fn with_entry(
        &mut self,
        standup_id: Uuid,
        stream_id: Uuid,
        mutate: impl FnOnce(&mut StandupEntry),
    ) {
        if let Some(standup) = self.standup_mut(standup_id).filter(|s| !s.is_published())
            && let Some(entry) = standup.entry_for_mut(stream_id)
        {
            mutate(entry);
            standup.updated = Timestamp::now();
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Span;

    fn one_second() -> Span {
        Span::new().seconds(1)
    }

    fn sample_workspace() -> Workspace {
        Workspace::new("Personal")
    }

    #[test]
    fn create_workstream_appends_active() {
        let mut ws = sample_workspace();

        let id = ws.create_workstream("W1", Some("PAY-1".into()));

        let stream = ws.workstream(id).unwrap();
        assert_eq!(stream.title, "W1");
        assert_eq!(stream.status, WorkstreamStatus::Active);
        assert!(!stream.deleted);
    }

    #[test]
    fn delete_workstream_is_idempotent() {
        let mut ws = sample_workspace();
        let id = ws.create_workstream("W1", None);

        ws.delete_workstream(id);
        let after_first = ws.clone();
        ws.delete_workstream(id);

        assert_eq!(ws.workstreams(), after_first.workstreams());
        assert!(ws.workstream(id).is_none());
    }

    #[test]
    fn update_workstream_replaces_in_place_and_ignores_unknown() {
        let mut ws = sample_workspace();
        let id = ws.create_workstream("W1", None);

        let mut renamed = ws.workstream(id).unwrap().clone();
        renamed.title = "W1 renamed".into();
        ws.update_workstream(renamed);
        assert_eq!(ws.workstream(id).unwrap().title, "W1 renamed");

        let phantom = Workstream::new("never added", None);
        ws.update_workstream(phantom.clone());
        assert!(ws.workstream(phantom.id).is_none());
    }

    #[test]
    fn add_entry_to_missing_or_deleted_stream_is_none() {
        let mut ws = sample_workspace();
        assert!(ws.add_workstream_entry(Uuid::new_v4(), "lost").is_none());

        let id = ws.create_workstream("W1", None);
        let mut soft_deleted = ws.workstream(id).unwrap().clone();
        soft_deleted.deleted = true;
        ws.update_workstream(soft_deleted);

        assert!(ws.add_workstream_entry(id, "also lost").is_none());
    }

    #[test]
    fn first_standups_share_distant_past_until_one_is_published() {
        let mut ws = sample_workspace();

        let s1 = ws.create_standup("S1");
        let s2 = ws.create_standup("S2");

        for id in [s1, s2] {
            let standup = ws.standup(id).unwrap();
            assert_eq!(standup.previous_standup_id, None);
            assert_eq!(standup.range_start, Timestamp::MIN);
            assert!(!standup.is_published());
        }
    }

    #[test]
    fn publish_then_create_chains_the_period() {
        let mut ws = sample_workspace();
        let s1 = ws.create_standup("S1");

        ws.publish_standup(s1);
        let end = ws.standup(s1).unwrap().range_end.unwrap();

        let s2 = ws.create_standup("S2");
        let second = ws.standup(s2).unwrap();
        assert_eq!(second.previous_standup_id, Some(s1));
        assert_eq!(second.range_start, end);
    }

    #[test]
    fn publish_is_one_way_and_keeps_the_first_range_end() {
        let mut ws = sample_workspace();
        let s1 = ws.create_standup("S1");

        ws.publish_standup(s1);
        let first_end = ws.standup(s1).unwrap().range_end;
        ws.publish_standup(s1);

        assert_eq!(ws.standup(s1).unwrap().range_end, first_end);
    }

    #[test]
    fn create_standup_snapshots_active_workstreams_in_order() {
        let mut ws = sample_workspace();
        let active = ws.create_workstream("active", None);
        let paused_id = ws.create_workstream("paused", None);
        let second_active = ws.create_workstream("also active", None);

        let mut paused = ws.workstream(paused_id).unwrap().clone();
        paused.status = WorkstreamStatus::Paused;
        ws.update_workstream(paused);

        let s = ws.create_standup("S1");
        let standup = ws.standup(s).unwrap();

        let members: Vec<Uuid> = standup.entries.iter().map(|e| e.workstream_id).collect();
        assert_eq!(members, vec![active, second_active]);
        for entry in &standup.entries {
            assert!(entry.minus24_draft.is_none());
            assert!(entry.minus24_final.is_none());
            assert!(entry.plus24_draft.is_none());
            assert!(entry.plus24_final.is_none());
        }
    }

    #[test]
    fn snapshot_is_fixed_at_creation_time() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        let s = ws.create_standup("S1");

        // Pausing after the fact does not reshuffle the standup.
        let mut paused = ws.workstream(w1).unwrap().clone();
        paused.status = WorkstreamStatus::Paused;
        ws.update_workstream(paused);

        assert!(ws.standup(s).unwrap().entry_for(w1).is_some());
    }

    #[test]
    fn standup_period_query_scenario() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        ws.add_workstream_entry(w1, "did X");
        ws.add_workstream_entry(w1, "did Y");

        let s1 = ws.create_standup("S1");
        assert_eq!(ws.standup(s1).unwrap().entries.len(), 1);

        ws.publish_standup(s1);
        let end = ws.standup(s1).unwrap().range_end.unwrap();

        let z = ws.add_workstream_entry(w1, "did Z").unwrap();
        // The clock may not tick between publish and the new entry; pin the
        // new entry strictly after the boundary.
        let stream = ws.workstream_mut(w1).unwrap();
        let entry = stream.entries.iter_mut().find(|e| e.id == z).unwrap();
        entry.created = end.checked_add(one_second()).unwrap();

        let stream = ws.workstream(w1).unwrap();
        let in_next_period = stream.entries_for_period(end, None);
        let bodies: Vec<_> = in_next_period.iter().map(|e| e.body.as_str()).collect();
        assert_eq!(bodies, ["did Z"]);
    }

    #[test]
    fn add_and_remove_workstream_membership() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        let s = ws.create_standup("S1");

        // Already included from the snapshot: returns the existing entry.
        let existing = ws.standup(s).unwrap().entry_for(w1).unwrap().id;
        assert_eq!(ws.add_workstream_to_standup(s, w1), Some(existing));

        ws.remove_workstream_from_standup(s, w1);
        assert!(ws.standup(s).unwrap().entry_for(w1).is_none());
        // The workstream itself is untouched.
        assert!(ws.workstream(w1).is_some());

        let again = ws.add_workstream_to_standup(s, w1).unwrap();
        assert_eq!(ws.standup(s).unwrap().entry_for(w1).unwrap().id, again);
    }

    #[test]
    fn draft_and_final_are_independent_fields() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        let s = ws.create_standup("S1");

        ws.set_draft(s, w1, Direction::Minus24, "machine text");
        ws.set_final(s, w1, Direction::Minus24, "human text");

        let entry = ws.standup(s).unwrap().entry_for(w1).unwrap();
        assert_eq!(entry.draft(Direction::Minus24), Some("machine text"));
        assert_eq!(entry.final_text(Direction::Minus24), Some("human text"));
    }

    #[test]
    fn section_setters_ignore_unknown_ids() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        let s = ws.create_standup("S1");
        let before = ws.standup(s).unwrap().clone();

        ws.set_draft(Uuid::new_v4(), w1, Direction::Minus24, "nowhere");
        ws.set_final(s, Uuid::new_v4(), Direction::Plus24, "nowhere");

        assert_eq!(ws.standup(s).unwrap(), &before);
    }

    #[test]
    fn published_standup_content_is_frozen() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        let w2 = ws.create_workstream("W2", None);
        let s = ws.create_standup("S1");
        ws.set_final(s, w1, Direction::Minus24, "shipped it");

        ws.publish_standup(s);
        let frozen = ws.standup(s).unwrap().clone();

        ws.set_draft(s, w1, Direction::Minus24, "late draft");
        ws.set_final(s, w1, Direction::Plus24, "late final");
        ws.set_draft_notes(s, w1, Direction::Minus24, "late notes");
        ws.set_entry_reviewed(s, w1, true);
        ws.remove_workstream_from_standup(s, w1);
        assert_eq!(ws.add_workstream_to_standup(s, w2), None);

        assert_eq!(ws.standup(s).unwrap(), &frozen);
    }

    #[test]
    fn deleting_a_referenced_workstream_leaves_the_standup_entry() {
        let mut ws = sample_workspace();
        let w1 = ws.create_workstream("W1", None);
        let s = ws.create_standup("S1");
        ws.set_final(s, w1, Direction::Minus24, "kept text");
        ws.publish_standup(s);

        ws.delete_workstream(w1);

        let entry = ws.standup(s).unwrap().entry_for(w1).unwrap();
        assert_eq!(entry.final_text(Direction::Minus24), Some("kept text"));
        // The weak reference now resolves to nothing; callers render
        // "(no workstream)" instead of failing.
        assert!(ws.workstream(entry.workstream_id).is_none());
    }

    #[test]
    fn latest_published_picks_the_newest_range_end() {
        let mut ws = sample_workspace();
        let s1 = ws.create_standup("S1");
        let s2 = ws.create_standup("S2");

        ws.publish_standup(s1);
        ws.publish_standup(s2);
        // Force distinct, ordered boundaries.
        let end1 = ws.standup(s1).unwrap().range_end.unwrap();
        ws.standup_mut(s2).unwrap().range_end = Some(end1.checked_add(one_second()).unwrap());

        assert_eq!(ws.latest_published().unwrap().id, s2);
    }

    #[test]
    fn delete_standup_is_idempotent() {
        let mut ws = sample_workspace();
        let s = ws.create_standup("S1");

        ws.delete_standup(s);
        ws.delete_standup(s);

        assert!(ws.standup(s).is_none());
        assert!(ws.standups().is_empty());
    }
}
