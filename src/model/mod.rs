//! Core data model for sitrep.
//!
//! A workspace owns workstreams and standups as sibling collections,
//! cross-referenced by id — never by pointer, so either side can be
//! deleted independently. All mutation flows through [`Workspace`].

mod day;
mod standup;
mod workspace;
mod workstream;

pub use day::IsoDay;
pub use standup::{Direction, Standup, StandupEntry};
pub use workspace::Workspace;
pub use workstream::{Entry, Workstream, WorkstreamStatus};
