//! Output formatting for CLI display.

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{Direction, IsoDay, Standup, Workspace, Workstream, WorkstreamStatus};

/// The first eight hex digits of a UUID, for listings and prompts.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub(super) fn format_status(status: WorkstreamStatus) -> &'static str {
    match status {
        WorkstreamStatus::Active => "active",
        WorkstreamStatus::Paused => "paused",
        WorkstreamStatus::Completed => "completed",
    }
}

/// Renders a standup for `standup show`.
///
/// Published standups read final text only; open standups fall back from
/// final to draft. A section with neither renders a dash. Workstreams that
/// no longer resolve render "(no workstream)".
pub(super) fn format_standup(workspace: &Workspace, standup: &Standup) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n", standup.title));
    out.push_str(&format!(
        "{}  period: {}\n",
        if standup.is_published() {
            "published"
        } else {
            "open"
        },
        format_period(standup),
    ));

    for entry in &standup.entries {
        let stream = workspace.workstream(entry.workstream_id);
        let title = stream.map_or("(no workstream)", |w| w.title.as_str());
        out.push('\n');
        out.push_str(&format!("## {title}"));
        if let Some(key) = stream.and_then(|w| w.issue_key.as_ref()) {
            out.push_str(&format!(" [{key}]"));
        }
        if entry.reviewed {
            out.push_str(" (reviewed)");
        }
        out.push('\n');

        for direction in [Direction::Minus24, Direction::Plus24] {
            let label = match direction {
                Direction::Minus24 => "-24",
                Direction::Plus24 => "+24",
            };
            let text = if standup.is_published() {
                entry.final_text(direction)
            } else {
                entry.final_text(direction).or_else(|| entry.draft(direction))
            };
            out.push_str(&format!("{label}: {}\n", text.unwrap_or("-")));
        }
    }
    out
}

/// Renders a workstream's visible notes grouped by day, oldest day first.
pub(super) fn format_notes(stream: &Workstream) -> String {
    let days = stream.days_with_entries();
    if days.is_empty() {
        return "No notes".to_string();
    }
    let by_day = stream.entries_by_day();
    let mut out = String::new();
    for day in days {
        out.push_str(&format!("{day}{}\n", day_label(day)));
        for entry in by_day.get(&day).into_iter().flatten() {
            out.push_str(&format!("  {}  {}\n", short_id(entry.id), entry.body));
        }
    }
    out
}

fn day_label(day: IsoDay) -> &'static str {
    if day == IsoDay::today() {
        " (today)"
    } else if day == IsoDay::yesterday() {
        " (yesterday)"
    } else {
        ""
    }
}

/// Human-readable period bounds. The distant-past sentinel reads as
/// "the beginning"; an open end reads as "now".
pub(super) fn format_period(standup: &Standup) -> String {
    let start = if standup.range_start == Timestamp::MIN {
        "the beginning".to_string()
    } else {
        format_instant(standup.range_start)
    };
    let end = standup
        .range_end
        .map_or_else(|| "now".to_string(), format_instant);
    format!("{start} → {end}")
}

fn format_instant(ts: Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::Direction;

    #[test]
    fn published_standup_reads_finals_only() {
        let mut ws = Workspace::new("Personal");
        let w1 = ws.create_workstream("Payments", None);
        let s = ws.create_standup("Standup");
        ws.set_draft(s, w1, Direction::Minus24, "draft text");
        ws.set_final(s, w1, Direction::Minus24, "final text");
        ws.set_draft(s, w1, Direction::Plus24, "plus draft");
        ws.publish_standup(s);

        let rendered = format_standup(&ws, ws.standup(s).unwrap());

        assert!(rendered.contains("-24: final text"));
        // The unapproved draft does not leak into published output.
        assert!(rendered.contains("+24: -"));
        assert!(!rendered.contains("plus draft"));
        assert!(rendered.contains("published"));
    }

    #[test]
    fn open_standup_falls_back_to_drafts() {
        let mut ws = Workspace::new("Personal");
        let w1 = ws.create_workstream("Payments", None);
        let s = ws.create_standup("Standup");
        ws.set_draft(s, w1, Direction::Minus24, "draft text");

        let rendered = format_standup(&ws, ws.standup(s).unwrap());

        assert!(rendered.contains("-24: draft text"));
        assert!(rendered.contains("+24: -"));
        assert!(rendered.contains("period: the beginning → now"));
    }

    #[test]
    fn vanished_workstream_renders_placeholder() {
        let mut ws = Workspace::new("Personal");
        let w1 = ws.create_workstream("Payments", None);
        let s = ws.create_standup("Standup");
        ws.set_final(s, w1, Direction::Minus24, "kept");
        ws.publish_standup(s);
        ws.delete_workstream(w1);

        let rendered = format_standup(&ws, ws.standup(s).unwrap());

        assert!(rendered.contains("## (no workstream)"));
        assert!(rendered.contains("-24: kept"));
    }

    #[test]
    fn notes_grouped_by_day_ascending() {
        let mut stream = Workstream::new("Payments", None);
        stream.add_entry("first");
        stream.add_entry("second");

        let rendered = format_notes(&stream);

        assert!(rendered.contains("first"));
        assert!(rendered.contains("second"));
        let expected_header = format!("{} (today)", IsoDay::today());
        assert!(rendered.starts_with(&expected_header));
    }

    #[test]
    fn empty_notes() {
        let stream = Workstream::new("Payments", None);
        assert_eq!(format_notes(&stream), "No notes");
    }
}
