//! Prompt construction for standup drafting.
//!
//! Pure functions: identical inputs produce identical prompts, no clock, no
//! network, no mutation. A prompt carries a fixed style guide, the shared
//! vocabulary the drafts should use, the period's raw notes in
//! chronological order, and any free-form guidance from the user. An empty
//! period renders a literal `None` line — downstream consumers never see an
//! empty section.

use crate::model::{Entry, Workstream};

const STYLE_GUIDE: &str = "\
You draft standup updates from an engineer's raw work notes.
Write in first person, one to three plain sentences, no bullet points,
no headings, no preamble. Keep concrete identifiers (ticket keys, PR
numbers, service names) exactly as written in the notes. Do not invent
work that the notes do not mention.";

const VOCABULARY: &str = "\
Vocabulary:
- workstream: a named, ongoing unit of work
- standup: a periodic summary document
- \"-24\": the section covering work done since the last standup
- \"+24\": the section covering work planned next";

/// Builds the prompt for the "-24" (work done) section.
#[must_use]
pub fn minus24_prompt(workstream: &Workstream, entries: &[&Entry], notes: Option<&str>) -> String {
    build(
        workstream,
        entries,
        notes,
        "Write the \"-24\" section: summarize the work done on this \
         workstream in the period, past tense.",
    )
}

/// Builds the prompt for the "+24" (work planned) section.
#[must_use]
pub fn plus24_prompt(workstream: &Workstream, entries: &[&Entry], notes: Option<&str>) -> String {
    build(
        workstream,
        entries,
        notes,
        "Write the \"+24\" section: describe what comes next on this \
         workstream, future tense.",
    )
}

fn build(
    workstream: &Workstream,
    entries: &[&Entry],
    notes: Option<&str>,
    instruction: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(STYLE_GUIDE);
    prompt.push_str("\n\n");
    prompt.push_str(VOCABULARY);
    prompt.push_str("\n\nWorkstream: ");
    prompt.push_str(&workstream.title);
    if let Some(key) = &workstream.issue_key {
        prompt.push_str(" (");
        prompt.push_str(key);
        prompt.push(')');
    }
    prompt.push_str("\n\nRaw notes for the period, oldest first:\n");
    prompt.push_str(&entry_lines(entries));
    prompt.push_str("\n\nGuidance from the author:\n");
    prompt.push_str(notes.filter(|n| !n.trim().is_empty()).unwrap_or("None"));
    prompt.push_str("\n\n");
    prompt.push_str(instruction);
    prompt
}

fn entry_lines(entries: &[&Entry]) -> String {
    if entries.is_empty() {
        return "None".to_string();
    }
    entries
        .iter()
        .map(|e| e.body.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use uuid::Uuid;

    use crate::model::IsoDay;

    fn entry(body: &str) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            body: body.into(),
            created: Timestamp::now(),
            day: IsoDay::new(2026, 8, 6).unwrap(),
            deleted: false,
        }
    }

    fn stream() -> Workstream {
        Workstream::new("Payments migration", Some("PAY-142".into()))
    }

    #[test]
    fn identical_inputs_produce_identical_prompts() {
        let stream = stream();
        let a = entry("moved ledger writes");
        let b = entry("fixed retry loop");
        let entries = vec![&a, &b];

        let first = minus24_prompt(&stream, &entries, Some("mention the deadline"));
        let second = minus24_prompt(&stream, &entries, Some("mention the deadline"));

        assert_eq!(first, second);
    }

    #[test]
    fn entries_appear_one_per_line_in_given_order() {
        let stream = stream();
        let a = entry("first note");
        let b = entry("second note");

        let prompt = minus24_prompt(&stream, &[&a, &b], None);

        assert!(prompt.contains("first note\nsecond note"));
    }

    #[test]
    fn empty_period_renders_none_placeholder() {
        let stream = stream();

        let prompt = plus24_prompt(&stream, &[], None);

        assert!(prompt.contains("Raw notes for the period, oldest first:\nNone"));
    }

    #[test]
    fn blank_guidance_renders_none_placeholder() {
        let stream = stream();

        let prompt = minus24_prompt(&stream, &[], Some("   "));

        assert!(prompt.contains("Guidance from the author:\nNone"));
    }

    #[test]
    fn includes_title_and_issue_key() {
        let prompt = minus24_prompt(&stream(), &[], None);

        assert!(prompt.contains("Workstream: Payments migration (PAY-142)"));
    }

    #[test]
    fn directions_get_distinct_instructions() {
        let stream = stream();
        let minus = minus24_prompt(&stream, &[], None);
        let plus = plus24_prompt(&stream, &[], None);

        assert!(minus.contains("\"-24\" section"));
        assert!(plus.contains("\"+24\" section"));
        assert_ne!(minus, plus);
    }
}
