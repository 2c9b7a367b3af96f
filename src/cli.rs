//! CLI interface for sitrep.
//!
//! Each subcommand is non-interactive: arguments in, text out. Commands
//! split into two groups:
//!
//! - `sitrep workspace new|list` — lifecycle management, no workspace
//!   context needed.
//! - `sitrep --workspace <id> <command>` — everything else, operating
//!   within a workspace.
//!
//! The `--workspace` flag takes a full UUID or unambiguous prefix and may
//! be omitted when exactly one workspace exists. Workstream and standup
//! arguments resolve the same way, within the workspace.

mod format;

use std::io::{self, Write};

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::config::Config;
use crate::draft::{DraftEngine, DraftKey, DraftOutcome, OpenAiModel};
use crate::model::{Direction, IsoDay, Workspace, Workstream, WorkstreamStatus};
use crate::storage::Storage;
use crate::{prompt, tracker::TrackerClient};

use format::{format_notes, format_period, format_standup, format_status, short_id};

/// Sitrep — compose standups from your workstreams.
#[derive(Debug, Parser)]
#[command(name = "sitrep", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Workspace ID: full UUID or unambiguous prefix (e.g. `a3b`).
    /// Optional when exactly one workspace exists.
    #[arg(long, global = true)]
    workspace: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: one standup cycle
  1. sitrep workspace new "Personal"
     → prints a workspace ID (e.g. a3b0fc12)
  2. sitrep stream new "Payments migration" --issue PAY-142
  3. sitrep note add <stream> "Moved ledger writes behind the new API"
  4. sitrep standup new
     → carries forward every active workstream
  5. sitrep draft <standup> <stream> --direction minus24
  6. sitrep final <standup> <stream> --direction minus24 "Migrated ledger writes."
  7. sitrep standup publish <standup>
     → freezes the period; the next standup starts where this one ended"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage workspaces: create new ones, list existing.
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },

    /// Manage workstreams: the ongoing units of work.
    Stream {
        #[command(subcommand)]
        command: StreamCommand,
    },

    /// Log and inspect dated notes against a workstream.
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },

    /// Assemble, inspect, and publish standups.
    Standup {
        #[command(subcommand)]
        command: StandupCommand,
    },

    /// Stream a machine draft for one standup section.
    ///
    /// Builds a prompt from the workstream's notes in the standup's period
    /// and stores the completed text as the section's draft. The draft
    /// never touches the final text.
    Draft {
        /// Standup ID or prefix.
        standup: String,

        /// Workstream ID or prefix.
        stream: String,

        /// Which section to draft.
        #[arg(long, value_enum)]
        direction: DirectionArg,

        /// Free-form guidance appended to the prompt and remembered for
        /// the next regeneration.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Set the user-approved final text for one standup section.
    Final {
        /// Standup ID or prefix.
        standup: String,

        /// Workstream ID or prefix.
        stream: String,

        /// Which section to approve.
        #[arg(long, value_enum)]
        direction: DirectionArg,

        /// The text that appears in published output.
        text: String,
    },

    /// List open issues assigned to you on the configured tracker.
    Issues,
}

#[derive(Debug, Subcommand)]
pub enum WorkspaceCommand {
    /// Create a new workspace. Prints the workspace ID.
    New {
        /// Workspace title.
        title: String,
    },

    /// List workspaces.
    List,
}

#[derive(Debug, Subcommand)]
pub enum StreamCommand {
    /// Create a workstream. Prints the workstream ID.
    New {
        /// What this workstream is about.
        title: String,

        /// External tracker key (e.g. PAY-142).
        #[arg(long)]
        issue: Option<String>,
    },

    /// Create a workstream from a tracker issue's key and summary.
    Adopt {
        /// Tracker issue key (e.g. PAY-142).
        key: String,
    },

    /// List workstreams.
    List,

    /// Pause a workstream: it stops being carried into new standups.
    Pause {
        /// Workstream ID or prefix.
        stream: String,
    },

    /// Resume a paused or completed workstream.
    Resume {
        /// Workstream ID or prefix.
        stream: String,
    },

    /// Mark a workstream completed.
    Complete {
        /// Workstream ID or prefix.
        stream: String,
    },

    /// Remove a workstream from the workspace.
    ///
    /// Standups that reference it keep their text and render
    /// "(no workstream)" from then on.
    Delete {
        /// Workstream ID or prefix.
        stream: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// Log a note against a workstream, dated today.
    Add {
        /// Workstream ID or prefix.
        stream: String,

        /// Free-text note body.
        body: String,
    },

    /// List a workstream's notes grouped by day.
    List {
        /// Workstream ID or prefix.
        stream: String,
    },

    /// Delete a note. The note is hidden, not erased: published standup
    /// periods keep their history.
    Delete {
        /// Workstream ID or prefix.
        stream: String,

        /// Note ID or prefix.
        note: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum StandupCommand {
    /// Create a standup covering everything since the last published one.
    New {
        /// Title; defaults to "Standup <today>".
        #[arg(long)]
        title: Option<String>,
    },

    /// List standups.
    List,

    /// Render a standup. Defaults to the most recent one.
    Show {
        /// Standup ID or prefix.
        standup: Option<String>,
    },

    /// Publish a standup: fix its period end. One-way.
    Publish {
        /// Standup ID or prefix.
        standup: String,
    },

    /// Rename a standup.
    Retitle {
        /// Standup ID or prefix.
        standup: String,

        /// The new title.
        title: String,
    },

    /// Remove a standup from the workspace.
    Delete {
        /// Standup ID or prefix.
        standup: String,
    },

    /// Include a workstream in an open standup.
    AddStream {
        /// Standup ID or prefix.
        standup: String,

        /// Workstream ID or prefix.
        stream: String,
    },

    /// Drop a workstream's section from an open standup.
    RemoveStream {
        /// Standup ID or prefix.
        standup: String,

        /// Workstream ID or prefix.
        stream: String,
    },

    /// Record guidance that steers the next draft for a section.
    Notes {
        /// Standup ID or prefix.
        standup: String,

        /// Workstream ID or prefix.
        stream: String,

        /// Which section the guidance applies to.
        #[arg(long, value_enum)]
        direction: DirectionArg,

        /// The guidance text.
        text: String,
    },

    /// Mark a workstream's section pair as reviewed.
    Review {
        /// Standup ID or prefix.
        standup: String,

        /// Workstream ID or prefix.
        stream: String,
    },
}

/// CLI-facing direction, mapped to the domain `Direction`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    /// Work done since the previous standup.
    Minus24,
    /// Work planned next.
    Plus24,
}

impl DirectionArg {
    fn to_domain(self) -> Direction {
        match self {
            Self::Minus24 => Direction::Minus24,
            Self::Plus24 => Direction::Plus24,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Workspace { command } => match command {
            WorkspaceCommand::New { title } => cmd_workspace_new(storage, &title),
            WorkspaceCommand::List => cmd_workspace_list(storage),
        },
        Command::Stream { command } => {
            let mut workspace = require_workspace(storage, cli.workspace.as_deref())?;
            match command {
                StreamCommand::New { title, issue } => {
                    cmd_stream_new(storage, &mut workspace, &title, issue)
                }
                StreamCommand::Adopt { key } => {
                    cmd_stream_adopt(config, storage, &mut workspace, &key)
                }
                StreamCommand::List => cmd_stream_list(&workspace),
                StreamCommand::Pause { stream } => cmd_stream_status(
                    storage,
                    &mut workspace,
                    &stream,
                    WorkstreamStatus::Paused,
                ),
                StreamCommand::Resume { stream } => cmd_stream_status(
                    storage,
                    &mut workspace,
                    &stream,
                    WorkstreamStatus::Active,
                ),
                StreamCommand::Complete { stream } => cmd_stream_status(
                    storage,
                    &mut workspace,
                    &stream,
                    WorkstreamStatus::Completed,
                ),
                StreamCommand::Delete { stream } => {
                    cmd_stream_delete(storage, &mut workspace, &stream)
                }
            }
        }
        Command::Note { command } => {
            let mut workspace = require_workspace(storage, cli.workspace.as_deref())?;
            match command {
                NoteCommand::Add { stream, body } => {
                    cmd_note_add(storage, &mut workspace, &stream, &body)
                }
                NoteCommand::List { stream } => cmd_note_list(&workspace, &stream),
                NoteCommand::Delete { stream, note } => {
                    cmd_note_delete(storage, &mut workspace, &stream, &note)
                }
            }
        }
        Command::Standup { command } => {
            let mut workspace = require_workspace(storage, cli.workspace.as_deref())?;
            match command {
                StandupCommand::New { title } => cmd_standup_new(storage, &mut workspace, title),
                StandupCommand::List => cmd_standup_list(&workspace),
                StandupCommand::Show { standup } => {
                    cmd_standup_show(&workspace, standup.as_deref())
                }
                StandupCommand::Publish { standup } => {
                    cmd_standup_publish(storage, &mut workspace, &standup)
                }
                StandupCommand::Retitle { standup, title } => {
                    cmd_standup_retitle(storage, &mut workspace, &standup, &title)
                }
                StandupCommand::Delete { standup } => {
                    cmd_standup_delete(storage, &mut workspace, &standup)
                }
                StandupCommand::AddStream { standup, stream } => {
                    cmd_standup_add_stream(storage, &mut workspace, &standup, &stream)
                }
                StandupCommand::RemoveStream { standup, stream } => {
                    cmd_standup_remove_stream(storage, &mut workspace, &standup, &stream)
                }
                StandupCommand::Notes {
                    standup,
                    stream,
                    direction,
                    text,
                } => cmd_standup_notes(
                    storage,
                    &mut workspace,
                    &standup,
                    &stream,
                    direction.to_domain(),
                    &text,
                ),
                StandupCommand::Review { standup, stream } => {
                    cmd_standup_review(storage, &mut workspace, &standup, &stream)
                }
            }
        }
        Command::Draft {
            standup,
            stream,
            direction,
            notes,
        } => {
            let mut workspace = require_workspace(storage, cli.workspace.as_deref())?;
            cmd_draft(
                config,
                storage,
                &mut workspace,
                &standup,
                &stream,
                direction.to_domain(),
                notes,
            )
        }
        Command::Final {
            standup,
            stream,
            direction,
            text,
        } => {
            let mut workspace = require_workspace(storage, cli.workspace.as_deref())?;
            cmd_final(
                storage,
                &mut workspace,
                &standup,
                &stream,
                direction.to_domain(),
                &text,
            )
        }
        Command::Issues => cmd_issues(config),
    }
}

// ── Workspace commands ──

fn cmd_workspace_new(storage: &Storage, title: &str) -> Result<(), String> {
    let workspace = Workspace::new(title);

    storage
        .create_workspace(&workspace)
        .map_err(|e| format!("failed to create workspace: {e}"))?;

    println!("{}", workspace.id);
    Ok(())
}

fn cmd_workspace_list(storage: &Storage) -> Result<(), String> {
    let workspaces = storage
        .list_workspaces()
        .map_err(|e| format!("failed to list workspaces: {e}"))?;

    if workspaces.is_empty() {
        println!("No workspaces");
        return Ok(());
    }

    for ws in &workspaces {
        println!(
            "{}  {} ({} streams, {} standups)",
            short_id(ws.id),
            ws.title,
            ws.workstreams().len(),
            ws.standups().len(),
        );
    }
    Ok(())
}

// ── Stream commands ──

fn cmd_stream_new(
    storage: &Storage,
    workspace: &mut Workspace,
    title: &str,
    issue: Option<String>,
) -> Result<(), String> {
    let id = workspace.create_workstream(title, issue);
    save(storage, workspace)?;
    println!("{id}");
    Ok(())
}

fn cmd_stream_adopt(
    config: &Config,
    storage: &Storage,
    workspace: &mut Workspace,
    key: &str,
) -> Result<(), String> {
    let tracker = config.tracker()?;
    let client = TrackerClient::new(&tracker.base_url, tracker.token()?);

    let issues =
        block_on(client.assigned_issues())?.map_err(|e| format!("failed to fetch issues: {e}"))?;

    let issue = issues
        .iter()
        .find(|i| i.key.eq_ignore_ascii_case(key))
        .ok_or_else(|| format!("no assigned issue matching '{key}'"))?;

    let id = workspace.create_workstream(&issue.summary, Some(issue.key.clone()));
    save(storage, workspace)?;
    println!("{id}");
    Ok(())
}

fn cmd_stream_list(workspace: &Workspace) -> Result<(), String> {
    let streams: Vec<&Workstream> = workspace
        .workstreams()
        .iter()
        .filter(|w| !w.deleted)
        .collect();

    if streams.is_empty() {
        println!("No workstreams");
        return Ok(());
    }

    for stream in streams {
        let issue = stream
            .issue_key
            .as_ref()
            .map_or(String::new(), |k| format!(" [{k}]"));
        println!(
            "{}  [{}]{}  {}",
            short_id(stream.id),
            format_status(stream.status),
            issue,
            stream.title,
        );
    }
    Ok(())
}

fn cmd_stream_status(
    storage: &Storage,
    workspace: &mut Workspace,
    reference: &str,
    status: WorkstreamStatus,
) -> Result<(), String> {
    let id = resolve_stream(workspace, reference)?;
    let Some(stream) = workspace.workstream(id) else {
        return Err(format!("no workstream matching '{reference}'"));
    };

    let mut stream = stream.clone();
    stream.status = status;
    stream.updated = jiff::Timestamp::now();
    workspace.update_workstream(stream);

    save(storage, workspace)?;
    eprintln!("Workstream {} is now {}", short_id(id), format_status(status));
    Ok(())
}

fn cmd_stream_delete(
    storage: &Storage,
    workspace: &mut Workspace,
    reference: &str,
) -> Result<(), String> {
    let id = resolve_stream(workspace, reference)?;
    workspace.delete_workstream(id);
    save(storage, workspace)?;
    eprintln!("Workstream {} deleted", short_id(id));
    Ok(())
}

// ── Note commands ──

fn cmd_note_add(
    storage: &Storage,
    workspace: &mut Workspace,
    reference: &str,
    body: &str,
) -> Result<(), String> {
    let body = body.trim();
    if body.is_empty() {
        return Err("note body cannot be empty".to_string());
    }

    let id = resolve_stream(workspace, reference)?;
    let entry_id = workspace
        .add_workstream_entry(id, body)
        .ok_or_else(|| format!("no workstream matching '{reference}'"))?;

    save(storage, workspace)?;
    println!("{}", short_id(entry_id));
    Ok(())
}

fn cmd_note_list(workspace: &Workspace, reference: &str) -> Result<(), String> {
    let id = resolve_stream(workspace, reference)?;
    let Some(stream) = workspace.workstream(id) else {
        return Err(format!("no workstream matching '{reference}'"));
    };

    println!("{}", format_notes(stream).trim_end());
    Ok(())
}

fn cmd_note_delete(
    storage: &Storage,
    workspace: &mut Workspace,
    stream_ref: &str,
    note_ref: &str,
) -> Result<(), String> {
    let stream_id = resolve_stream(workspace, stream_ref)?;
    let Some(stream) = workspace.workstream(stream_id) else {
        return Err(format!("no workstream matching '{stream_ref}'"));
    };

    let note_id = resolve(
        stream.visible_entries().map(|e| e.id),
        note_ref,
        "note",
    )?;
    workspace.delete_workstream_entry(stream_id, note_id);

    save(storage, workspace)?;
    eprintln!("Note {} deleted", short_id(note_id));
    Ok(())
}

// ── Standup commands ──

fn cmd_standup_new(
    storage: &Storage,
    workspace: &mut Workspace,
    title: Option<String>,
) -> Result<(), String> {
    let title = title.unwrap_or_else(|| format!("Standup {}", IsoDay::today()));
    let id = workspace.create_standup(title);

    let included = workspace.standup(id).map_or(0, |s| s.entries.len());
    save(storage, workspace)?;

    println!("{id}");
    eprintln!("Carried forward {included} active workstream(s)");
    Ok(())
}

fn cmd_standup_list(workspace: &Workspace) -> Result<(), String> {
    if workspace.standups().is_empty() {
        println!("No standups");
        return Ok(());
    }

    for standup in workspace.standups() {
        let state = if standup.is_published() {
            "published"
        } else {
            "open"
        };
        println!(
            "{}  [{state}]  {}  ({})",
            short_id(standup.id),
            standup.title,
            format_period(standup),
        );
    }
    Ok(())
}

fn cmd_standup_show(workspace: &Workspace, reference: Option<&str>) -> Result<(), String> {
    let standup = match reference {
        Some(r) => {
            let id = resolve_standup(workspace, r)?;
            workspace
                .standup(id)
                .ok_or_else(|| format!("no standup matching '{r}'"))?
        }
        None => workspace
            .standups()
            .last()
            .ok_or("no standups yet — create one with `sitrep standup new`")?,
    };

    print!("{}", format_standup(workspace, standup));
    Ok(())
}

fn cmd_standup_publish(
    storage: &Storage,
    workspace: &mut Workspace,
    reference: &str,
) -> Result<(), String> {
    let id = resolve_standup(workspace, reference)?;
    let Some(standup) = workspace.standup(id) else {
        return Err(format!("no standup matching '{reference}'"));
    };
    if standup.is_published() {
        return Err(format!("standup {} is already published", short_id(id)));
    }

    workspace.publish_standup(id);
    save(storage, workspace)?;
    eprintln!("Standup {} published", short_id(id));
    Ok(())
}

fn cmd_standup_retitle(
    storage: &Storage,
    workspace: &mut Workspace,
    reference: &str,
    title: &str,
) -> Result<(), String> {
    let id = resolve_standup(workspace, reference)?;
    let Some(standup) = workspace.standup(id) else {
        return Err(format!("no standup matching '{reference}'"));
    };

    let mut standup = standup.clone();
    standup.title = title.to_string();
    standup.updated = jiff::Timestamp::now();
    workspace.update_standup(standup);

    save(storage, workspace)?;
    eprintln!("Standup {} renamed", short_id(id));
    Ok(())
}

fn cmd_standup_delete(
    storage: &Storage,
    workspace: &mut Workspace,
    reference: &str,
) -> Result<(), String> {
    let id = resolve_standup(workspace, reference)?;
    workspace.delete_standup(id);
    save(storage, workspace)?;
    eprintln!("Standup {} deleted", short_id(id));
    Ok(())
}

fn cmd_standup_add_stream(
    storage: &Storage,
    workspace: &mut Workspace,
    standup_ref: &str,
    stream_ref: &str,
) -> Result<(), String> {
    let standup_id = resolve_standup(workspace, standup_ref)?;
    let stream_id = resolve_stream(workspace, stream_ref)?;

    workspace
        .add_workstream_to_standup(standup_id, stream_id)
        .ok_or_else(|| format!("standup {} is published", short_id(standup_id)))?;

    save(storage, workspace)?;
    eprintln!(
        "Workstream {} added to standup {}",
        short_id(stream_id),
        short_id(standup_id),
    );
    Ok(())
}

fn cmd_standup_remove_stream(
    storage: &Storage,
    workspace: &mut Workspace,
    standup_ref: &str,
    stream_ref: &str,
) -> Result<(), String> {
    let standup_id = resolve_standup(workspace, standup_ref)?;
    let stream_id = resolve_stream(workspace, stream_ref)?;
    require_open(workspace, standup_id)?;

    workspace.remove_workstream_from_standup(standup_id, stream_id);
    save(storage, workspace)?;
    eprintln!(
        "Workstream {} removed from standup {}",
        short_id(stream_id),
        short_id(standup_id),
    );
    Ok(())
}

fn cmd_standup_notes(
    storage: &Storage,
    workspace: &mut Workspace,
    standup_ref: &str,
    stream_ref: &str,
    direction: Direction,
    text: &str,
) -> Result<(), String> {
    let standup_id = resolve_standup(workspace, standup_ref)?;
    let stream_id = resolve_stream(workspace, stream_ref)?;
    require_open(workspace, standup_id)?;
    require_member(workspace, standup_id, stream_id)?;

    workspace.set_draft_notes(standup_id, stream_id, direction, text);
    save(storage, workspace)?;
    Ok(())
}

fn cmd_standup_review(
    storage: &Storage,
    workspace: &mut Workspace,
    standup_ref: &str,
    stream_ref: &str,
) -> Result<(), String> {
    let standup_id = resolve_standup(workspace, standup_ref)?;
    let stream_id = resolve_stream(workspace, stream_ref)?;
    require_open(workspace, standup_id)?;
    require_member(workspace, standup_id, stream_id)?;

    workspace.set_entry_reviewed(standup_id, stream_id, true);
    save(storage, workspace)?;
    eprintln!("Marked reviewed");
    Ok(())
}

// ── Draft / final ──

fn cmd_draft(
    config: &Config,
    storage: &Storage,
    workspace: &mut Workspace,
    standup_ref: &str,
    stream_ref: &str,
    direction: Direction,
    notes: Option<String>,
) -> Result<(), String> {
    let ai = config.ai()?;
    let api_key = ai.api_key()?;

    let standup_id = resolve_standup(workspace, standup_ref)?;
    let stream_id = resolve_stream(workspace, stream_ref)?;
    require_open(workspace, standup_id)?;

    // Assemble the prompt from current state before any mutation.
    let (prompt, entry_id) = {
        let Some(standup) = workspace.standup(standup_id) else {
            return Err(format!("no standup matching '{standup_ref}'"));
        };
        let Some(entry) = standup.entry_for(stream_id) else {
            return Err("that workstream is not part of this standup".to_string());
        };
        let Some(stream) = workspace.workstream(stream_id) else {
            return Err(format!("no workstream matching '{stream_ref}'"));
        };

        let entries = stream.entries_for_period(standup.range_start, standup.range_end);
        let guidance = notes.as_deref().or_else(|| entry.draft_notes(direction));
        let prompt = match direction {
            Direction::Minus24 => prompt::minus24_prompt(stream, &entries, guidance),
            Direction::Plus24 => prompt::plus24_prompt(stream, &entries, guidance),
        };
        (prompt, entry.id)
    };

    let engine = DraftEngine::new(OpenAiModel::new(&ai.host, &ai.model, api_key));
    let key = DraftKey {
        standup_id,
        entry_id,
        direction,
    };

    let outcome = block_on(engine.generate(key, &prompt, |chunk| {
        print!("{chunk}");
        let _ = io::stdout().flush();
    }))?
    .map_err(|e| format!("draft generation failed: {e}"))?;
    println!();

    match outcome {
        DraftOutcome::Completed(text) => {
            if let Some(guidance) = notes {
                workspace.set_draft_notes(standup_id, stream_id, direction, guidance);
            }
            workspace.set_draft(standup_id, stream_id, direction, text);
            save(storage, workspace)?;
            eprintln!("Draft stored; approve it with `sitrep final`");
            Ok(())
        }
        DraftOutcome::Superseded => {
            eprintln!("Draft superseded by a newer generation; not stored");
            Ok(())
        }
    }
}

fn cmd_final(
    storage: &Storage,
    workspace: &mut Workspace,
    standup_ref: &str,
    stream_ref: &str,
    direction: Direction,
    text: &str,
) -> Result<(), String> {
    let standup_id = resolve_standup(workspace, standup_ref)?;
    let stream_id = resolve_stream(workspace, stream_ref)?;
    require_open(workspace, standup_id)?;
    require_member(workspace, standup_id, stream_id)?;

    workspace.set_final(standup_id, stream_id, direction, text);
    save(storage, workspace)?;
    eprintln!("Final text set");
    Ok(())
}

// ── Issues ──

fn cmd_issues(config: &Config) -> Result<(), String> {
    let tracker = config.tracker()?;
    let client = TrackerClient::new(&tracker.base_url, tracker.token()?);

    let issues =
        block_on(client.assigned_issues())?.map_err(|e| format!("failed to fetch issues: {e}"))?;

    if issues.is_empty() {
        println!("No assigned issues");
        return Ok(());
    }
    for issue in issues {
        println!("{}  {}", issue.key, issue.summary);
    }
    Ok(())
}

// ── Helpers ──

/// Resolve the target workspace: the `--workspace` flag if given, else the
/// only workspace that exists.
fn require_workspace(storage: &Storage, reference: Option<&str>) -> Result<Workspace, String> {
    let workspaces = storage
        .list_workspaces()
        .map_err(|e| format!("failed to list workspaces: {e}"))?;

    match reference {
        Some(r) => {
            let id = resolve(workspaces.iter().map(|w| w.id), r, "workspace")?;
            workspaces
                .into_iter()
                .find(|w| w.id == id)
                .ok_or_else(|| format!("no workspace matching '{r}'"))
        }
        None => match workspaces.len() {
            0 => Err("no workspaces yet — create one with `sitrep workspace new`".to_string()),
            1 => Ok(workspaces.into_iter().next().ok_or("no workspace")?),
            _ => Err("multiple workspaces — pass --workspace <id>".to_string()),
        },
    }
}

fn resolve_stream(workspace: &Workspace, reference: &str) -> Result<Uuid, String> {
    resolve(
        workspace
            .workstreams()
            .iter()
            .filter(|w| !w.deleted)
            .map(|w| w.id),
        reference,
        "workstream",
    )
}

fn resolve_standup(workspace: &Workspace, reference: &str) -> Result<Uuid, String> {
    resolve(
        workspace.standups().iter().map(|s| s.id),
        reference,
        "standup",
    )
}

/// Resolve a reference (full UUID or unambiguous prefix) against a set of
/// candidate ids.
fn resolve(
    candidates: impl Iterator<Item = Uuid>,
    reference: &str,
    what: &str,
) -> Result<Uuid, String> {
    let candidates: Vec<Uuid> = candidates.collect();

    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        if candidates.contains(&id) {
            return Ok(id);
        }
        return Err(format!("no {what} matching '{reference}'"));
    }

    let matches: Vec<Uuid> = candidates
        .into_iter()
        .filter(|id| id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no {what} matching '{reference}'")),
        1 => Ok(matches[0]),
        n => {
            let ids: Vec<String> = matches.iter().map(|id| short_id(*id)).collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {n} {what}s: {}",
                ids.join(", ")
            ))
        }
    }
}

fn require_open(workspace: &Workspace, standup_id: Uuid) -> Result<(), String> {
    match workspace.standup(standup_id) {
        Some(s) if s.is_published() => Err(format!(
            "standup {} is published and frozen",
            short_id(standup_id)
        )),
        Some(_) => Ok(()),
        None => Err("standup not found".to_string()),
    }
}

fn require_member(workspace: &Workspace, standup_id: Uuid, stream_id: Uuid) -> Result<(), String> {
    let included = workspace
        .standup(standup_id)
        .is_some_and(|s| s.entry_for(stream_id).is_some());
    if included {
        Ok(())
    } else {
        Err("that workstream is not part of this standup".to_string())
    }
}

/// Persist the workspace, logging the failure before surfacing it. The
/// in-memory mutation is not rolled back; the next successful save wins.
fn save(storage: &Storage, workspace: &Workspace) -> Result<(), String> {
    storage.save_workspace(workspace).map_err(|e| {
        tracing::error!(workspace = %workspace.id, error = %e, "save failed");
        format!("failed to save workspace: {e}")
    })
}

/// Build a runtime for the only async paths (drafting, tracker lookups).
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}
