//! Local persistence for workspace documents.
//!
//! Each workspace lives in its own directory package under the storage
//! root:
//!
//! ```text
//! <root>/<uuid>/
//!   workspace.json            # workspace metadata
//!   workstreams/<uuid>.json   # one self-contained record per workstream
//!   standups/<uuid>.json      # one self-contained record per standup
//! ```
//!
//! Member records are loaded leniently: an unreadable or malformed file is
//! skipped with a warning. Missing metadata is fatal — without it there is
//! no workspace. Saving rewrites every member and prunes files whose ids
//! are no longer in the aggregate, so hard deletes propagate to disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{fs, io};

use jiff::Timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Standup, Workspace, Workstream};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(Uuid),

    #[error("workspace already exists: {0}")]
    WorkspaceAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for workspace documents.
pub struct Storage {
    root: PathBuf,
}

/// The fatal-if-missing part of a workspace package.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceMeta {
    id: Uuid,
    title: String,
    created: Timestamp,
    updated: Timestamp,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.sitrep/workspaces/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sitrep").join("workspaces"))
    }

    /// Creates a new workspace package on disk.
    pub fn create_workspace(&self, workspace: &Workspace) -> Result<()> {
        let dir = self.workspace_dir(workspace.id);
        if dir.exists() {
            return Err(StorageError::WorkspaceAlreadyExists(workspace.id));
        }
        fs::create_dir_all(&dir)?;
        self.write_package(workspace, &dir)
    }

    /// Writes a workspace's current state back to its package.
    ///
    /// Every member record is rewritten; member files whose ids are gone
    /// from the aggregate are removed.
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<()> {
        let dir = self.workspace_dir(workspace.id);
        if !dir.exists() {
            return Err(StorageError::WorkspaceNotFound(workspace.id));
        }
        self.write_package(workspace, &dir)
    }

    /// Loads a workspace package.
    ///
    /// Unreadable member records are skipped with a warning; missing or
    /// corrupt metadata fails the load.
    pub fn load_workspace(&self, id: Uuid) -> Result<Workspace> {
        let dir = self.workspace_dir(id);
        let meta_path = dir.join("workspace.json");
        if !meta_path.exists() {
            return Err(StorageError::WorkspaceNotFound(id));
        }
        let meta: WorkspaceMeta = serde_json::from_str(&fs::read_to_string(meta_path)?)?;

        let mut workstreams: Vec<Workstream> = load_members(&dir.join("workstreams"))?;
        let mut standups: Vec<Standup> = load_members(&dir.join("standups"))?;
        // Directory order is arbitrary; creation order is the canonical one.
        workstreams.sort_by(|a, b| a.created.cmp(&b.created));
        standups.sort_by(|a, b| a.created.cmp(&b.created));

        Ok(Workspace::from_parts(
            meta.id,
            meta.title,
            meta.created,
            meta.updated,
            workstreams,
            standups,
        ))
    }

    /// Lists all workspaces under the root, sorted by creation time.
    ///
    /// Unreadable packages are skipped with a warning.
    pub fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        let mut workspaces = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(workspaces),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<Uuid>().ok())
            else {
                continue;
            };
            match self.load_workspace(id) {
                Ok(ws) => workspaces.push(ws),
                Err(e) => {
                    tracing::warn!(workspace = %id, error = %e, "skipping unreadable workspace");
                }
            }
        }
        workspaces.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(workspaces)
    }

    fn write_package(&self, workspace: &Workspace, dir: &Path) -> Result<()> {
        let meta = WorkspaceMeta {
            id: workspace.id,
            title: workspace.title.clone(),
            created: workspace.created,
            updated: workspace.updated,
        };
        fs::write(
            dir.join("workspace.json"),
            serde_json::to_string_pretty(&meta)?,
        )?;

        write_members(
            &dir.join("workstreams"),
            workspace.workstreams().iter().map(|w| (w.id, w)),
        )?;
        write_members(
            &dir.join("standups"),
            workspace.standups().iter().map(|s| (s.id, s)),
        )?;
        Ok(())
    }

    fn workspace_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}

/// Writes one JSON file per record and prunes files for ids not in the set.
fn write_members<'a, T: Serialize + 'a>(
    dir: &Path,
    records: impl Iterator<Item = (Uuid, &'a T)>,
) -> Result<()> {
    fs::create_dir_all(dir)?;
    let mut live = HashSet::new();
    for (id, record) in records {
        fs::write(
            dir.join(format!("{id}.json")),
            serde_json::to_string_pretty(record)?,
        )?;
        live.insert(id);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<Uuid>().ok());
        if id.is_none_or(|id| !live.contains(&id)) {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Loads every parseable record in a member directory.
fn load_members<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut records = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let parsed = fs::read_to_string(&path)
            .map_err(StorageError::from)
            .and_then(|json| serde_json::from_str(&json).map_err(StorageError::from));
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record");
            }
        }
    }
    Ok(records)
}
