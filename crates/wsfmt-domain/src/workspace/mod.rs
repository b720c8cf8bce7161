mod discover;
mod load;
mod project_file;
mod snapshot;
mod solution;

use std::{
    collections::HashMap,
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{language::Language, text::SourceText};

pub use discover::find_workspace;
pub use load::open_workspace;
pub use snapshot::WorkspaceSnapshot;

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceKind {
    Folder,
    Project,
    Solution,
}

impl fmt::Display for WorkspaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Folder => "folder",
            Self::Project => "project",
            Self::Solution => "solution",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub language: Language,
    pub file_path: Option<PathBuf>,
    pub target_framework: Option<String>,
    pub documents: Vec<DocumentId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub project: ProjectId,
    pub file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticSeverity {
    Warning,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceDiagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
}

/// Documents of one project whose text differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChanges {
    pub project: ProjectId,
    pub documents: Vec<DocumentId>,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceLoadError {
    #[error("workspace path {} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error("no solution or project file found in {}", dir.display())]
    NoWorkspaceFound { dir: PathBuf },
    #[error("multiple {what} files found in {}; pass one explicitly", dir.display())]
    MultipleWorkspaces { dir: PathBuf, what: &'static str },
    #[error("{} is not a solution or project file", path.display())]
    UnsupportedKind { path: PathBuf },
    #[error("failed to load project {}: {reason}", path.display())]
    InvalidProject { path: PathBuf, reason: String },
    #[error("failed to load solution {}: {reason}", path.display())]
    InvalidSolution { path: PathBuf, reason: String },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Projects and documents of one run, plus the original texts read from disk.
#[derive(Debug)]
pub struct Workspace {
    origin: u64,
    root: PathBuf,
    kind: WorkspaceKind,
    projects: Vec<Project>,
    documents: Vec<Document>,
    diagnostics: Vec<WorkspaceDiagnostic>,
    style_config_paths: Vec<PathBuf>,
    originals: Mutex<HashMap<DocumentId, Arc<SourceText>>>,
}

impl Workspace {
    pub(crate) fn new(
        root: PathBuf,
        kind: WorkspaceKind,
        projects: Vec<Project>,
        documents: Vec<Document>,
        diagnostics: Vec<WorkspaceDiagnostic>,
        style_config_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
            root,
            kind,
            projects,
            documents,
            diagnostics,
            style_config_paths,
            originals: Mutex::new(HashMap::new()),
        }
    }

    /// The workspace path: the folder, project file or solution file it was opened from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> WorkspaceKind {
        self.kind
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(id.0)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn diagnostics(&self) -> &[WorkspaceDiagnostic] {
        &self.diagnostics
    }

    /// `.editorconfig` files relevant to the workspace root, in locator order.
    pub fn style_config_paths(&self) -> &[PathBuf] {
        &self.style_config_paths
    }

    pub fn current_snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot::initial(self.origin)
    }

    /// Text of `id` as seen by `snapshot`, reading the file on first access.
    pub fn text(&self, snapshot: &WorkspaceSnapshot, id: DocumentId) -> Result<Arc<SourceText>> {
        if let Some(text) = snapshot.overlay(id) {
            return Ok(Arc::clone(text));
        }
        self.original_text(id)
    }

    fn original_text(&self, id: DocumentId) -> Result<Arc<SourceText>> {
        if let Some(text) = self.originals_guard().get(&id) {
            return Ok(Arc::clone(text));
        }
        let document = self
            .document(id)
            .ok_or_else(|| anyhow!("unknown document {}", id.0))?;
        let path = document
            .file_path
            .as_deref()
            .ok_or_else(|| anyhow!("document {} has no file path", id.0))?;
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let text = Arc::new(
            SourceText::decode(&bytes)
                .with_context(|| format!("failed to decode {}", path.display()))?,
        );
        let mut originals = self.originals_guard();
        let entry = originals.entry(id).or_insert_with(|| Arc::clone(&text));
        Ok(Arc::clone(entry))
    }

    fn originals_guard(&self) -> std::sync::MutexGuard<'_, HashMap<DocumentId, Arc<SourceText>>> {
        self.originals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Documents whose text differs between `original` and `updated`, grouped by
    /// project in workspace order.
    pub fn changes(
        &self,
        original: &WorkspaceSnapshot,
        updated: &WorkspaceSnapshot,
    ) -> Result<Vec<ProjectChanges>> {
        let mut candidates = original
            .overlaid_documents()
            .chain(updated.overlaid_documents())
            .collect::<Vec<_>>();
        candidates.sort();
        candidates.dedup();

        let mut changed: IndexMap<ProjectId, Vec<DocumentId>> = IndexMap::new();
        for id in candidates {
            let before = self.text(original, id)?;
            let after = self.text(updated, id)?;
            if before != after {
                let project = self
                    .document(id)
                    .map(|doc| doc.project)
                    .ok_or_else(|| anyhow!("unknown document {}", id.0))?;
                changed.entry(project).or_default().push(id);
            }
        }
        changed.sort_keys();
        Ok(changed
            .into_iter()
            .map(|(project, documents)| ProjectChanges { project, documents })
            .collect())
    }

    /// Writes every document changed in `snapshot` back to disk.
    ///
    /// All files are staged next to their targets before any is replaced. Returns
    /// `Ok(false)` when the snapshot belongs to another workspace.
    pub fn apply_changes(&self, snapshot: &WorkspaceSnapshot) -> Result<bool> {
        if snapshot.origin != self.origin {
            return Ok(false);
        }
        let baseline = self.current_snapshot();
        let mut targets: IndexMap<PathBuf, (DocumentId, Arc<SourceText>)> = IndexMap::new();
        for change in self.changes(&baseline, snapshot)? {
            for id in change.documents {
                let Some(path) = self.document(id).and_then(|doc| doc.file_path.clone()) else {
                    continue;
                };
                targets.insert(path, (id, self.text(snapshot, id)?));
            }
        }

        let mut staged = Vec::with_capacity(targets.len());
        for (path, (id, text)) in &targets {
            let bytes = text
                .encode()
                .with_context(|| format!("failed to encode {}", path.display()))?;
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let mut tmp = NamedTempFile::new_in(dir)
                .with_context(|| format!("failed to stage {}", path.display()))?;
            tmp.write_all(&bytes)
                .with_context(|| format!("failed to stage {}", path.display()))?;
            if let Ok(meta) = fs::metadata(path) {
                fs::set_permissions(tmp.path(), meta.permissions()).ok();
            }
            staged.push((tmp, path, *id, Arc::clone(text)));
        }

        for (tmp, path, id, text) in staged {
            tmp.persist(path)
                .map_err(|err| err.error)
                .with_context(|| format!("failed to write {}", path.display()))?;
            self.originals_guard().insert(id, text);
            tracing::debug!(path = %path.display(), "persisted formatted file");
        }
        Ok(true)
    }
}
