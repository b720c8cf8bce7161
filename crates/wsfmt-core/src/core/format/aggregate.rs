use std::path::PathBuf;

use anyhow::Result;
use tracing::error;
use wsfmt_domain::{ProjectChanges, Workspace, WorkspaceSnapshot};

/// What a run changed, grouped by project.
#[derive(Debug, Clone, Default)]
pub struct ChangeSummary {
    pub changes: Vec<ProjectChanges>,
    pub changed_paths: Vec<PathBuf>,
    /// Distinct documents with at least one change.
    pub files_formatted: usize,
}

pub(crate) fn aggregate(
    workspace: &Workspace,
    original: &WorkspaceSnapshot,
    updated: &WorkspaceSnapshot,
) -> Result<ChangeSummary> {
    let changes = workspace.changes(original, updated)?;
    let changed_paths = changes
        .iter()
        .flat_map(|change| change.documents.iter())
        .filter_map(|id| workspace.document(*id))
        .filter_map(|document| document.file_path.clone())
        .collect::<Vec<_>>();
    Ok(ChangeSummary {
        files_formatted: changed_paths.len(),
        changes,
        changed_paths,
    })
}

/// Writes `snapshot` to disk. Failures are logged; the caller turns `false` into a
/// non-zero exit code.
pub(crate) fn persist(workspace: &Workspace, snapshot: &WorkspaceSnapshot) -> bool {
    match workspace.apply_changes(snapshot) {
        Ok(true) => true,
        Ok(false) => {
            error!(
                workspace = %workspace.root().display(),
                "failed to save formatting changes: snapshot does not belong to this workspace"
            );
            false
        }
        Err(err) => {
            error!(
                workspace = %workspace.root().display(),
                error = %format!("{err:#}"),
                "failed to save formatting changes"
            );
            false
        }
    }
}
