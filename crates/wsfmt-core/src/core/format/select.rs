use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use wsfmt_domain::{PathMatcher, Workspace, WorkspaceSnapshot};

use super::{CancellationToken, FormatError, FormatServices, FormattableDocument};

/// What a run is allowed to touch.
#[derive(Debug, Clone)]
pub struct SelectionScope {
    /// When set, only the project with this file path is considered.
    pub scope_project: Option<PathBuf>,
    pub matcher: PathMatcher,
    pub include_generated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Documents of every in-scope, supported project, counted before filtering.
    pub file_count: usize,
    pub documents: Vec<FormattableDocument>,
    pub unsupported_projects: Vec<String>,
    /// Whether `documents` is the set covered by style configuration.
    pub covered: bool,
}

/// Picks the documents to format.
///
/// Each real file is selected at most once even when several projects list it. If
/// any selected document is covered by style configuration, only covered documents
/// are returned; otherwise every uncovered one is.
pub fn select_documents(
    workspace: &Workspace,
    snapshot: &WorkspaceSnapshot,
    scope: &SelectionScope,
    services: &FormatServices<'_>,
    cancel: &CancellationToken,
) -> Result<Selection, FormatError> {
    let mut file_count = 0;
    let mut unsupported_projects = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut covered = Vec::new();
    let mut uncovered = Vec::new();

    for project in workspace.projects() {
        cancel.check()?;
        let Some(project_path) = project.file_path.as_deref() else {
            continue;
        };
        if let Some(target) = scope.scope_project.as_deref() {
            if !same_path_ignoring_case(project_path, target) {
                continue;
            }
        }
        if !project.language.is_supported() {
            warn!(
                project = %project.name,
                language = %project.language,
                "skipping project with unsupported language"
            );
            unsupported_projects.push(project.name.clone());
            continue;
        }
        file_count += project.documents.len();
        debug!(
            project = %project.name,
            target_framework = project.target_framework.as_deref().unwrap_or("-"),
            documents = project.documents.len(),
            "selecting documents"
        );

        for &id in &project.documents {
            cancel.check()?;
            let Some(document) = workspace.document(id) else {
                continue;
            };
            let Some(path) = document.file_path.as_deref() else {
                continue;
            };
            if !seen.insert(path.to_path_buf()) {
                continue;
            }
            if !scope.matcher.matches(path) {
                continue;
            }
            let tree = match services.syntax.syntax_tree(workspace, snapshot, document) {
                Ok(Some(tree)) => tree,
                Ok(None) => {
                    return Err(FormatError::MissingSyntaxTree {
                        path: path.to_path_buf(),
                        reason: "no syntax representation available".to_string(),
                    })
                }
                Err(err) => {
                    return Err(FormatError::MissingSyntaxTree {
                        path: path.to_path_buf(),
                        reason: format!("{err:#}"),
                    })
                }
            };
            if !scope.include_generated && services.generated.is_generated(&tree) {
                debug!(path = %path.display(), "skipping generated code");
                continue;
            }
            let style = services.options.style_config_options(&tree);
            let legacy = services.options.legacy_options(document);
            let formattable = FormattableDocument::new(
                document,
                path.to_path_buf(),
                project.language.clone(),
                legacy,
                style,
            );
            if formattable.is_covered() {
                covered.push(formattable);
            } else {
                uncovered.push(formattable);
            }
        }
    }

    let (documents, covered) = if covered.is_empty() {
        (uncovered, false)
    } else {
        (covered, true)
    };
    debug!(
        selected = documents.len(),
        file_count,
        covered,
        "selected formattable documents"
    );
    Ok(Selection {
        file_count,
        documents,
        unsupported_projects,
        covered,
    })
}

fn same_path_ignoring_case(left: &Path, right: &Path) -> bool {
    left.to_string_lossy().to_lowercase() == right.to_string_lossy().to_lowercase()
}
