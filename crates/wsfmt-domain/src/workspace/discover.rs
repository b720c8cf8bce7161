use std::{
    fs,
    path::{Path, PathBuf},
};

use super::{load::is_project_file, WorkspaceKind, WorkspaceLoadError};
use crate::paths::canonical_or_self;

/// Decides what kind of workspace `path` names.
///
/// With `folder` set the path must be a directory and is loaded as a folder. A file
/// must be a solution or project file. A directory must contain exactly one solution
/// file, or failing that exactly one project file.
pub fn find_workspace(
    path: &Path,
    folder: bool,
) -> Result<(PathBuf, WorkspaceKind), WorkspaceLoadError> {
    if !path.exists() {
        return Err(WorkspaceLoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let path = canonical_or_self(path);
    if folder {
        if !path.is_dir() {
            return Err(WorkspaceLoadError::NotADirectory { path });
        }
        return Ok((path, WorkspaceKind::Folder));
    }
    if path.is_file() {
        return if is_solution_file(&path) {
            Ok((path, WorkspaceKind::Solution))
        } else if is_project_file(&path) {
            Ok((path, WorkspaceKind::Project))
        } else {
            Err(WorkspaceLoadError::UnsupportedKind { path })
        };
    }

    let mut entries = fs::read_dir(&path)
        .map_err(|source| WorkspaceLoadError::Io {
            path: path.clone(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|candidate| candidate.is_file())
        .collect::<Vec<_>>();
    entries.sort();

    let solutions = entries
        .iter()
        .filter(|p| is_solution_file(p))
        .collect::<Vec<_>>();
    match solutions.as_slice() {
        [single] => return Ok(((*single).clone(), WorkspaceKind::Solution)),
        [] => {}
        _ => {
            return Err(WorkspaceLoadError::MultipleWorkspaces {
                dir: path,
                what: "solution",
            })
        }
    }
    let projects = entries
        .iter()
        .filter(|p| is_project_file(p))
        .collect::<Vec<_>>();
    match projects.as_slice() {
        [single] => Ok(((*single).clone(), WorkspaceKind::Project)),
        [] => Err(WorkspaceLoadError::NoWorkspaceFound { dir: path }),
        _ => Err(WorkspaceLoadError::MultipleWorkspaces {
            dir: path,
            what: "project",
        }),
    }
}

fn is_solution_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sln"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directory_prefers_a_single_solution() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::write(root.join("All.sln"), "").unwrap();
        fs::write(root.join("App.csproj"), "").unwrap();
        let (path, kind) = find_workspace(&root, false).unwrap();
        assert_eq!(kind, WorkspaceKind::Solution);
        assert_eq!(path, root.join("All.sln"));
    }

    #[test]
    fn directory_falls_back_to_a_single_project() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::write(root.join("App.vbproj"), "").unwrap();
        let (path, kind) = find_workspace(&root, false).unwrap();
        assert_eq!(kind, WorkspaceKind::Project);
        assert_eq!(path, root.join("App.vbproj"));
    }

    #[test]
    fn ambiguous_or_empty_directories_fail() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        assert!(matches!(
            find_workspace(&root, false),
            Err(WorkspaceLoadError::NoWorkspaceFound { .. })
        ));
        fs::write(root.join("A.csproj"), "").unwrap();
        fs::write(root.join("B.csproj"), "").unwrap();
        assert!(matches!(
            find_workspace(&root, false),
            Err(WorkspaceLoadError::MultipleWorkspaces { what: "project", .. })
        ));
        let (_, kind) = find_workspace(&root, true).unwrap();
        assert_eq!(kind, WorkspaceKind::Folder);
    }

    #[test]
    fn explicit_files_are_classified_by_extension() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        assert!(matches!(
            find_workspace(&root.join("notes.txt"), false),
            Err(WorkspaceLoadError::UnsupportedKind { .. })
        ));
        assert!(matches!(
            find_workspace(&root.join("notes.txt"), true),
            Err(WorkspaceLoadError::NotADirectory { .. })
        ));
    }
}
