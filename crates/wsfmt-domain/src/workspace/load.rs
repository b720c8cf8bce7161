use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use ignore::WalkBuilder;
use tracing::{debug, info};

use super::{
    project_file::ProjectFile, solution::parse_solution, DiagnosticSeverity, Document, DocumentId,
    Project, ProjectId, Workspace, WorkspaceDiagnostic, WorkspaceKind, WorkspaceLoadError,
};
use crate::{
    editorconfig::locate_style_configs,
    language::Language,
    paths::{canonical_or_self, join_build_path},
};

/// Opens the workspace at `path`. Problems with individual referenced projects become
/// diagnostics; only a broken root fails the load.
pub fn open_workspace(path: &Path, kind: WorkspaceKind) -> Result<Workspace, WorkspaceLoadError> {
    if !path.exists() {
        return Err(WorkspaceLoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let path = canonical_or_self(path);
    let mut builder = WorkspaceBuilder::default();
    match kind {
        WorkspaceKind::Folder => builder.load_folder(&path)?,
        WorkspaceKind::Project => builder.load_root_project(&path)?,
        WorkspaceKind::Solution => builder.load_solution(&path)?,
    }
    let style_config_paths = locate_style_configs(&path);
    info!(
        workspace = %path.display(),
        kind = %kind,
        projects = builder.projects.len(),
        documents = builder.documents.len(),
        style_configs = style_config_paths.len(),
        "loaded workspace"
    );
    Ok(Workspace::new(
        path,
        kind,
        builder.projects,
        builder.documents,
        builder.diagnostics,
        style_config_paths,
    ))
}

#[derive(Default)]
struct WorkspaceBuilder {
    projects: Vec<Project>,
    documents: Vec<Document>,
    diagnostics: Vec<WorkspaceDiagnostic>,
    visited: HashSet<PathBuf>,
}

impl WorkspaceBuilder {
    fn add_project(
        &mut self,
        name: String,
        language: Language,
        file_path: Option<PathBuf>,
        target_framework: Option<String>,
        files: &[PathBuf],
    ) -> ProjectId {
        let id = ProjectId(self.projects.len());
        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let doc = DocumentId(self.documents.len());
            self.documents.push(Document {
                id: doc,
                project: id,
                file_path: Some(canonical_or_self(file)),
            });
            documents.push(doc);
        }
        self.projects.push(Project {
            id,
            name,
            language,
            file_path,
            target_framework,
            documents,
        });
        id
    }

    fn warn(&mut self, message: String) {
        self.diagnostics.push(WorkspaceDiagnostic {
            severity: DiagnosticSeverity::Warning,
            message,
        });
    }

    /// One project per source language, holding every non-ignored file of that language.
    fn load_folder(&mut self, dir: &Path) -> Result<(), WorkspaceLoadError> {
        if !dir.is_dir() {
            return Err(WorkspaceLoadError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
        let mut by_language: BTreeMap<Language, Vec<PathBuf>> = BTreeMap::new();
        let walker = WalkBuilder::new(dir)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.warn(format!("failed to walk {}: {err}", dir.display()));
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ty| ty.is_file()) {
                continue;
            }
            if let Some(language) = Language::from_source_path(entry.path()) {
                by_language
                    .entry(language)
                    .or_default()
                    .push(entry.into_path());
            }
        }
        let name = dir
            .file_name()
            .map_or_else(|| dir.display().to_string(), |n| n.to_string_lossy().into_owned());
        for (language, files) in by_language {
            debug!(language = %language, files = files.len(), "folder project");
            self.add_project(
                name.clone(),
                language,
                Some(dir.to_path_buf()),
                None,
                &files,
            );
        }
        Ok(())
    }

    fn load_root_project(&mut self, path: &Path) -> Result<(), WorkspaceLoadError> {
        self.load_project(path).map_err(|err| match err {
            ProjectLoadFailure::Io(source) => WorkspaceLoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            ProjectLoadFailure::Invalid(reason) => WorkspaceLoadError::InvalidProject {
                path: path.to_path_buf(),
                reason,
            },
        })
    }

    fn load_solution(&mut self, path: &Path) -> Result<(), WorkspaceLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| WorkspaceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries =
            parse_solution(&contents).map_err(|reason| WorkspaceLoadError::InvalidSolution {
                path: path.to_path_buf(),
                reason,
            })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in entries {
            let project_path = join_build_path(dir, &entry.path);
            if !is_project_file(&project_path) {
                self.warn(format!(
                    "solution entry {} ({}) is not a project file; skipping",
                    entry.name, entry.path
                ));
                continue;
            }
            if !project_path.is_file() {
                self.warn(format!(
                    "project {} referenced by the solution was not found",
                    project_path.display()
                ));
                continue;
            }
            self.load_referenced(&project_path);
        }
        Ok(())
    }

    fn load_referenced(&mut self, path: &Path) {
        if let Err(err) = self.load_project(path) {
            let reason = match err {
                ProjectLoadFailure::Io(source) => source.to_string(),
                ProjectLoadFailure::Invalid(reason) => reason,
            };
            self.warn(format!("failed to load project {}: {reason}", path.display()));
        }
    }

    fn load_project(&mut self, path: &Path) -> Result<(), ProjectLoadFailure> {
        let path = canonical_or_self(path);
        if !self.visited.insert(path.clone()) {
            return Ok(());
        }
        let contents = fs::read_to_string(&path).map_err(ProjectLoadFailure::Io)?;
        let file = ProjectFile::parse(&contents).map_err(ProjectLoadFailure::Invalid)?;
        let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let language = Language::from_project_path(&path);
        let name = file.assembly_name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map_or_else(String::new, |s| s.to_string_lossy().into_owned())
        });

        let items = file.compile_items(&dir, &language);
        for missing in &items.missing {
            self.warn(format!(
                "compile item {} of {} does not exist",
                missing.display(),
                path.display()
            ));
        }
        for skipped in &items.skipped {
            debug!(project = %path.display(), item = %skipped, "skipping compile item with msbuild properties");
        }

        if file.target_frameworks.len() > 1 {
            for framework in &file.target_frameworks {
                self.add_project(
                    format!("{name}({framework})"),
                    language.clone(),
                    Some(path.clone()),
                    Some(framework.clone()),
                    &items.files,
                );
            }
        } else {
            self.add_project(
                name,
                language,
                Some(path.clone()),
                file.target_frameworks.first().cloned(),
                &items.files,
            );
        }

        for reference in &file.project_references {
            let target = join_build_path(&dir, reference);
            if target.is_file() {
                self.load_referenced(&target);
            } else {
                self.warn(format!(
                    "project reference {} of {} was not found",
                    target.display(),
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

enum ProjectLoadFailure {
    Io(std::io::Error),
    Invalid(String),
}

pub(super) fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.to_ascii_lowercase().ends_with("proj"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#;

    #[test]
    fn multi_targeted_projects_share_files() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(
            &root.join("App/App.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><TargetFrameworks>net6.0;net8.0</TargetFrameworks></PropertyGroup></Project>"#,
        );
        write(&root.join("App/Program.cs"), "class P {}\n");

        let workspace = open_workspace(&root.join("App/App.csproj"), WorkspaceKind::Project).unwrap();
        let names = workspace
            .projects()
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["App(net6.0)", "App(net8.0)"]);
        let paths = workspace
            .documents()
            .iter()
            .map(|d| d.file_path.clone().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], paths[1]);
    }

    #[test]
    fn references_load_once_and_missing_ones_warn() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(
            &root.join("App/App.csproj"),
            r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup>
                <ProjectReference Include="..\Lib\Lib.csproj" />
                <ProjectReference Include="..\Lib\Lib.csproj" />
                <ProjectReference Include="..\Gone\Gone.csproj" />
            </ItemGroup></Project>"#,
        );
        write(&root.join("App/A.cs"), "");
        write(&root.join("Lib/Lib.csproj"), SDK_PROJECT);
        write(&root.join("Lib/L.cs"), "");

        let workspace = open_workspace(&root.join("App/App.csproj"), WorkspaceKind::Project).unwrap();
        assert_eq!(workspace.projects().len(), 2);
        assert_eq!(workspace.diagnostics().len(), 1);
        assert_eq!(workspace.diagnostics()[0].severity, DiagnosticSeverity::Warning);
        assert!(workspace.diagnostics()[0].message.contains("Gone.csproj"));
    }

    #[test]
    fn solutions_load_each_listed_project() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(
            &root.join("All.sln"),
            "Microsoft Visual Studio Solution File, Format Version 12.00\n\
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"App\\App.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\n\
EndProject\n\
Project(\"{6EC3EE1D-3C4E-46DD-8F32-0CC8E7565705}\") = \"Fun\", \"Fun\\Fun.fsproj\", \"{22222222-2222-2222-2222-222222222222}\"\n\
EndProject\n",
        );
        write(&root.join("App/App.csproj"), SDK_PROJECT);
        write(&root.join("App/A.cs"), "");
        write(&root.join("Fun/Fun.fsproj"), SDK_PROJECT);
        write(&root.join("Fun/F.fs"), "");

        let workspace = open_workspace(&root.join("All.sln"), WorkspaceKind::Solution).unwrap();
        let languages = workspace
            .projects()
            .iter()
            .map(|p| p.language.clone())
            .collect::<Vec<_>>();
        assert_eq!(languages, vec![Language::CSharp, Language::FSharp]);
        assert!(workspace.diagnostics().is_empty());
    }

    #[test]
    fn folders_group_files_by_language_and_honor_gitignore() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root.join(".gitignore"), "out/\n");
        write(&root.join("src/A.cs"), "");
        write(&root.join("src/B.vb"), "");
        write(&root.join("out/C.cs"), "");
        write(&root.join("readme.md"), "");

        let workspace = open_workspace(&root, WorkspaceKind::Folder).unwrap();
        assert_eq!(workspace.projects().len(), 2);
        let csharp = &workspace.projects()[0];
        assert_eq!(csharp.language, Language::CSharp);
        assert_eq!(csharp.documents.len(), 1);
    }

    #[test]
    fn broken_root_project_fails_the_load() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("Bad.csproj");
        fs::write(&path, "<Project").unwrap();
        let err = open_workspace(&path, WorkspaceKind::Project).unwrap_err();
        assert!(matches!(err, WorkspaceLoadError::InvalidProject { .. }));

        let missing = open_workspace(&temp.path().join("Nope.csproj"), WorkspaceKind::Project)
            .unwrap_err();
        assert!(matches!(missing, WorkspaceLoadError::NotFound { .. }));
    }
}
