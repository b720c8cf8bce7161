#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod editorconfig;
pub mod generated;
pub mod language;
pub mod matcher;
pub mod options;
pub(crate) mod paths;
pub mod syntax;
pub mod text;
pub mod workspace;

pub use editorconfig::{
    locate_style_configs, EditorConfigFile, EditorConfigSet, EDITORCONFIG_FILE_NAME,
};
pub use generated::is_generated_code;
pub use language::Language;
pub use matcher::PathMatcher;
pub use options::{EndOfLine, IndentSize, IndentStyle, OptionSet};
pub use syntax::{LineFlags, SyntaxTree};
pub use text::{Charset, LinePosition, SourceText, TextEdit, TextError, TextLine};
pub use workspace::{
    find_workspace, open_workspace, DiagnosticSeverity, Document, DocumentId, Project,
    ProjectChanges, ProjectId, Workspace, WorkspaceDiagnostic, WorkspaceKind, WorkspaceLoadError,
    WorkspaceSnapshot,
};
