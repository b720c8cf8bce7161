#![deny(clippy::all)]

mod core;

pub(crate) use crate::core::config;
pub(crate) use crate::core::config::context;
pub(crate) use crate::core::tooling::{outcome, progress};

pub use crate::core::config::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::core::config::{Config, FormatConfig, GlobalOptions};
pub use crate::core::tooling::diagnostics::commands as diag_commands;
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome};
pub use crate::core::tooling::{format_status_message, to_json_response};

pub use crate::core::format::{
    default_formatters, format_loaded_workspace, format_workspace, list_configs,
    resolve_report_path, run_format, select_documents, CancellationToken, ChangeSummary,
    CharsetChange, ConfigsRequest, DocumentFormatter, EditorConfigOptionsProvider, FileEdit,
    FormatError, FormatOptions, FormatRequest, FormatRun, FormatServices, FormattableDocument,
    FormattedFile, FormattedFileLog, Formatter, GeneratedCodeDetector,
    HeaderGeneratedCodeDetector, PassOutput, Selection, SelectionScope, StyleOptionsProvider,
    SyntaxProvider, WorkspaceFormatResult, WorkspaceSyntaxProvider, DEFAULT_REPORT_FILE_NAME,
};
