//! Selecting documents, running the formatting passes and reporting the result.

mod aggregate;
mod cancel;
mod configs;
mod document;
mod errors;
mod passes;
mod pipeline;
mod report;
mod run;
mod select;
mod services;


use std::{path::PathBuf, time::Instant};

use serde::Serialize;
use tracing::{error, info, warn};
use wsfmt_domain::{
    open_workspace, DiagnosticSeverity, PathMatcher, Workspace, WorkspaceKind,
};

pub use aggregate::ChangeSummary;
pub use cancel::CancellationToken;
pub use configs::{list_configs, ConfigsRequest};
pub use document::FormattableDocument;
pub use errors::FormatError;
pub use pipeline::{default_formatters, DocumentFormatter, Formatter, PassOutput};
pub use report::{
    resolve_report_path, CharsetChange, FileEdit, FormattedFile, FormattedFileLog,
    DEFAULT_REPORT_FILE_NAME,
};
pub use run::{run_format, FormatRequest};
pub use select::{select_documents, Selection, SelectionScope};
pub use services::{
    EditorConfigOptionsProvider, FormatServices, GeneratedCodeDetector,
    HeaderGeneratedCodeDetector, StyleOptionsProvider, SyntaxProvider, WorkspaceSyntaxProvider,
};

use crate::core::tooling::timings::TimingGuard;
use crate::progress::{pass_concurrency, ProgressReporter};
use crate::FormatConfig;
use aggregate::{aggregate, persist};
use pipeline::{run_pipeline, PipelineContext};
use report::write_report;

/// Everything a run needs once the command line and `wsfmt.toml` are resolved.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub workspace: PathBuf,
    pub kind: WorkspaceKind,
    pub matcher: PathMatcher,
    pub include_generated: bool,
    pub save_changes: bool,
    /// Concrete report file, already resolved.
    pub report: Option<PathBuf>,
    pub jobs: usize,
    pub progress: bool,
    pub timings: bool,
}

impl FormatOptions {
    pub fn new(workspace: PathBuf, kind: WorkspaceKind, matcher: PathMatcher) -> Self {
        Self {
            workspace,
            kind,
            matcher,
            include_generated: false,
            save_changes: true,
            report: None,
            jobs: 1,
            progress: false,
            timings: false,
        }
    }

    pub(crate) fn with_config(mut self, config: &FormatConfig, progress: bool) -> Self {
        self.jobs = config.jobs;
        self.progress = progress;
        self.timings = config.timings;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceFormatResult {
    pub files_formatted: usize,
    pub file_count: usize,
    pub exit_code: i32,
}

/// Outcome of one run, including what went into the report.
#[derive(Debug, Clone, Default)]
pub struct FormatRun {
    pub result: WorkspaceFormatResult,
    pub formatted_files: Vec<FormattedFile>,
    pub changed_paths: Vec<PathBuf>,
    pub unsupported_projects: Vec<String>,
    pub report_path: Option<PathBuf>,
    /// Why the run ended with a non-zero exit code.
    pub failure: Option<String>,
}

impl FormatRun {
    fn failed(file_count: usize, message: String) -> Self {
        Self {
            result: WorkspaceFormatResult {
                files_formatted: 0,
                file_count,
                exit_code: 1,
            },
            failure: Some(message),
            ..Self::default()
        }
    }
}

/// Opens the workspace named by `options` and formats it with the built-in
/// services and passes.
pub fn format_workspace(
    options: &FormatOptions,
    cancel: &CancellationToken,
) -> Result<FormatRun, FormatError> {
    let workspace = {
        let _timing = TimingGuard::new("load", options.timings);
        info!(workspace = %options.workspace.display(), kind = %options.kind, "loading workspace");
        match open_workspace(&options.workspace, options.kind) {
            Ok(workspace) => workspace,
            Err(err) => {
                error!(error = %err, "failed to load workspace");
                return Ok(FormatRun::failed(0, err.to_string()));
            }
        }
    };
    for diagnostic in workspace.diagnostics() {
        match diagnostic.severity {
            DiagnosticSeverity::Warning => warn!("{}", diagnostic.message),
            DiagnosticSeverity::Failure => warn!(failure = true, "{}", diagnostic.message),
        }
    }
    cancel.check()?;

    let syntax = WorkspaceSyntaxProvider;
    let generated = HeaderGeneratedCodeDetector;
    let style = EditorConfigOptionsProvider::for_workspace(&workspace);
    let services = FormatServices {
        syntax: &syntax,
        generated: &generated,
        options: &style,
    };
    format_loaded_workspace(&workspace, options, &services, &default_formatters(), cancel)
}

/// Selects, formats, aggregates, persists and reports for an open workspace.
pub fn format_loaded_workspace<F: DocumentFormatter>(
    workspace: &Workspace,
    options: &FormatOptions,
    services: &FormatServices<'_>,
    formatters: &[F],
    cancel: &CancellationToken,
) -> Result<FormatRun, FormatError> {
    let started = Instant::now();
    let original = workspace.current_snapshot();
    let scope = SelectionScope {
        scope_project: (workspace.kind() == WorkspaceKind::Project)
            .then(|| workspace.root().to_path_buf()),
        matcher: options.matcher.clone(),
        include_generated: options.include_generated,
    };
    let selection = {
        let _timing = TimingGuard::new("select", options.timings);
        select_documents(workspace, &original, &scope, services, cancel)?
    };
    info!(
        documents = selection.documents.len(),
        covered = selection.covered,
        "determined formattable files"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pass_concurrency(options.jobs, selection.documents.len()))
        .build()?;
    let log = FormattedFileLog::new();
    let progress = ProgressReporter::bar(
        "formatting",
        selection.documents.len() * formatters.len(),
        options.progress,
    );
    let formatted = {
        let _timing = TimingGuard::new("format", options.timings);
        let ctx = PipelineContext {
            workspace,
            pool: &pool,
            log: &log,
            cancel,
            progress: &progress,
        };
        run_pipeline(&ctx, original.clone(), &selection.documents, formatters)?
    };
    progress.finish();

    let summary = match aggregate(workspace, &original, &formatted) {
        Ok(summary) => summary,
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to compute formatting changes");
            return Ok(FormatRun::failed(
                selection.file_count,
                format!("failed to compute formatting changes: {err:#}"),
            ));
        }
    };
    for path in &summary.changed_paths {
        info!("Formatted code file '{}'.", path.display());
    }

    let mut failure = None;
    if options.save_changes && !summary.changes.is_empty() {
        cancel.check()?;
        let _timing = TimingGuard::new("save", options.timings);
        if !persist(workspace, &formatted) {
            failure = Some("failed to save formatting changes".to_string());
        }
    }

    let formatted_files = log.into_files();
    let mut report_path = None;
    if failure.is_none() {
        if let Some(path) = &options.report {
            match write_report(path, &formatted_files) {
                Ok(()) => {
                    info!(report = %path.display(), "wrote format report");
                    report_path = Some(path.clone());
                }
                Err(err) => {
                    error!(error = %format!("{err:#}"), "failed to write format report");
                    failure = Some(format!("failed to write format report: {err:#}"));
                }
            }
        }
    }

    let elapsed = started.elapsed().as_millis();
    info!(
        "Formatted {} of {} files in {}ms.",
        summary.files_formatted, selection.file_count, elapsed
    );
    Ok(FormatRun {
        result: WorkspaceFormatResult {
            files_formatted: summary.files_formatted,
            file_count: selection.file_count,
            exit_code: i32::from(failure.is_some()),
        },
        formatted_files,
        changed_paths: summary.changed_paths,
        unsupported_projects: selection.unsupported_projects,
        report_path,
        failure,
    })
}
