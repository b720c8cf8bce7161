use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Value};
use tracing::debug;
use wsfmt_domain::{find_workspace, PathMatcher, WorkspaceKind};

use super::{format_workspace, resolve_report_path, FormatError, FormatOptions, FormatRun};
use crate::config::file::load_file_settings;
use crate::progress::progress_enabled;
use crate::{CommandContext, ExecutionOutcome};

const CHECK_FAILED_EXIT_CODE: i32 = 2;

/// Arguments of `wsfmt format`.
#[derive(Debug, Clone, Default)]
pub struct FormatRequest {
    /// Folder, project or solution; the working directory when absent.
    pub workspace: Option<PathBuf>,
    pub folder: bool,
    pub check: bool,
    pub dry_run: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub report: Option<PathBuf>,
    pub include_generated: bool,
}

/// Formats a workspace and shapes the run into a command outcome.
///
/// # Errors
/// Returns an error only when the working directory cannot be determined.
pub fn run_format(ctx: &CommandContext, request: &FormatRequest) -> Result<ExecutionOutcome> {
    let cwd = ctx.current_dir()?;
    let target = match &request.workspace {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => cwd.join(path),
        None => cwd.clone(),
    };

    let (workspace, kind) = match find_workspace(&target, request.folder) {
        Ok(found) => found,
        Err(err) => {
            return Ok(ExecutionOutcome::failure(
                err.to_string(),
                json!({
                    "reason": "workspace_load_failed",
                    "path": target.display().to_string(),
                    "files_formatted": 0,
                    "file_count": 0,
                    "exit_code": 1,
                    "hint": "pass a folder with --folder, or a single .sln or project file",
                }),
            ))
        }
    };
    let base = workspace_directory(&workspace, kind);

    let settings = match load_file_settings(&base) {
        Ok(settings) => settings,
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!("{err:#}"),
                json!({
                    "reason": "invalid_settings",
                    "path": base.join(crate::config::file::SETTINGS_FILE_NAME).display().to_string(),
                    "exit_code": 1,
                }),
            ))
        }
    };
    if let Some(source) = &settings.source {
        debug!(path = %source.display(), "using settings file");
    }
    let include = if request.include.is_empty() {
        settings.include
    } else {
        request.include.clone()
    };
    let exclude = if request.exclude.is_empty() {
        settings.exclude
    } else {
        request.exclude.clone()
    };
    let matcher = match PathMatcher::new(&base, &include, &exclude) {
        Ok(matcher) => matcher,
        Err(err) => {
            return Ok(ExecutionOutcome::user_error(
                format!("{err:#}"),
                json!({
                    "reason": "invalid_pattern",
                    "include": include,
                    "exclude": exclude,
                    "exit_code": 1,
                }),
            ))
        }
    };

    let config = ctx.config().format();
    let mut options = FormatOptions::new(workspace.clone(), kind, matcher)
        .with_config(config, progress_enabled(config) && !ctx.global.json);
    options.include_generated =
        request.include_generated || settings.include_generated.unwrap_or(false);
    options.save_changes = !(request.check || request.dry_run);
    options.report = request
        .report
        .clone()
        .or(settings.report)
        .map(|path| resolve_report_path(&path, &cwd));

    match format_workspace(&options, ctx.cancellation()) {
        Ok(run) => Ok(outcome_for_run(request, &workspace, kind, run)),
        Err(err) => Ok(outcome_for_error(&workspace, &err)),
    }
}

fn workspace_directory(workspace: &Path, kind: WorkspaceKind) -> PathBuf {
    match kind {
        WorkspaceKind::Folder => workspace.to_path_buf(),
        WorkspaceKind::Project | WorkspaceKind::Solution => workspace
            .parent()
            .map_or_else(|| workspace.to_path_buf(), Path::to_path_buf),
    }
}

fn run_details(
    request: &FormatRequest,
    workspace: &Path,
    kind: WorkspaceKind,
    run: &FormatRun,
    exit_code: i32,
) -> Value {
    let formatted_files = run
        .changed_paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>();
    json!({
        "workspace": workspace.display().to_string(),
        "workspace_kind": kind,
        "files_formatted": run.result.files_formatted,
        "file_count": run.result.file_count,
        "exit_code": exit_code,
        "formatted_files": formatted_files,
        "report": run.report_path.as_ref().map(|p| p.display().to_string()),
        "unsupported_projects": run.unsupported_projects,
        "check": request.check,
        "dry_run": request.dry_run,
    })
}

fn outcome_for_run(
    request: &FormatRequest,
    workspace: &Path,
    kind: WorkspaceKind,
    run: FormatRun,
) -> ExecutionOutcome {
    let counts = format!(
        "formatted {} of {} files",
        run.result.files_formatted, run.result.file_count
    );
    if let Some(failure) = &run.failure {
        let mut details = run_details(request, workspace, kind, &run, run.result.exit_code);
        details["reason"] = json!("format_failed");
        return ExecutionOutcome::failure(failure.clone(), details);
    }
    if request.check && run.result.files_formatted > 0 {
        let mut details = run_details(request, workspace, kind, &run, CHECK_FAILED_EXIT_CODE);
        details["reason"] = json!("formatting_required");
        details["hint"] = json!("run `wsfmt format` without --check to apply the changes");
        return ExecutionOutcome::user_error(
            format!(
                "{} of {} files need formatting",
                run.result.files_formatted, run.result.file_count
            ),
            details,
        );
    }
    let message = if request.check || request.dry_run {
        format!(
            "{} of {} files would be formatted",
            run.result.files_formatted, run.result.file_count
        )
    } else {
        counts
    };
    ExecutionOutcome::success(message, run_details(request, workspace, kind, &run, 0))
}

pub(super) fn outcome_for_error(workspace: &Path, err: &FormatError) -> ExecutionOutcome {
    let mut details = json!({
        "reason": err.reason(),
        "workspace": workspace.display().to_string(),
        "files_formatted": 0,
        "exit_code": 1,
    });
    if let FormatError::MissingSyntaxTree { path, .. } = err {
        details["path"] = json!(path.display().to_string());
    }
    ExecutionOutcome::failure(err.to_string(), details)
}
