use std::path::Path;

use atty::Stream;
use color_eyre::Result;
use serde_json::Value;
use wsfmt_core::{diag_commands, CommandGroup, CommandInfo, CommandStatus, ExecutionOutcome};

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.exit_code();
    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));

    if opts.json {
        let payload = wsfmt_core::to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }
    if opts.quiet {
        return Ok(code);
    }

    if let CommandStatus::Ok = outcome.status {
        let message = wsfmt_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        for line in detail_lines(&style, info, &outcome.details) {
            println!("{line}");
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!("{}", style.info(&format!("Tip: {hint}")));
        }
    } else {
        let header = format!("{}  {}", error_code(info), outcome.message);
        println!("{}", style.error_header(&header));
        for line in detail_lines(&style, info, &outcome.details) {
            println!("{line}");
        }
        println!();
        println!("Why:");
        for reason in collect_why_bullets(&outcome.details, &outcome.message) {
            println!("  • {reason}");
        }
        let fixes = collect_fix_bullets(&outcome.details);
        if !fixes.is_empty() {
            println!();
            println!("Fix:");
            for fix in fixes {
                println!("{}", style.fix_bullet(&format!("  • {fix}")));
            }
        }
    }

    Ok(code)
}

fn detail_lines(style: &Style, info: CommandInfo, details: &Value) -> Vec<String> {
    match info.group {
        CommandGroup::Format => format_lines(style, details),
        CommandGroup::Configs => configs_lines(style, details),
    }
}

fn format_lines(style: &Style, details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let pending = details.get("check").and_then(Value::as_bool) == Some(true)
        || details.get("dry_run").and_then(Value::as_bool) == Some(true);
    let verb = if pending { "would format" } else { "formatted" };
    for path in string_items(details, "formatted_files") {
        lines.push(format!("  {verb} {}", style.path(path)));
    }
    for project in string_items(details, "unsupported_projects") {
        lines.push(format!("  skipped unsupported project {}", style.path(project)));
    }
    if let Some(report) = details.get("report").and_then(Value::as_str) {
        lines.push(style.info(&format!("Report written to {report}")));
    }
    lines
}

fn configs_lines(style: &Style, details: &Value) -> Vec<String> {
    let mut lines = string_items(details, "configs")
        .map(|path| format!("  {}", style.path(path)))
        .collect::<Vec<_>>();
    if let Some(options) = details.get("options").and_then(Value::as_object) {
        lines.push(String::new());
        lines.push("Resolved options:".to_string());
        for (key, value) in options {
            lines.push(format!("  {key} = {}", value.as_str().unwrap_or_default()));
        }
    } else if details
        .get("path")
        .and_then(Value::as_str)
        .is_some_and(|path| Path::new(path).is_file())
    {
        lines.push(style.info("No style configuration covers this file."));
    }
    lines
}

fn string_items<'a>(details: &'a Value, key: &str) -> impl Iterator<Item = &'a str> {
    details
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn error_code(info: CommandInfo) -> &'static str {
    match info.group {
        CommandGroup::Format => diag_commands::FORMAT,
        CommandGroup::Configs => diag_commands::CONFIGS,
    }
}

fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(
            &mut bullets,
            reason_display(reason).unwrap_or(reason).to_string(),
        );
    }
    if let Some(path) = details.get("path").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("Path: {path}"));
    }
    let check_failed =
        details.get("reason").and_then(Value::as_str) == Some("formatting_required");
    let formatted = details.get("files_formatted").and_then(Value::as_u64);
    let total = details.get("file_count").and_then(Value::as_u64);
    if let (true, Some(formatted), Some(total)) = (check_failed, formatted, total) {
        push_unique(
            &mut bullets,
            format!("{formatted} of {total} files are not formatted"),
        );
    }
    if bullets.is_empty() {
        bullets.push(fallback.to_string());
    }
    bullets
}

fn collect_fix_bullets(details: &Value) -> Vec<String> {
    let mut fixes = Vec::new();
    if let Some(hint) = hint_from_details(details) {
        push_unique(&mut fixes, hint.to_string());
    }
    if fixes.is_empty() {
        fixes.push("Re-run with --help for usage or -v for more detail.".to_string());
    }
    fixes
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "formatting_required" => Some("Some files do not match the configured style."),
        "workspace_load_failed" => Some("The workspace could not be opened."),
        "missing_syntax_tree" => Some("A selected document could not be read as source text."),
        "cancelled" => Some("The run was cancelled before any file was written."),
        "format_failed" => Some("Formatted files could not be written or reported."),
        "invalid_pattern" => Some("An include or exclude glob is invalid."),
        "invalid_settings" => Some("wsfmt.toml could not be parsed."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn why_bullets_explain_known_reasons() {
        let details = json!({
            "reason": "formatting_required",
            "files_formatted": 2,
            "file_count": 5,
        });
        assert_eq!(
            collect_why_bullets(&details, "fallback"),
            vec![
                "Some files do not match the configured style.".to_string(),
                "2 of 5 files are not formatted".to_string(),
            ]
        );
    }

    #[test]
    fn why_bullets_fall_back_to_message() {
        assert_eq!(
            collect_why_bullets(&json!({}), "boom"),
            vec!["boom".to_string()]
        );
        let unknown = collect_why_bullets(&json!({ "reason": "other" }), "boom");
        assert_eq!(unknown, vec!["other".to_string()]);
    }

    #[test]
    fn fix_bullets_prefer_hint() {
        let fixes = collect_fix_bullets(&json!({ "hint": "run it again" }));
        assert_eq!(fixes, vec!["run it again".to_string()]);
        let fallback = collect_fix_bullets(&json!({}));
        assert_eq!(fallback.len(), 1);
        assert!(fallback[0].contains("--help"));
    }

    #[test]
    fn format_lines_name_pending_files() {
        let style = Style::new(true, false);
        let details = json!({
            "check": true,
            "formatted_files": ["/w/a.cs"],
            "unsupported_projects": ["Fs"],
            "report": "/w/format-report.json",
        });
        assert_eq!(
            format_lines(&style, &details),
            vec![
                "  would format /w/a.cs".to_string(),
                "  skipped unsupported project Fs".to_string(),
                "Report written to /w/format-report.json".to_string(),
            ]
        );
    }

    #[test]
    fn error_codes_follow_the_command_group() {
        assert_eq!(
            error_code(CommandInfo::new(CommandGroup::Format, "format")),
            diag_commands::FORMAT
        );
        assert_eq!(
            error_code(CommandInfo::new(CommandGroup::Configs, "configs")),
            diag_commands::CONFIGS
        );
    }
}
