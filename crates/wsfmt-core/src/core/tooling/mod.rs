//! CLI-facing diagnostics, progress reporting, and outcome shaping.

pub(crate) mod diagnostics;
pub(crate) mod outcome;
pub mod progress;
pub(crate) mod timings;

use serde_json::{json, Value};

use crate::{CommandInfo, CommandStatus, ExecutionOutcome};

#[must_use]
pub fn to_json_response(info: CommandInfo, outcome: &ExecutionOutcome, code: i32) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let mut details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    if let Value::Object(map) = &mut details {
        map.entry("exit_code").or_insert_with(|| json!(code));
    }
    json!({
        "status": status,
        "message": format_status_message(info, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(info: CommandInfo, message: &str) -> String {
    let group_name = info.group.to_string();
    let prefix = if group_name == info.name {
        format!("wsfmt {}", info.name)
    } else {
        format!("wsfmt {} {}", group_name, info.name)
    };
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
