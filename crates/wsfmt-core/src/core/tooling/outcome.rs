use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// Process exit code carried in `details`, falling back to the status.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.details
            .get("exit_code")
            .and_then(Value::as_i64)
            .and_then(|code| i32::try_from(code).ok())
            .unwrap_or(match self.status {
                CommandStatus::Ok => 0,
                CommandStatus::UserError | CommandStatus::Failure => 1,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exit_code_prefers_details() {
        let outcome = ExecutionOutcome::user_error("check failed", json!({ "exit_code": 2 }));
        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(ExecutionOutcome::failure("boom", Value::Null).exit_code(), 1);
        assert_eq!(ExecutionOutcome::success("ok", json!({})).exit_code(), 0);
    }
}
