use std::path::PathBuf;

use anyhow::Result;
use serde_json::{json, Map, Value};
use wsfmt_domain::{locate_style_configs, EditorConfigSet};

use crate::{CommandContext, ExecutionOutcome};

/// Arguments of `wsfmt configs`.
#[derive(Debug, Clone, Default)]
pub struct ConfigsRequest {
    pub path: Option<PathBuf>,
}

/// Lists the `.editorconfig` files that apply to a path and, for a file, the
/// options they resolve to.
///
/// # Errors
/// Returns an error only when the working directory cannot be determined.
pub fn list_configs(ctx: &CommandContext, request: &ConfigsRequest) -> Result<ExecutionOutcome> {
    let cwd = ctx.current_dir()?;
    let target = match &request.path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => cwd.join(path),
        None => cwd,
    };
    let configs = locate_style_configs(&target);
    let listed = configs
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>();

    let options = if target.is_file() {
        let file = target.canonicalize().unwrap_or_else(|_| target.clone());
        EditorConfigSet::load(&configs).options_for(&file).map(|set| {
            set.iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect::<Map<_, _>>()
        })
    } else {
        None
    };

    let message = match configs.len() {
        0 => "no style configuration files found".to_string(),
        1 => "found 1 style configuration file".to_string(),
        n => format!("found {n} style configuration files"),
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "path": target.display().to_string(),
            "configs": listed,
            "covered": options.is_some(),
            "options": options,
        }),
    ))
}
