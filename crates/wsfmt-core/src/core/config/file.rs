//! Optional `wsfmt.toml` next to the workspace.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use toml_edit::{DocumentMut, Item, Table};

pub(crate) const SETTINGS_FILE_NAME: &str = "wsfmt.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileSettings {
    pub(crate) source: Option<PathBuf>,
    pub(crate) include: Vec<String>,
    pub(crate) exclude: Vec<String>,
    pub(crate) include_generated: Option<bool>,
    pub(crate) report: Option<PathBuf>,
}

/// Reads `[format]` from `wsfmt.toml` in `dir`; a missing file yields defaults.
pub(crate) fn load_file_settings(dir: &Path) -> Result<FileSettings> {
    let path = dir.join(SETTINGS_FILE_NAME);
    if !path.is_file() {
        return Ok(FileSettings::default());
    }
    let contents =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let mut settings = parse_file_settings(&contents)
        .with_context(|| format!("invalid {}", path.display()))?;
    if let Some(report) = settings.report.take() {
        settings.report = Some(if report.is_absolute() {
            report
        } else {
            dir.join(report)
        });
    }
    settings.source = Some(path);
    Ok(settings)
}

pub(crate) fn parse_file_settings(contents: &str) -> Result<FileSettings> {
    let doc: DocumentMut = contents.parse()?;
    let Some(table) = doc.get("format").and_then(Item::as_table) else {
        return Ok(FileSettings::default());
    };
    Ok(FileSettings {
        source: None,
        include: parse_item_string_array(table, "include")?,
        exclude: parse_item_string_array(table, "exclude")?,
        include_generated: parse_item_bool(table, "include-generated")?,
        report: table
            .get("report")
            .map(|item| {
                item.as_str()
                    .map(PathBuf::from)
                    .ok_or_else(|| anyhow!("format.report must be a string"))
            })
            .transpose()?,
    })
}

fn parse_item_string_array(table: &Table, key: &str) -> Result<Vec<String>> {
    let Some(item) = table.get(key) else {
        return Ok(Vec::new());
    };
    let array = item
        .as_array()
        .ok_or_else(|| anyhow!("format.{key} must be an array of strings"))?;
    let mut values = Vec::new();
    for value in array {
        let literal = value
            .as_str()
            .ok_or_else(|| anyhow!("format.{key} entries must be strings"))?;
        values.push(literal.to_string());
    }
    Ok(values)
}

fn parse_item_bool(table: &Table, key: &str) -> Result<Option<bool>> {
    table
        .get(key)
        .map(|item| {
            item.as_bool()
                .ok_or_else(|| anyhow!("format.{key} must be a boolean"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_format_table() {
        let settings = parse_file_settings(
            r#"
[format]
include = ["src/"]
exclude = ["src/Generated"]
include-generated = true
report = "artifacts"
"#,
        )
        .unwrap();
        assert_eq!(settings.include, vec!["src/"]);
        assert_eq!(settings.exclude, vec!["src/Generated"]);
        assert_eq!(settings.include_generated, Some(true));
        assert_eq!(settings.report, Some(PathBuf::from("artifacts")));
    }

    #[test]
    fn rejects_wrong_types() {
        let err = parse_file_settings("[format]\ninclude = \"src\"\n").unwrap_err();
        assert!(err.to_string().contains("format.include"));
        assert!(parse_file_settings("[format]\ninclude-generated = \"yes\"\n").is_err());
    }

    #[test]
    fn missing_file_and_table_mean_defaults() {
        let temp = tempdir().unwrap();
        assert_eq!(load_file_settings(temp.path()).unwrap(), FileSettings::default());
        assert_eq!(parse_file_settings("[other]\nx = 1\n").unwrap(), FileSettings::default());
    }

    #[test]
    fn relative_report_is_anchored_at_the_settings_directory() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            "[format]\nreport = \"out/report.json\"\n",
        )
        .unwrap();
        let settings = load_file_settings(temp.path()).unwrap();
        assert_eq!(settings.report, Some(temp.path().join("out/report.json")));
        assert_eq!(settings.source, Some(temp.path().join(SETTINGS_FILE_NAME)));
    }
}
