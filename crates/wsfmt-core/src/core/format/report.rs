use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use wsfmt_domain::{Charset, LinePosition};

pub const DEFAULT_REPORT_FILE_NAME: &str = "format-report.json";

/// One file of the report: every edit applied to it, in pass order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedFile {
    pub file_path: PathBuf,
    pub edits: Vec<FileEdit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<CharsetChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEdit {
    /// Start of the edit in the text the pass received.
    pub position: LinePosition,
    pub original_text: String,
    pub new_text: String,
    #[serde(skip)]
    pub formatter: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharsetChange {
    pub from: Charset,
    pub to: Charset,
}

/// Accumulates formatted files across passes. Safe to record into from any thread.
#[derive(Debug, Default)]
pub struct FormattedFileLog {
    files: Mutex<IndexMap<PathBuf, FormattedFile>>,
}

impl FormattedFileLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, IndexMap<PathBuf, FormattedFile>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, path: &Path, edits: Vec<FileEdit>, charset: Option<CharsetChange>) {
        if edits.is_empty() && charset.is_none() {
            return;
        }
        let mut files = self.guard();
        let entry = files
            .entry(path.to_path_buf())
            .or_insert_with(|| FormattedFile {
                file_path: path.to_path_buf(),
                edits: Vec::new(),
                charset: None,
            });
        entry.edits.extend(edits);
        if let Some(change) = charset {
            entry.charset = Some(match entry.charset {
                Some(previous) => CharsetChange {
                    from: previous.from,
                    to: change.to,
                },
                None => change,
            });
        }
    }

    #[must_use]
    pub fn into_files(self) -> Vec<FormattedFile> {
        self.files
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_values()
            .collect()
    }
}

/// Where the report goes: `*.json` is used as given, `.` means the working
/// directory, anything else is a directory that receives the default file name.
#[must_use]
pub fn resolve_report_path(requested: &Path, cwd: &Path) -> PathBuf {
    let is_json = requested
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        requested.to_path_buf()
    } else if requested == Path::new(".") {
        cwd.join(DEFAULT_REPORT_FILE_NAME)
    } else {
        requested.join(DEFAULT_REPORT_FILE_NAME)
    }
}

pub(crate) fn write_report(path: &Path, files: &[FormattedFile]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(files)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn report_paths_resolve() {
        let cwd = Path::new("/work");
        assert_eq!(
            resolve_report_path(Path::new("."), cwd),
            PathBuf::from("/work/format-report.json")
        );
        assert_eq!(
            resolve_report_path(Path::new("reports/out.json"), cwd),
            PathBuf::from("reports/out.json")
        );
        assert_eq!(
            resolve_report_path(Path::new("reports/"), cwd),
            PathBuf::from("reports/format-report.json")
        );
    }

    #[test]
    fn log_merges_records_per_file() {
        let log = FormattedFileLog::new();
        let edit = |text: &str| FileEdit {
            position: LinePosition {
                line: 1,
                character: 1,
            },
            original_text: String::new(),
            new_text: text.to_string(),
            formatter: "test",
        };
        log.record(Path::new("/a.cs"), vec![edit("x")], None);
        log.record(Path::new("/b.cs"), Vec::new(), None);
        log.record(
            Path::new("/a.cs"),
            vec![edit("y")],
            Some(CharsetChange {
                from: Charset::Utf8,
                to: Charset::Utf8Bom,
            }),
        );
        let files = log.into_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].edits.len(), 2);
        assert_eq!(files[0].edits[1].new_text, "y");
        assert_eq!(files[0].charset.map(|c| c.to), Some(Charset::Utf8Bom));
    }

    #[test]
    fn written_report_is_pretty_json_and_overwrites() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested/dir/format-report.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale").unwrap();
        let files = vec![FormattedFile {
            file_path: PathBuf::from("/src/A.cs"),
            edits: vec![FileEdit {
                position: LinePosition {
                    line: 2,
                    character: 5,
                },
                original_text: "  ".into(),
                new_text: String::new(),
                formatter: "whitespace",
            }],
            charset: None,
        }];
        write_report(&path, &files).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  {"));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["file_path"], "/src/A.cs");
        assert_eq!(value[0]["edits"][0]["position"]["line"], 2);
        assert_eq!(value[0]["edits"][0]["original_text"], "  ");
        assert!(value[0]["edits"][0].get("formatter").is_none());
        assert!(value[0].get("charset").is_none());
    }

    #[test]
    fn report_parents_are_created() {
        let temp = tempdir().unwrap();
        let path = resolve_report_path(&temp.path().join("reports"), temp.path());
        write_report(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap().trim(), "[]");
    }
}
