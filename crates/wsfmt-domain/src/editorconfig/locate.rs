use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const EDITORCONFIG_FILE_NAME: &str = ".editorconfig";

/// Finds every `.editorconfig` relevant to `path`.
///
/// Files anywhere under the start directory come first, in walk order. After them
/// comes at most one file per ancestor directory, nearest first, up to the filesystem
/// root. A start path that does not exist (and whose parent does not exist either)
/// yields nothing.
///
/// Symlinked trees may make the same file appear twice; no deduplication is done.
pub fn locate_style_configs(path: &Path) -> Vec<PathBuf> {
    let Some(start) = start_directory(path) else {
        return Vec::new();
    };
    let start = start.canonicalize().unwrap_or(start);

    let mut found = WalkDir::new(&start)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry while locating editorconfig");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == EDITORCONFIG_FILE_NAME)
        .map(walkdir::DirEntry::into_path)
        .collect::<Vec<_>>();

    let mut current = start.parent();
    while let Some(dir) = current {
        let candidate = dir.join(EDITORCONFIG_FILE_NAME);
        if candidate.is_file() {
            found.push(candidate);
        }
        current = dir.parent();
    }
    found
}

fn start_directory(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        return Some(path.to_path_buf());
    }
    let parent = path.parent()?;
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    parent.is_dir().then(|| parent.to_path_buf())
}
