use std::path::{Component, Path, PathBuf};

/// Renders `path` relative to `base` with forward slashes, or `None` when it lies outside.
pub(crate) fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts = rel
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>();
    Some(parts.join("/"))
}

/// Converts an item path written in a project or solution file (which may use `\`)
/// into a native path joined onto `base`.
pub(crate) fn join_build_path(base: &Path, raw: &str) -> PathBuf {
    let normalized = raw.trim().replace('\\', "/");
    let mut out = base.to_path_buf();
    for part in normalized.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Canonicalizes when possible so paths reached through different spellings compare equal.
pub(crate) fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
