use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::paths::relative_slash_path;

/// Include/exclude filter over document paths. Patterns are globs relative to `base`;
/// a pattern naming a directory also matches everything below it.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    base: PathBuf,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathMatcher {
    pub fn new(base: &Path, include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            base: base.to_path_buf(),
            include: build_set(include).context("invalid --include pattern")?,
            exclude: build_set(exclude).context("invalid --exclude pattern")?,
        })
    }

    /// Matches every path.
    pub fn all(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            include: None,
            exclude: None,
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let relative = relative_slash_path(path, &self.base)
            .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"));
        let included = self
            .include
            .as_ref()
            .map_or(true, |set| set.is_match(&relative));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(&relative));
        included && !excluded
    }
}

fn build_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    let patterns = patterns
        .iter()
        .map(|p| p.trim().trim_start_matches("./").trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>();
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.replace('\\', "/");
        builder.add(Glob::new(&pattern).with_context(|| format!("bad glob `{pattern}`"))?);
        builder.add(
            Glob::new(&format!("{pattern}/**")).with_context(|| format!("bad glob `{pattern}`"))?,
        );
    }
    Ok(Some(builder.build()?))
}
