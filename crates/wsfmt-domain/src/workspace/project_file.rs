//! MSBuild project file reading: just enough to list compile items and references.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::{
    language::Language,
    paths::{join_build_path, relative_slash_path},
};

/// Excluded from default compile items, relative to the project directory.
const DEFAULT_ITEM_EXCLUDES: &[&str] = &["bin/**", "obj/**", "**/.*/**"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ProjectFile {
    pub sdk_style: bool,
    pub assembly_name: Option<String>,
    pub target_frameworks: Vec<String>,
    pub enable_default_compile_items: Option<bool>,
    pub compile_include: Vec<String>,
    pub compile_remove: Vec<String>,
    pub project_references: Vec<String>,
}

impl ProjectFile {
    pub fn parse(contents: &str) -> Result<Self, String> {
        let doc = roxmltree::Document::parse(contents.trim_start_matches('\u{feff}'))
            .map_err(|err| err.to_string())?;
        let root = doc.root_element();
        if !root.has_tag_name("Project") {
            return Err(format!(
                "expected <Project> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut file = ProjectFile {
            sdk_style: root.attribute("Sdk").is_some(),
            ..ProjectFile::default()
        };
        for node in root.descendants().filter(roxmltree::Node::is_element) {
            let text = node.text().map(str::trim).unwrap_or_default();
            match node.tag_name().name() {
                "Sdk" => file.sdk_style = true,
                "Import" if node.attribute("Sdk").is_some() => file.sdk_style = true,
                "AssemblyName" if !text.is_empty() => file.assembly_name = Some(text.to_string()),
                "TargetFramework" if !text.is_empty() => {
                    file.target_frameworks = vec![text.to_string()];
                }
                "TargetFrameworks" => file.target_frameworks = split_items(text),
                "EnableDefaultCompileItems" | "EnableDefaultItems" if !text.is_empty() => {
                    let enabled = !text.eq_ignore_ascii_case("false");
                    file.enable_default_compile_items =
                        Some(file.enable_default_compile_items.unwrap_or(true) && enabled);
                }
                "Compile" => {
                    if let Some(include) = node.attribute("Include") {
                        file.compile_include.extend(split_items(include));
                    }
                    if let Some(remove) = node.attribute("Remove") {
                        file.compile_remove.extend(split_items(remove));
                    }
                }
                "ProjectReference" => {
                    if let Some(include) = node.attribute("Include") {
                        file.project_references.extend(split_items(include));
                    }
                }
                _ => {}
            }
        }
        file.target_frameworks.dedup();
        Ok(file)
    }

    /// Compile items of this project as absolute paths, sorted, without duplicates.
    /// Literal items that do not exist are returned in `missing`.
    pub fn compile_items(&self, project_dir: &Path, language: &Language) -> CompileItems {
        let mut patterns = Vec::new();
        let mut excludes = self.compile_remove.clone();
        if self.sdk_style && self.enable_default_compile_items != Some(false) {
            for ext in language.source_extensions() {
                patterns.push(format!("**/*.{ext}"));
            }
            excludes.extend(DEFAULT_ITEM_EXCLUDES.iter().map(|s| (*s).to_string()));
        }

        let mut items = CompileItems::default();
        let default_set = build_glob_set(&patterns);
        let remove_set = build_glob_set(&excludes);
        let explicit_remove = build_glob_set(&self.compile_remove);
        let mut explicit_globs = Vec::new();
        for include in &self.compile_include {
            if include.contains("$(") {
                items.skipped.push(include.clone());
            } else if is_glob(include) {
                explicit_globs.push(include.replace('\\', "/"));
            } else {
                let path = join_build_path(project_dir, include);
                let removed = relative_slash_path(&path, project_dir)
                    .is_some_and(|rel| explicit_remove.is_match(&rel));
                if removed {
                    continue;
                }
                if path.is_file() {
                    items.files.push(path);
                } else {
                    items.missing.push(path);
                }
            }
        }
        let explicit_set = build_glob_set(&explicit_globs);

        if !patterns.is_empty() || !explicit_globs.is_empty() {
            for entry in WalkDir::new(project_dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
            {
                let Some(rel) = relative_slash_path(entry.path(), project_dir) else {
                    continue;
                };
                let by_default = default_set.is_match(&rel) && !remove_set.is_match(&rel);
                let by_explicit = explicit_set.is_match(&rel) && !explicit_remove.is_match(&rel);
                if by_default || by_explicit {
                    items.files.push(entry.into_path());
                }
            }
        }
        items.files.sort();
        items.files.dedup();
        items
    }
}

#[derive(Debug, Default)]
pub(super) struct CompileItems {
    pub files: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    /// Items that use MSBuild properties, which are not evaluated.
    pub skipped: Vec<String>,
}

fn split_items(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_glob(item: &str) -> bool {
    item.contains(['*', '?', '['])
}

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.replace('\\', "/");
        let pattern = pattern.trim_start_matches("./");
        match GlobBuilder::new(pattern).literal_separator(true).build() {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => {
                tracing::debug!(pattern = %pattern, error = %err, "ignoring invalid item glob");
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}
