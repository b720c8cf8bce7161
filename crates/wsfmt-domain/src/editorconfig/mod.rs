//! `.editorconfig` discovery, parsing and per-file option resolution.

mod glob;
mod locate;
mod resolve;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use globset::GlobMatcher;

use crate::options::OptionSet;

pub use locate::{locate_style_configs, EDITORCONFIG_FILE_NAME};
pub use resolve::EditorConfigSet;

/// Properties whose values are case-insensitive and stored lower-cased.
const KNOWN_PROPERTIES: &[&str] = &[
    "indent_style",
    "indent_size",
    "tab_width",
    "end_of_line",
    "charset",
    "trim_trailing_whitespace",
    "insert_final_newline",
    "root",
];

#[derive(Debug, Clone)]
pub struct Section {
    pub pattern: String,
    matcher: Option<GlobMatcher>,
    pub options: OptionSet,
}

impl Section {
    /// Matches a path relative to the owning file's directory, written with `/`.
    pub fn matches(&self, relative: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(relative))
    }
}

#[derive(Debug, Clone)]
pub struct EditorConfigFile {
    pub path: PathBuf,
    pub root: bool,
    pub sections: Vec<Section>,
}

impl EditorConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::parse(path, &contents))
    }

    /// Parses file contents. Malformed lines are ignored the way editors ignore them.
    pub fn parse(path: &Path, contents: &str) -> Self {
        let mut root = false;
        let mut sections: Vec<Section> = Vec::new();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') {
                if let Some(end) = line.rfind(']') {
                    let pattern = line[1..end].to_string();
                    let matcher = glob::compile_section(&pattern);
                    if matcher.is_none() {
                        tracing::debug!(
                            file = %path.display(),
                            pattern = %pattern,
                            "ignoring editorconfig section with invalid glob"
                        );
                    }
                    sections.push(Section {
                        pattern,
                        matcher,
                        options: OptionSet::new(),
                    });
                }
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let mut value = value.trim().to_string();
            if KNOWN_PROPERTIES.contains(&key.as_str()) {
                value = value.to_ascii_lowercase();
            }
            match sections.last_mut() {
                Some(section) => section.options.set(&key, value),
                None if key == "root" => root = value == "true",
                None => {}
            }
        }
        Self {
            path: path.to_path_buf(),
            root,
            sections,
        }
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_preamble_sections_and_comments() {
        let file = EditorConfigFile::parse(
            Path::new("/repo/.editorconfig"),
            "# top\nroot = true\n\n[*.cs]\nindent_style = Tab\n; note\nCustom_Key = KeepCase\n[*.vb]\nend_of_line=crlf\n",
        );
        assert!(file.root);
        assert_eq!(file.sections.len(), 2);
        let cs = &file.sections[0];
        assert_eq!(cs.pattern, "*.cs");
        assert_eq!(cs.options.get("indent_style"), Some("tab"));
        assert_eq!(cs.options.get("custom_key"), Some("KeepCase"));
        assert_eq!(file.sections[1].options.get("end_of_line"), Some("crlf"));
        assert_eq!(file.directory(), Path::new("/repo"));
    }

    #[test]
    fn root_inside_a_section_is_not_the_preamble() {
        let file = EditorConfigFile::parse(Path::new("/r/.editorconfig"), "[*]\nroot = true\n");
        assert!(!file.root);
    }
}
