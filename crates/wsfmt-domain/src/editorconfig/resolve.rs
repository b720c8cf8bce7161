use std::path::{Path, PathBuf};

use tracing::warn;

use super::EditorConfigFile;
use crate::{
    options::{OptionSet, INDENT_SIZE, INDENT_STYLE, TAB_WIDTH},
    paths::relative_slash_path,
};

/// The parsed `.editorconfig` files of one workspace.
#[derive(Debug, Clone, Default)]
pub struct EditorConfigSet {
    files: Vec<EditorConfigFile>,
}

impl EditorConfigSet {
    /// Loads every path; unreadable files are skipped with a warning.
    pub fn load(paths: &[PathBuf]) -> Self {
        let files = paths
            .iter()
            .filter_map(|path| match EditorConfigFile::load(path) {
                Ok(file) => Some(file),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable editorconfig");
                    None
                }
            })
            .collect();
        Self { files }
    }

    pub fn from_files(files: Vec<EditorConfigFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[EditorConfigFile] {
        &self.files
    }

    /// Resolves the options `.editorconfig` files assign to `path`, or `None` when no
    /// section applies.
    pub fn options_for(&self, path: &Path) -> Option<OptionSet> {
        let mut applicable = self
            .files
            .iter()
            .filter(|file| path.starts_with(file.directory()))
            .collect::<Vec<_>>();
        applicable.sort_by_key(|file| file.directory().components().count());
        if let Some(nearest_root) = applicable.iter().rposition(|file| file.root) {
            applicable.drain(..nearest_root);
        }

        let mut resolved = OptionSet::new();
        for file in applicable {
            let Some(relative) = relative_slash_path(path, file.directory()) else {
                continue;
            };
            for section in file.sections.iter().filter(|s| s.matches(&relative)) {
                for (key, value) in section.options.iter() {
                    if value == "unset" {
                        resolved.unset(key);
                    } else {
                        resolved.set(key, value);
                    }
                }
            }
        }
        apply_implied_defaults(&mut resolved);
        (!resolved.is_empty()).then_some(resolved)
    }
}

fn apply_implied_defaults(options: &mut OptionSet) {
    if options.get(INDENT_STYLE) == Some("tab") && !options.contains(INDENT_SIZE) {
        options.set(INDENT_SIZE, "tab");
    }
    if !options.contains(TAB_WIDTH) {
        if let Some(size) = options
            .get(INDENT_SIZE)
            .filter(|size| size.parse::<usize>().is_ok())
            .map(str::to_string)
        {
            options.set(TAB_WIDTH, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, contents: &str) -> EditorConfigFile {
        EditorConfigFile::parse(Path::new(path), contents)
    }

    #[test]
    fn nearer_files_override_farther_ones() {
        let set = EditorConfigSet::from_files(vec![
            file("/repo/src/.editorconfig", "[*.cs]\nindent_size = 2\n"),
            file(
                "/repo/.editorconfig",
                "root = true\n[*]\nindent_size = 4\ninsert_final_newline = true\n",
            ),
        ]);
        let options = set
            .options_for(Path::new("/repo/src/app/Program.cs"))
            .expect("covered");
        assert_eq!(options.get("indent_size"), Some("2"));
        assert_eq!(options.get("tab_width"), Some("2"));
        assert_eq!(options.insert_final_newline(), Some(true));
    }

    #[test]
    fn root_stops_inheritance() {
        let set = EditorConfigSet::from_files(vec![
            file("/repo/.editorconfig", "[*]\ncharset = latin1\n"),
            file("/repo/inner/.editorconfig", "root = true\n[*.vb]\nend_of_line = crlf\n"),
        ]);
        let options = set
            .options_for(Path::new("/repo/inner/Module.vb"))
            .expect("covered");
        assert_eq!(options.get("charset"), None);
        assert_eq!(options.get("end_of_line"), Some("crlf"));
        assert!(set.options_for(Path::new("/repo/inner/Code.cs")).is_none());
    }

    #[test]
    fn later_sections_win_and_unset_clears() {
        let set = EditorConfigSet::from_files(vec![file(
            "/repo/.editorconfig",
            "[*]\nindent_style = tab\n[*.cs]\nindent_style = space\n[Generated.cs]\nindent_style = unset\n",
        )]);
        let a = set.options_for(Path::new("/repo/A.cs")).expect("covered");
        assert_eq!(a.get("indent_style"), Some("space"));
        assert!(set.options_for(Path::new("/repo/Generated.cs")).is_none());
        let vb = set.options_for(Path::new("/repo/A.vb")).expect("covered");
        assert_eq!(vb.get("indent_size"), Some("tab"));
    }

    #[test]
    fn files_outside_every_config_directory_are_not_covered() {
        let set = EditorConfigSet::from_files(vec![file("/repo/a/.editorconfig", "[*]\ncharset = utf-8\n")]);
        assert!(set.options_for(Path::new("/repo/b/File.cs")).is_none());
    }
}
