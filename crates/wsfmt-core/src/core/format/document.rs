use std::path::{Path, PathBuf};

use wsfmt_domain::{Document, DocumentId, Language, OptionSet, ProjectId};

/// A selected document with the options resolved for it. Never mutated; passes
/// read the current text from the snapshot they are given.
#[derive(Debug, Clone)]
pub struct FormattableDocument {
    id: DocumentId,
    project: ProjectId,
    path: PathBuf,
    language: Language,
    legacy_options: OptionSet,
    style_options: Option<OptionSet>,
}

impl FormattableDocument {
    pub fn new(
        document: &Document,
        path: PathBuf,
        language: Language,
        legacy_options: OptionSet,
        style_options: Option<OptionSet>,
    ) -> Self {
        Self {
            id: document.id,
            project: document.project,
            path,
            language,
            legacy_options,
            style_options,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn legacy_options(&self) -> &OptionSet {
        &self.legacy_options
    }

    pub fn style_options(&self) -> Option<&OptionSet> {
        self.style_options.as_ref()
    }

    /// Covered documents have options from a style configuration file.
    pub fn is_covered(&self) -> bool {
        self.style_options.is_some()
    }

    /// Legacy options with style configuration applied on top.
    pub fn effective_options(&self) -> OptionSet {
        match &self.style_options {
            Some(style) => self.legacy_options.overlay(style),
            None => self.legacy_options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document {
            id: DocumentId(3),
            project: ProjectId(1),
            file_path: Some(PathBuf::from("/src/A.cs")),
        }
    }

    #[test]
    fn style_options_override_legacy_ones() {
        let mut style = OptionSet::new();
        style.set("indent_style", "tab");
        let doc = FormattableDocument::new(
            &document(),
            PathBuf::from("/src/A.cs"),
            Language::CSharp,
            OptionSet::workspace_defaults(),
            Some(style),
        );
        assert!(doc.is_covered());
        assert_eq!(doc.effective_options().get("indent_style"), Some("tab"));
        assert_eq!(doc.effective_options().get("indent_size"), Some("4"));
        assert_eq!(doc.id(), DocumentId(3));
        assert_eq!(doc.project(), ProjectId(1));
    }

    #[test]
    fn uncovered_documents_use_legacy_options() {
        let doc = FormattableDocument::new(
            &document(),
            PathBuf::from("/src/A.cs"),
            Language::CSharp,
            OptionSet::workspace_defaults(),
            None,
        );
        assert!(!doc.is_covered());
        assert_eq!(doc.effective_options(), OptionSet::workspace_defaults());
    }
}
