//! Collaborators the selector and pipeline consume. Tests swap in fakes.

use std::sync::Arc;

use tracing::debug;
use wsfmt_domain::{
    is_generated_code, Document, EditorConfigSet, OptionSet, SyntaxTree, Workspace,
    WorkspaceSnapshot,
};

pub trait SyntaxProvider: Send + Sync {
    /// Returns `Ok(None)` when the document has no syntax representation.
    fn syntax_tree(
        &self,
        workspace: &Workspace,
        snapshot: &WorkspaceSnapshot,
        document: &Document,
    ) -> anyhow::Result<Option<SyntaxTree>>;
}

pub trait GeneratedCodeDetector: Send + Sync {
    fn is_generated(&self, tree: &SyntaxTree) -> bool;
}

pub trait StyleOptionsProvider: Send + Sync {
    /// Options from style configuration files, `None` when no file applies.
    fn style_config_options(&self, tree: &SyntaxTree) -> Option<OptionSet>;
    fn legacy_options(&self, document: &Document) -> OptionSet;
}

#[derive(Clone, Copy)]
pub struct FormatServices<'a> {
    pub syntax: &'a dyn SyntaxProvider,
    pub generated: &'a dyn GeneratedCodeDetector,
    pub options: &'a dyn StyleOptionsProvider,
}

/// Builds lexical trees from the snapshot text of each document.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceSyntaxProvider;

impl SyntaxProvider for WorkspaceSyntaxProvider {
    fn syntax_tree(
        &self,
        workspace: &Workspace,
        snapshot: &WorkspaceSnapshot,
        document: &Document,
    ) -> anyhow::Result<Option<SyntaxTree>> {
        let Some(path) = document.file_path.as_deref() else {
            return Ok(None);
        };
        let Some(project) = workspace.project(document.project) else {
            return Ok(None);
        };
        let text = workspace.text(snapshot, document.id)?;
        Ok(Some(SyntaxTree::new(
            path,
            project.language.clone(),
            Arc::clone(&text),
        )))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderGeneratedCodeDetector;

impl GeneratedCodeDetector for HeaderGeneratedCodeDetector {
    fn is_generated(&self, tree: &SyntaxTree) -> bool {
        is_generated_code(tree)
    }
}

/// `.editorconfig` resolution for style options; workspace defaults for legacy ones.
#[derive(Debug, Clone)]
pub struct EditorConfigOptionsProvider {
    configs: EditorConfigSet,
    legacy: OptionSet,
}

impl EditorConfigOptionsProvider {
    pub fn new(configs: EditorConfigSet, legacy: OptionSet) -> Self {
        Self { configs, legacy }
    }

    pub fn for_workspace(workspace: &Workspace) -> Self {
        let configs = EditorConfigSet::load(workspace.style_config_paths());
        debug!(
            workspace = %workspace.root().display(),
            configs = configs.files().len(),
            "loaded editorconfig files"
        );
        Self::new(configs, OptionSet::workspace_defaults())
    }
}

impl StyleOptionsProvider for EditorConfigOptionsProvider {
    fn style_config_options(&self, tree: &SyntaxTree) -> Option<OptionSet> {
        self.configs.options_for(tree.path())
    }

    fn legacy_options(&self, _document: &Document) -> OptionSet {
        self.legacy.clone()
    }
}
