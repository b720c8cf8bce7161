use std::{collections::BTreeMap, sync::Arc};

use super::DocumentId;
use crate::text::SourceText;

/// Immutable view of every document text at one point of a run.
///
/// Documents absent from the overlay still have the text the workspace loaded from
/// disk. Updating returns a new snapshot; clones share the overlay.
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    pub(super) origin: u64,
    version: u64,
    texts: Arc<BTreeMap<DocumentId, Arc<SourceText>>>,
}

impl WorkspaceSnapshot {
    pub(super) fn initial(origin: u64) -> Self {
        Self {
            origin,
            version: 0,
            texts: Arc::new(BTreeMap::new()),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn overlay(&self, id: DocumentId) -> Option<&Arc<SourceText>> {
        self.texts.get(&id)
    }

    pub fn overlaid_documents(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.texts.keys().copied()
    }

    #[must_use]
    pub fn with_text(&self, id: DocumentId, text: SourceText) -> Self {
        self.with_texts([(id, text)])
    }

    #[must_use]
    pub fn with_texts(&self, updates: impl IntoIterator<Item = (DocumentId, SourceText)>) -> Self {
        let mut texts = (*self.texts).clone();
        for (id, text) in updates {
            texts.insert(id, Arc::new(text));
        }
        Self {
            origin: self.origin,
            version: self.version + 1,
            texts: Arc::new(texts),
        }
    }
}
