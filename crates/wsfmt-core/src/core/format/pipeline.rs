use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};
use wsfmt_domain::{DocumentId, SourceText, SyntaxTree, TextEdit, Workspace, WorkspaceSnapshot};

use super::{
    passes, CancellationToken, CharsetChange, FileEdit, FormatError, FormattableDocument,
    FormattedFileLog,
};
use crate::progress::ProgressReporter;

/// New text produced by one pass for one document, with the edits that produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutput {
    pub text: SourceText,
    pub edits: Vec<TextEdit>,
}

/// One formatting pass over a single document.
pub trait DocumentFormatter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` when the document already conforms.
    fn format(
        &self,
        document: &FormattableDocument,
        tree: &SyntaxTree,
    ) -> anyhow::Result<Option<PassOutput>>;
}

impl<T: DocumentFormatter + ?Sized> DocumentFormatter for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn format(
        &self,
        document: &FormattableDocument,
        tree: &SyntaxTree,
    ) -> anyhow::Result<Option<PassOutput>> {
        (**self).format(document, tree)
    }
}

/// The built-in passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Whitespace,
    FinalNewline,
    EndOfLine,
    Charset,
}

impl DocumentFormatter for Formatter {
    fn name(&self) -> &'static str {
        match self {
            Formatter::Whitespace => "whitespace",
            Formatter::FinalNewline => "final-newline",
            Formatter::EndOfLine => "end-of-line",
            Formatter::Charset => "charset",
        }
    }

    fn format(
        &self,
        document: &FormattableDocument,
        tree: &SyntaxTree,
    ) -> anyhow::Result<Option<PassOutput>> {
        match self {
            Formatter::Whitespace => passes::whitespace::format(document, tree),
            Formatter::FinalNewline => passes::final_newline::format(document, tree),
            Formatter::EndOfLine => passes::end_of_line::format(document, tree),
            Formatter::Charset => passes::charset::format(document, tree),
        }
    }
}

/// Passes in the order they run. Whitespace goes first because the newline
/// passes depend on the line contents it settles.
#[must_use]
pub fn default_formatters() -> Vec<Formatter> {
    vec![
        Formatter::Whitespace,
        Formatter::FinalNewline,
        Formatter::EndOfLine,
        Formatter::Charset,
    ]
}

pub(crate) struct PipelineContext<'a> {
    pub(crate) workspace: &'a Workspace,
    pub(crate) pool: &'a rayon::ThreadPool,
    pub(crate) log: &'a FormattedFileLog,
    pub(crate) cancel: &'a CancellationToken,
    pub(crate) progress: &'a ProgressReporter,
}

struct DocumentUpdate {
    id: DocumentId,
    text: SourceText,
    edits: Vec<FileEdit>,
    charset: Option<CharsetChange>,
}

/// Runs every pass in order. Each pass sees the snapshot the previous one produced.
pub(crate) fn run_pipeline<F: DocumentFormatter>(
    ctx: &PipelineContext<'_>,
    snapshot: WorkspaceSnapshot,
    documents: &[FormattableDocument],
    formatters: &[F],
) -> Result<WorkspaceSnapshot, FormatError> {
    let mut snapshot = snapshot;
    for formatter in formatters {
        ctx.cancel.check()?;
        let current = &snapshot;
        let results: Vec<Result<Option<DocumentUpdate>, FormatError>> =
            ctx.pool.install(|| {
                documents
                    .par_iter()
                    .map(|document| {
                        let update = format_document(ctx, current, document, formatter);
                        ctx.progress.increment();
                        update
                    })
                    .collect()
            });

        let mut texts = Vec::new();
        for (document, result) in documents.iter().zip(results) {
            let Some(update) = result? else {
                continue;
            };
            ctx.log.record(document.path(), update.edits, update.charset);
            texts.push((update.id, update.text));
        }
        let changed = texts.len();
        if !texts.is_empty() {
            snapshot = snapshot.with_texts(texts);
        }
        debug!(
            formatter = formatter.name(),
            changed,
            version = snapshot.version(),
            "formatting pass complete"
        );
    }
    ctx.cancel.check()?;
    Ok(snapshot)
}

fn format_document<F: DocumentFormatter>(
    ctx: &PipelineContext<'_>,
    snapshot: &WorkspaceSnapshot,
    document: &FormattableDocument,
    formatter: &F,
) -> Result<Option<DocumentUpdate>, FormatError> {
    ctx.cancel.check()?;
    let text = match ctx.workspace.text(snapshot, document.id()) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                path = %document.path().display(),
                formatter = formatter.name(),
                error = %format!("{err:#}"),
                "unable to read document; leaving it unchanged"
            );
            return Ok(None);
        }
    };
    let tree = SyntaxTree::new(
        document.path(),
        document.language().clone(),
        Arc::clone(&text),
    );
    let output = match formatter.format(document, &tree) {
        Ok(Some(output)) if output.text != *text => output,
        Ok(_) => return Ok(None),
        Err(err) => {
            warn!(
                path = %document.path().display(),
                formatter = formatter.name(),
                error = %format!("{err:#}"),
                "formatter failed; leaving document unchanged"
            );
            return Ok(None);
        }
    };

    let edits = output
        .edits
        .iter()
        .map(|edit| FileEdit {
            position: text.position_of(edit.start),
            original_text: text.slice(edit.start, edit.end).unwrap_or_default().to_string(),
            new_text: edit.new_text.clone(),
            formatter: formatter.name(),
        })
        .collect();
    let charset = (output.text.charset() != text.charset()).then(|| CharsetChange {
        from: text.charset(),
        to: output.text.charset(),
    });
    Ok(Some(DocumentUpdate {
        id: document.id(),
        text: output.text,
        edits,
        charset,
    }))
}
