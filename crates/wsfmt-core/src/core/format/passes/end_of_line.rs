use anyhow::Result;
use wsfmt_domain::{SyntaxTree, TextEdit};

use super::output_from_edits;
use crate::core::format::{FormattableDocument, PassOutput};

/// Rewrites every line break that differs from the configured `end_of_line`.
pub(crate) fn format(
    document: &FormattableDocument,
    tree: &SyntaxTree,
) -> Result<Option<PassOutput>> {
    let Some(eol) = document.style_options().and_then(|style| style.end_of_line()) else {
        return Ok(None);
    };
    let text = tree.text();
    let raw = text.as_str();
    let edits = text
        .lines()
        .into_iter()
        .filter(|line| line.has_break() && line.line_break(raw) != eol.as_str())
        .map(|line| TextEdit::replace(line.end, line.end_with_break, eol.as_str()))
        .collect();
    output_from_edits(text, edits)
}
