pub(crate) mod charset;
pub(crate) mod end_of_line;
pub(crate) mod final_newline;
pub(crate) mod whitespace;

use anyhow::Result;
use wsfmt_domain::{SourceText, TextEdit};

use super::PassOutput;

/// Applies `edits` to `text`; no edits means the document is left alone.
fn output_from_edits(text: &SourceText, edits: Vec<TextEdit>) -> Result<Option<PassOutput>> {
    if edits.is_empty() {
        return Ok(None);
    }
    let updated = text.apply_edits(&edits)?;
    Ok(Some(PassOutput {
        text: updated,
        edits,
    }))
}
