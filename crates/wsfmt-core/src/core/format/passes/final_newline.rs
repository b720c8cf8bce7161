use anyhow::Result;
use wsfmt_domain::{EndOfLine, SyntaxTree, TextEdit};

use super::output_from_edits;
use crate::core::format::{FormattableDocument, PassOutput};

/// Acts only when style configuration sets `insert_final_newline`.
pub(crate) fn format(
    document: &FormattableDocument,
    tree: &SyntaxTree,
) -> Result<Option<PassOutput>> {
    let Some(style) = document.style_options() else {
        return Ok(None);
    };
    let Some(insert) = style.insert_final_newline() else {
        return Ok(None);
    };
    let text = tree.text();
    let raw = text.as_str();

    let mut edits = Vec::new();
    if insert {
        if !raw.is_empty() && !text.ends_with_line_break() {
            let newline = style.end_of_line().unwrap_or_else(EndOfLine::platform);
            edits.push(TextEdit::insert(raw.len(), newline.as_str()));
        }
    } else {
        let kept = raw.trim_end_matches(['\r', '\n']).len();
        if kept < raw.len() {
            edits.push(TextEdit::delete(kept, raw.len()));
        }
    }
    output_from_edits(text, edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::passes::test_support::{document, options, tree};

    fn run(style: Option<&[(&str, &str)]>, text: &str) -> Option<String> {
        format(&document(style.map(options)), &tree(text))
            .unwrap()
            .map(|out| out.text.as_str().to_string())
    }

    #[test]
    fn appends_configured_newline() {
        let style: &[(&str, &str)] = &[("insert_final_newline", "true"), ("end_of_line", "crlf")];
        assert_eq!(run(Some(style), "class C {}").as_deref(), Some("class C {}\r\n"));
        assert!(run(Some(style), "class C {}\n").is_none());
        assert!(run(Some(style), "").is_none());
    }

    #[test]
    fn removes_trailing_breaks_when_disabled() {
        let style: &[(&str, &str)] = &[("insert_final_newline", "false")];
        assert_eq!(run(Some(style), "class C {}\r\n\n").as_deref(), Some("class C {}"));
        assert!(run(Some(style), "class C {}").is_none());
    }

    #[test]
    fn ignores_documents_without_the_setting() {
        assert!(run(None, "class C {}").is_none());
        assert!(run(Some(&[("indent_style", "tab")][..]), "class C {}").is_none());
    }
}
