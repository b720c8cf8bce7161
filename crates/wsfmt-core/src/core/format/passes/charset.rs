use anyhow::Result;
use tracing::warn;
use wsfmt_domain::SyntaxTree;

use crate::core::format::{FormattableDocument, PassOutput};

/// Re-tags the text with the configured charset. The content is untouched, and a
/// text whose bytes would not change is left alone.
pub(crate) fn format(
    document: &FormattableDocument,
    tree: &SyntaxTree,
) -> Result<Option<PassOutput>> {
    let Some(target) = document.style_options().and_then(|style| style.charset()) else {
        return Ok(None);
    };
    match tree.text().reencode(target) {
        Ok(Some(text)) => Ok(Some(PassOutput {
            text,
            edits: Vec::new(),
        })),
        Ok(None) => Ok(None),
        Err(err) => {
            warn!(
                path = %document.path().display(),
                charset = %target,
                error = %err,
                "leaving the charset unchanged"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::passes::test_support::{document, options, tree, tree_with};
    use wsfmt_domain::{Charset, SourceText};

    #[test]
    fn changes_charset_only() {
        let doc = document(Some(options(&[("charset", "utf-8-bom")])));
        let out = format(&doc, &tree("class C {}\n")).unwrap().unwrap();
        assert_eq!(out.text.charset(), Charset::Utf8Bom);
        assert_eq!(out.text.as_str(), "class C {}\n");
        assert!(out.edits.is_empty());
        assert!(format(&doc, &tree_with(out.text)).unwrap().is_none());
    }

    #[test]
    fn ascii_text_already_matches_latin1() {
        let doc = document(Some(options(&[("charset", "latin1")])));
        assert!(format(&doc, &tree("class C {}\n")).unwrap().is_none());
    }

    #[test]
    fn converted_text_is_stable_after_reading_it_back() {
        for charset in ["latin1", "utf-8-bom", "utf-16be"] {
            let doc = document(Some(options(&[("charset", charset)])));
            let out = format(&doc, &tree("// caf\u{e9}\n")).unwrap().unwrap();
            let reread = SourceText::decode(&out.text.encode().unwrap()).unwrap();
            assert_eq!(reread.as_str(), "// caf\u{e9}\n");
            assert!(
                format(&doc, &tree_with(reread)).unwrap().is_none(),
                "{charset} changed twice"
            );
        }
    }

    #[test]
    fn unrepresentable_text_is_left_alone() {
        let doc = document(Some(options(&[("charset", "latin1")])));
        let text = SourceText::new("// \u{2713}\n", Charset::Utf8);
        assert!(format(&doc, &tree_with(text)).unwrap().is_none());
    }
}
