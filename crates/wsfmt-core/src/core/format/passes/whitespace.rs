//! Indentation and trailing whitespace.

use anyhow::Result;
use wsfmt_domain::{IndentSize, IndentStyle, OptionSet, SyntaxTree, TextEdit};

use super::output_from_edits;
use crate::core::format::{FormattableDocument, PassOutput};

const DEFAULT_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Layout {
    style: IndentStyle,
    tab_width: usize,
    trim_trailing: bool,
}

impl Layout {
    fn from_options(options: &OptionSet) -> Self {
        let tab_width = options
            .tab_width()
            .or(match options.indent_size() {
                Some(IndentSize::Columns(size)) => Some(size),
                _ => None,
            })
            .unwrap_or(DEFAULT_WIDTH);
        Self {
            style: options.indent_style().unwrap_or(IndentStyle::Space),
            tab_width,
            trim_trailing: options.trim_trailing_whitespace().unwrap_or(true),
        }
    }

    fn columns(&self, indentation: &str) -> usize {
        indentation.chars().fold(0, |column, ch| match ch {
            '\t' => column + self.tab_width - column % self.tab_width,
            _ => column + 1,
        })
    }

    fn render(&self, columns: usize) -> String {
        match self.style {
            IndentStyle::Space => " ".repeat(columns),
            IndentStyle::Tab => {
                let mut out = "\t".repeat(columns / self.tab_width);
                out.push_str(&" ".repeat(columns % self.tab_width));
                out
            }
        }
    }
}

fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

pub(crate) fn format(
    document: &FormattableDocument,
    tree: &SyntaxTree,
) -> Result<Option<PassOutput>> {
    let layout = Layout::from_options(&document.effective_options());
    let text = tree.text();
    let raw = text.as_str();
    let lines = text.lines();
    let flags = tree.line_flags();

    let mut edits = Vec::new();
    for (line, flag) in lines.iter().zip(flags) {
        let content = line.content(raw);
        let indent_len = content.len() - content.trim_start_matches(is_blank).len();

        if indent_len == content.len() {
            if layout.trim_trailing && !content.is_empty() && !flag.starts_in_literal {
                edits.push(TextEdit::delete(line.start, line.end));
            }
            continue;
        }

        if !flag.starts_in_literal && indent_len > 0 {
            let indentation = &content[..indent_len];
            let rendered = layout.render(layout.columns(indentation));
            if rendered != indentation {
                edits.push(TextEdit::replace(
                    line.start,
                    line.start + indent_len,
                    rendered,
                ));
            }
        }

        if layout.trim_trailing && !flag.ends_in_literal {
            let kept = content.trim_end_matches(is_blank).len();
            if kept < content.len() {
                edits.push(TextEdit::delete(line.start + kept, line.end));
            }
        }
    }
    output_from_edits(text, edits)
}
