//! Lightweight lexical view of a C# or Visual Basic file.
//!
//! Formatting passes only need to know where comments and string literals start and
//! end, so this is a line-oriented scanner and not a parser.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{language::Language, text::SourceText};

/// Whether a line begins or ends inside a literal that spans lines. Whitespace in
/// those positions is content and must not be touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFlags {
    pub starts_in_literal: bool,
    pub ends_in_literal: bool,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    path: PathBuf,
    language: Language,
    text: Arc<SourceText>,
}

impl SyntaxTree {
    pub fn new(path: impl Into<PathBuf>, language: Language, text: Arc<SourceText>) -> Self {
        Self {
            path: path.into(),
            language,
            text,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn text(&self) -> &Arc<SourceText> {
        &self.text
    }

    /// One entry per line of [`SourceText::lines`].
    pub fn line_flags(&self) -> Vec<LineFlags> {
        let raw = self.text.as_str();
        let lines = self.text.lines();
        match self.language {
            Language::VisualBasic => scan_lines(raw, &lines, &mut VbScanner::default()),
            _ => scan_lines(raw, &lines, &mut CSharpScanner::default()),
        }
    }

    /// Concatenated text of the comments before the first token of the file.
    pub fn leading_comments(&self) -> String {
        let raw = self.text.as_str();
        match self.language {
            Language::VisualBasic => leading_vb_comments(raw),
            _ => leading_c_comments(raw),
        }
    }
}

trait LineScanner {
    fn in_literal(&self) -> bool;
    fn scan(&mut self, line: &[u8]);
}

fn scan_lines(
    raw: &str,
    lines: &[crate::text::TextLine],
    scanner: &mut impl LineScanner,
) -> Vec<LineFlags> {
    lines
        .iter()
        .map(|line| {
            let starts_in_literal = scanner.in_literal();
            scanner.scan(line.content(raw).as_bytes());
            LineFlags {
                starts_in_literal,
                ends_in_literal: scanner.in_literal(),
            }
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum CSharpState {
    #[default]
    Code,
    BlockComment,
    Verbatim,
    Raw(usize),
}

#[derive(Default)]
struct CSharpScanner {
    state: CSharpState,
}

impl LineScanner for CSharpScanner {
    fn in_literal(&self) -> bool {
        matches!(self.state, CSharpState::Verbatim | CSharpState::Raw(_))
    }

    fn scan(&mut self, line: &[u8]) {
        let mut i = 0;
        while i < line.len() {
            match self.state {
                CSharpState::BlockComment => match find(line, i, b"*/") {
                    Some(end) => {
                        self.state = CSharpState::Code;
                        i = end + 2;
                    }
                    None => return,
                },
                CSharpState::Verbatim => {
                    if line[i] == b'"' {
                        if line.get(i + 1) == Some(&b'"') {
                            i += 2;
                            continue;
                        }
                        self.state = CSharpState::Code;
                    }
                    i += 1;
                }
                CSharpState::Raw(quotes) => {
                    let run = quote_run(line, i);
                    if run >= quotes {
                        self.state = CSharpState::Code;
                        i += run;
                    } else {
                        i += run.max(1);
                    }
                }
                CSharpState::Code => {
                    let byte = line[i];
                    match byte {
                        b'/' if line.get(i + 1) == Some(&b'/') => return,
                        b'/' if line.get(i + 1) == Some(&b'*') => {
                            self.state = CSharpState::BlockComment;
                            i += 2;
                        }
                        b'\'' => i = skip_quoted(line, i + 1, b'\''),
                        b'@' | b'$' => {
                            let prefix_end = line[i..]
                                .iter()
                                .position(|b| *b != b'@' && *b != b'$')
                                .map_or(line.len(), |p| i + p);
                            let verbatim = line[i..prefix_end].contains(&b'@');
                            if line.get(prefix_end) == Some(&b'"') {
                                i = if verbatim {
                                    self.state = CSharpState::Verbatim;
                                    prefix_end + 1
                                } else {
                                    self.open_string(line, prefix_end)
                                };
                            } else {
                                i = prefix_end;
                            }
                        }
                        b'"' => i = self.open_string(line, i),
                        _ => i += 1,
                    }
                }
            }
        }
    }
}

impl CSharpScanner {
    fn open_string(&mut self, line: &[u8], at: usize) -> usize {
        let run = quote_run(line, at);
        if run >= 3 {
            self.state = CSharpState::Raw(run);
            at + run
        } else if run == 2 {
            at + 2
        } else {
            skip_quoted(line, at + 1, b'"')
        }
    }
}

#[derive(Default)]
struct VbScanner {
    in_string: bool,
}

impl LineScanner for VbScanner {
    fn in_literal(&self) -> bool {
        self.in_string
    }

    fn scan(&mut self, line: &[u8]) {
        let mut i = 0;
        while i < line.len() {
            if self.in_string {
                if line[i] == b'"' {
                    if line.get(i + 1) == Some(&b'"') {
                        i += 2;
                        continue;
                    }
                    self.in_string = false;
                }
                i += 1;
                continue;
            }
            match line[i] {
                b'\'' => return,
                b'"' => self.in_string = true,
                b'R' | b'r' if is_rem(line, i) => return,
                _ => {}
            }
            i += 1;
        }
    }
}

fn is_rem(line: &[u8], at: usize) -> bool {
    let word_start = at == 0 || !line[at - 1].is_ascii_alphanumeric() && line[at - 1] != b'_';
    word_start
        && line.len() >= at + 3
        && line[at..at + 3].eq_ignore_ascii_case(b"rem")
        && line.get(at + 3).map_or(true, |b| b.is_ascii_whitespace())
}

fn quote_run(line: &[u8], at: usize) -> usize {
    line[at..].iter().take_while(|b| **b == b'"').count()
}

/// Skips a `"`/`'` delimited literal with backslash escapes; unterminated literals end
/// at the end of the line.
fn skip_quoted(line: &[u8], mut i: usize, delimiter: u8) -> usize {
    while i < line.len() {
        match line[i] {
            b'\\' => i += 2,
            b if b == delimiter => return i + 1,
            _ => i += 1,
        }
    }
    line.len()
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn leading_c_comments(raw: &str) -> String {
    let mut out = String::new();
    let mut rest = raw.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(['\n', '\r']).unwrap_or(after.len());
            out.push_str(&after[..end]);
            out.push('\n');
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix("/*") {
            let end = after.find("*/").unwrap_or(after.len());
            out.push_str(&after[..end]);
            out.push('\n');
            rest = after.get(end + 2..).unwrap_or("");
        } else if rest.starts_with('#') {
            let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
            rest = &rest[end..];
        } else {
            return out;
        }
    }
}

fn leading_vb_comments(raw: &str) -> String {
    let mut out = String::new();
    for line in raw.trim_start_matches('\u{feff}').lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(comment) = line.strip_prefix('\'') {
            out.push_str(comment);
            out.push('\n');
        } else if is_rem(line.as_bytes(), 0) {
            out.push_str(&line[3..]);
            out.push('\n');
        } else {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Charset;

    fn tree(language: Language, text: &str) -> SyntaxTree {
        SyntaxTree::new(
            "/repo/File",
            language,
            Arc::new(SourceText::new(text, Charset::Utf8)),
        )
    }

    fn flags(language: Language, text: &str) -> Vec<(bool, bool)> {
        tree(language, text)
            .line_flags()
            .into_iter()
            .map(|f| (f.starts_in_literal, f.ends_in_literal))
            .collect()
    }

    #[test]
    fn csharp_verbatim_strings_span_lines() {
        let text = "var s = @\"first\n   second \"\" still\nend\";\nvar t = 1;";
        assert_eq!(
            flags(Language::CSharp, text),
            vec![(false, true), (true, true), (true, false), (false, false)]
        );
    }

    #[test]
    fn csharp_raw_strings_need_matching_quotes() {
        let text = "var s = \"\"\"\n  \"\" inside\n  \"\"\";\nx();";
        assert_eq!(
            flags(Language::CSharp, text),
            vec![(false, true), (true, true), (true, false), (false, false)]
        );
    }

    #[test]
    fn csharp_comments_and_regular_strings_do_not_span() {
        let text = "// @\"not a string\nvar a = \"@\\\"\"; /* \"\n*/ var b = '\"';\n";
        let result = flags(Language::CSharp, text);
        assert!(result.iter().all(|(s, e)| !s && !e));
    }

    #[test]
    fn visual_basic_strings_span_lines() {
        let text = "Dim s = \"a\n  b\"\" c\n\" ' \"comment\nRem \"also comment\n";
        assert_eq!(
            flags(Language::VisualBasic, text),
            vec![
                (false, true),
                (true, true),
                (true, false),
                (false, false),
                (false, false)
            ]
        );
    }

    #[test]
    fn leading_comments_stop_at_first_token() {
        let cs = tree(
            Language::CSharp,
            "\u{feff}#pragma warning disable\n// <auto-generated>\n/* block */\nclass A {} // later\n",
        );
        let comments = cs.leading_comments();
        assert!(comments.contains("<auto-generated>"));
        assert!(comments.contains("block"));
        assert!(!comments.contains("later"));

        let vb = tree(Language::VisualBasic, "' header\nREM more\nModule M\n' later\n");
        assert_eq!(vb.leading_comments(), " header\n more\n");
    }
}
