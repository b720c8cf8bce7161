use std::fmt;

use serde::{Deserialize, Serialize};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    #[error("utf-16 content has an odd number of bytes")]
    TruncatedUtf16,
    #[error("invalid utf-16 sequence at byte {offset}")]
    InvalidUtf16 { offset: usize },
    #[error("invalid utf-8 after byte-order mark at byte {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("character U+{code:04X} cannot be represented in {charset}")]
    Unrepresentable { code: u32, charset: Charset },
    #[error("text written as {charset} would not read back unchanged")]
    AmbiguousEncoding { charset: Charset },
    #[error("edit {start}..{end} is out of bounds or splits a character")]
    InvalidSpan { start: usize, end: usize },
    #[error("edits overlap at byte {offset}")]
    OverlappingEdits { offset: usize },
}

/// Byte-level encoding of a source file, named after the `charset` values of `.editorconfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "utf-8-bom")]
    Utf8Bom,
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-16be")]
    Utf16Be,
    Latin1,
}

impl Charset {
    pub fn from_editorconfig(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "utf-8" => Some(Self::Utf8),
            "utf-8-bom" => Some(Self::Utf8Bom),
            "utf-16le" => Some(Self::Utf16Le),
            "utf-16be" => Some(Self::Utf16Be),
            "latin1" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-bom",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Latin1 => "latin1",
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, TextError> {
        let bytes = match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf8Bom => {
                let mut out = Vec::with_capacity(UTF8_BOM.len() + text.len());
                out.extend_from_slice(UTF8_BOM);
                out.extend_from_slice(text.as_bytes());
                out
            }
            Self::Utf16Le => {
                let mut out = UTF16_LE_BOM.to_vec();
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
            Self::Utf16Be => {
                let mut out = UTF16_BE_BOM.to_vec();
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
                out
            }
            Self::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for ch in text.chars() {
                    let code = u32::from(ch);
                    let byte = u8::try_from(code).map_err(|_| TextError::Unrepresentable {
                        code,
                        charset: self,
                    })?;
                    out.push(byte);
                }
                out
            }
        };
        Ok(bytes)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-based position of a character, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePosition {
    pub line: usize,
    pub character: usize,
}

/// Replacement of the byte range `start..end` of a text with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::replace(offset, offset, new_text)
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self::replace(start, end, String::new())
    }
}

/// A line of a [`SourceText`]. `end` excludes the line break, `end_with_break` includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLine {
    pub start: usize,
    pub end: usize,
    pub end_with_break: usize,
}

impl TextLine {
    pub fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn line_break<'a>(&self, text: &'a str) -> &'a str {
        &text[self.end..self.end_with_break]
    }

    pub fn has_break(&self) -> bool {
        self.end_with_break > self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    text: String,
    charset: Charset,
}

impl SourceText {
    pub fn new(text: impl Into<String>, charset: Charset) -> Self {
        Self {
            text: text.into(),
            charset,
        }
    }

    /// Decodes file bytes, honoring byte-order marks. Bytes that are not valid UTF-8
    /// and carry no BOM are read as latin1. A UTF-8 BOM followed by invalid UTF-8 is
    /// an error, since no decoding would write the file back byte for byte.
    pub fn decode(bytes: &[u8]) -> Result<Self, TextError> {
        if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
            let text = std::str::from_utf8(rest).map_err(|err| TextError::InvalidUtf8 {
                offset: UTF8_BOM.len() + err.valid_up_to(),
            })?;
            return Ok(Self::new(text, Charset::Utf8Bom));
        }
        if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
            return decode_utf16(rest, u16::from_le_bytes).map(|t| Self::new(t, Charset::Utf16Le));
        }
        if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
            return decode_utf16(rest, u16::from_be_bytes).map(|t| Self::new(t, Charset::Utf16Be));
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(Self::new(text, Charset::Utf8)),
            Err(_) => {
                let text = bytes.iter().map(|b| char::from(*b)).collect::<String>();
                Ok(Self::new(text, Charset::Latin1))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    #[must_use]
    pub fn with_charset(&self, charset: Charset) -> Self {
        Self::new(self.text.clone(), charset)
    }

    pub fn encode(&self) -> Result<Vec<u8>, TextError> {
        self.charset.encode(&self.text)
    }

    /// The text re-tagged as `target`, or `None` when writing it as `target` yields
    /// the bytes it already has (ASCII is the same in utf-8 and latin1).
    ///
    /// # Errors
    /// [`TextError::Unrepresentable`] when a character has no encoding in `target`,
    /// and [`TextError::AmbiguousEncoding`] when the new bytes would decode to
    /// different text.
    pub fn reencode(&self, target: Charset) -> Result<Option<Self>, TextError> {
        let bytes = target.encode(&self.text)?;
        if self.encode()? == bytes {
            return Ok(None);
        }
        if Self::decode(&bytes)?.text != self.text {
            return Err(TextError::AmbiguousEncoding { charset: target });
        }
        Ok(Some(self.with_charset(target)))
    }

    /// Splits the text into lines. There is always at least one line; a trailing
    /// line break yields a final empty line.
    pub fn lines(&self) -> Vec<TextLine> {
        let bytes = self.text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut idx = 0;
        while idx < bytes.len() {
            let width = match bytes[idx] {
                b'\n' => 1,
                b'\r' if bytes.get(idx + 1) == Some(&b'\n') => 2,
                b'\r' => 1,
                _ => {
                    idx += 1;
                    continue;
                }
            };
            lines.push(TextLine {
                start,
                end: idx,
                end_with_break: idx + width,
            });
            idx += width;
            start = idx;
        }
        lines.push(TextLine {
            start,
            end: bytes.len(),
            end_with_break: bytes.len(),
        });
        lines
    }

    pub fn ends_with_line_break(&self) -> bool {
        self.text.ends_with('\n') || self.text.ends_with('\r')
    }

    pub fn position_of(&self, offset: usize) -> LinePosition {
        let offset = offset.min(self.text.len());
        let before = &self.text.as_bytes()[..offset];
        let mut line = 1;
        let mut line_start = 0;
        let mut idx = 0;
        while idx < before.len() {
            match before[idx] {
                b'\n' => {
                    line += 1;
                    line_start = idx + 1;
                }
                b'\r' if before.get(idx + 1) != Some(&b'\n') => {
                    line += 1;
                    line_start = idx + 1;
                }
                _ => {}
            }
            idx += 1;
        }
        let character = self
            .text
            .get(line_start..offset)
            .map_or(0, |segment| segment.chars().count())
            + 1;
        LinePosition { line, character }
    }

    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.text.get(start..end)
    }

    /// Applies non-overlapping edits expressed against this text.
    pub fn apply_edits(&self, edits: &[TextEdit]) -> Result<Self, TextError> {
        let mut ordered: Vec<&TextEdit> = edits.iter().collect();
        ordered.sort_by_key(|edit| (edit.start, edit.end));
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for edit in ordered {
            if edit.start > edit.end || self.text.get(edit.start..edit.end).is_none() {
                return Err(TextError::InvalidSpan {
                    start: edit.start,
                    end: edit.end,
                });
            }
            if edit.start < cursor {
                return Err(TextError::OverlappingEdits { offset: edit.start });
            }
            out.push_str(&self.text[cursor..edit.start]);
            out.push_str(&edit.new_text);
            cursor = edit.end;
        }
        out.push_str(&self.text[cursor..]);
        Ok(Self::new(out, self.charset))
    }
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> Result<String, TextError> {
    if bytes.len() % 2 != 0 {
        return Err(TextError::TruncatedUtf16);
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| read([pair[0], pair[1]]))
        .collect::<Vec<_>>();
    let mut text = String::with_capacity(units.len());
    for (idx, decoded) in char::decode_utf16(units.iter().copied()).enumerate() {
        match decoded {
            Ok(ch) => text.push(ch),
            Err(_) => return Err(TextError::InvalidUtf16 { offset: idx * 2 }),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_mixed_breaks() {
        let text = SourceText::new("a\r\nb\nc\rd", Charset::Utf8);
        let raw = text.as_str();
        let breaks = text
            .lines()
            .iter()
            .map(|line| line.line_break(raw).to_string())
            .collect::<Vec<_>>();
        assert_eq!(breaks, vec!["\r\n", "\n", "\r", ""]);
    }

    #[test]
    fn trailing_break_yields_empty_last_line() {
        let text = SourceText::new("x\n", Charset::Utf8);
        let lines = text.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].start, lines[1].end);
    }

    #[test]
    fn decode_detects_byte_order_marks() {
        let utf8 = SourceText::decode(b"\xEF\xBB\xBFclass A {}").unwrap();
        assert_eq!(utf8.charset(), Charset::Utf8Bom);
        assert_eq!(utf8.as_str(), "class A {}");

        let utf16 = SourceText::decode(&[0xFF, 0xFE, b'h', 0, b'i', 0]).unwrap();
        assert_eq!(utf16.charset(), Charset::Utf16Le);
        assert_eq!(utf16.as_str(), "hi");

        let latin1 = SourceText::decode(&[b'c', 0xE9]).unwrap();
        assert_eq!(latin1.charset(), Charset::Latin1);
        assert_eq!(latin1.as_str(), "c\u{e9}");
    }

    #[test]
    fn decode_rejects_invalid_utf8_after_bom() {
        let err = SourceText::decode(b"\xEF\xBB\xBF// caf\xE9\nclass A {}\n").unwrap_err();
        assert_eq!(err, TextError::InvalidUtf8 { offset: 9 });
    }

    #[test]
    fn reencode_skips_identical_bytes() {
        let ascii = SourceText::decode(b"class A {}\n").unwrap();
        assert_eq!(ascii.charset(), Charset::Utf8);
        assert_eq!(ascii.reencode(Charset::Latin1).unwrap(), None);
        assert_eq!(ascii.reencode(Charset::Utf8).unwrap(), None);

        let bom = ascii.reencode(Charset::Utf8Bom).unwrap().unwrap();
        assert_eq!(bom.charset(), Charset::Utf8Bom);
        let reread = SourceText::decode(&bom.encode().unwrap()).unwrap();
        assert_eq!(reread.reencode(Charset::Utf8Bom).unwrap(), None);
    }

    #[test]
    fn reencode_to_latin1_reads_back_as_latin1() {
        let text = SourceText::new("// caf\u{e9}\n", Charset::Utf8);
        let latin1 = text.reencode(Charset::Latin1).unwrap().unwrap();
        let reread = SourceText::decode(&latin1.encode().unwrap()).unwrap();
        assert_eq!(reread.as_str(), text.as_str());
        assert_eq!(reread.reencode(Charset::Latin1).unwrap(), None);
    }

    #[test]
    fn reencode_refuses_bytes_that_decode_differently() {
        // As latin1 these two characters are the bytes C3 A9, which read back as utf-8.
        let text = SourceText::new("\u{c3}\u{a9}", Charset::Utf8);
        assert_eq!(
            text.reencode(Charset::Latin1).unwrap_err(),
            TextError::AmbiguousEncoding {
                charset: Charset::Latin1
            }
        );
    }

    #[test]
    fn encode_round_trips_through_bom() {
        let text = SourceText::new("\u{e9}t\u{e9}", Charset::Utf16Be);
        let bytes = text.encode().unwrap();
        assert_eq!(SourceText::decode(&bytes).unwrap(), text);
    }

    #[test]
    fn latin1_rejects_wide_characters() {
        let err = Charset::Latin1.encode("\u{3b1}").unwrap_err();
        assert!(matches!(err, TextError::Unrepresentable { code: 0x3b1, .. }));
    }

    #[test]
    fn apply_edits_sorts_and_rejects_overlap() {
        let text = SourceText::new("abcdef", Charset::Utf8);
        let applied = text
            .apply_edits(&[TextEdit::replace(4, 5, "E"), TextEdit::delete(0, 1)])
            .unwrap();
        assert_eq!(applied.as_str(), "bcdEf");

        let err = text
            .apply_edits(&[TextEdit::delete(0, 3), TextEdit::delete(2, 4)])
            .unwrap_err();
        assert_eq!(err, TextError::OverlappingEdits { offset: 2 });
    }

    #[test]
    fn position_counts_characters_not_bytes() {
        let text = SourceText::new("\u{e9}a\r\nxy", Charset::Utf8);
        assert_eq!(
            text.position_of(2),
            LinePosition {
                line: 1,
                character: 2
            }
        );
        assert_eq!(
            text.position_of(6),
            LinePosition {
                line: 2,
                character: 2
            }
        );
    }
}
