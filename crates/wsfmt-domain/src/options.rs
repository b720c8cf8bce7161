use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::text::Charset;

pub const INDENT_STYLE: &str = "indent_style";
pub const INDENT_SIZE: &str = "indent_size";
pub const TAB_WIDTH: &str = "tab_width";
pub const END_OF_LINE: &str = "end_of_line";
pub const CHARSET: &str = "charset";
pub const TRIM_TRAILING_WHITESPACE: &str = "trim_trailing_whitespace";
pub const INSERT_FINAL_NEWLINE: &str = "insert_final_newline";

const DEFAULT_INDENT_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Space,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentSize {
    Columns(usize),
    /// `indent_size = tab`: one indent level is one `tab_width`.
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
    Lf,
    Crlf,
    Cr,
}

impl EndOfLine {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lf" => Some(Self::Lf),
            "crlf" => Some(Self::Crlf),
            "cr" => Some(Self::Cr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lf => "lf",
            Self::Crlf => "crlf",
            Self::Cr => "cr",
        }
    }

    pub fn platform() -> Self {
        if cfg!(windows) {
            Self::Crlf
        } else {
            Self::Lf
        }
    }
}

/// Ordered key/value options. Keys are stored lower-cased; values keep their spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    values: IndexMap<String, String>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options every document gets when nothing else configures it.
    pub fn workspace_defaults() -> Self {
        let mut set = Self::new();
        set.set(INDENT_STYLE, "space");
        set.set(INDENT_SIZE, DEFAULT_INDENT_SIZE.to_string());
        set.set(TAB_WIDTH, DEFAULT_INDENT_SIZE.to_string());
        set.set(TRIM_TRAILING_WHITESPACE, "true");
        set.set(END_OF_LINE, EndOfLine::platform().name());
        set
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_ascii_lowercase(), value.into());
    }

    pub fn unset(&mut self, key: &str) {
        self.values.shift_remove(&key.to_ascii_lowercase());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `self` with every entry of `other` applied on top.
    #[must_use]
    pub fn overlay(&self, other: &OptionSet) -> OptionSet {
        let mut merged = self.clone();
        for (key, value) in other.iter() {
            merged.set(key, value);
        }
        merged
    }

    pub fn indent_style(&self) -> Option<IndentStyle> {
        match self.get(INDENT_STYLE)?.to_ascii_lowercase().as_str() {
            "space" => Some(IndentStyle::Space),
            "tab" => Some(IndentStyle::Tab),
            _ => None,
        }
    }

    pub fn indent_size(&self) -> Option<IndentSize> {
        let raw = self.get(INDENT_SIZE)?.trim().to_ascii_lowercase();
        if raw == "tab" {
            return Some(IndentSize::Tab);
        }
        raw.parse::<usize>()
            .ok()
            .filter(|size| *size > 0)
            .map(IndentSize::Columns)
    }

    pub fn tab_width(&self) -> Option<usize> {
        self.get(TAB_WIDTH)?
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|width| *width > 0)
    }

    pub fn end_of_line(&self) -> Option<EndOfLine> {
        self.get(END_OF_LINE).and_then(EndOfLine::parse)
    }

    pub fn charset(&self) -> Option<Charset> {
        self.get(CHARSET).and_then(Charset::from_editorconfig)
    }

    pub fn trim_trailing_whitespace(&self) -> Option<bool> {
        self.get(TRIM_TRAILING_WHITESPACE).and_then(parse_bool)
    }

    pub fn insert_final_newline(&self) -> Option<bool> {
        self.get(INSERT_FINAL_NEWLINE).and_then(parse_bool)
    }
}

impl FromIterator<(String, String)> for OptionSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.set(&key, value);
        }
        set
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let mut set = OptionSet::new();
        set.set("Indent_Style", "TAB");
        assert_eq!(set.indent_style(), Some(IndentStyle::Tab));
        assert!(set.contains("INDENT_STYLE"));
        set.unset("indent_style");
        assert!(set.is_empty());
    }

    #[test]
    fn typed_accessors_reject_garbage() {
        let set: OptionSet = [
            ("indent_size".to_string(), "zero".to_string()),
            ("end_of_line".to_string(), "CRLF".to_string()),
            ("insert_final_newline".to_string(), "maybe".to_string()),
            ("charset".to_string(), "utf-8-bom".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.indent_size(), None);
        assert_eq!(set.end_of_line(), Some(EndOfLine::Crlf));
        assert_eq!(set.insert_final_newline(), None);
        assert_eq!(set.charset(), Some(Charset::Utf8Bom));
    }

    #[test]
    fn overlay_prefers_the_upper_layer() {
        let base = OptionSet::workspace_defaults();
        let mut upper = OptionSet::new();
        upper.set(INDENT_SIZE, "tab");
        let merged = base.overlay(&upper);
        assert_eq!(merged.indent_size(), Some(IndentSize::Tab));
        assert_eq!(merged.indent_style(), Some(IndentStyle::Space));
    }
}
