use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use std::sync::OnceLock;

const MAX_RANGE_EXPANSION: i64 = 1000;

fn numeric_range() -> Option<&'static Regex> {
    static RANGE: OnceLock<Option<Regex>> = OnceLock::new();
    RANGE
        .get_or_init(|| Regex::new(r"\{(-?\d+)\.\.(-?\d+)\}").ok())
        .as_ref()
}

/// Compiles an editorconfig section name into a matcher over slash-separated paths
/// relative to the `.editorconfig` directory.
pub(super) fn compile_section(section: &str) -> Option<GlobMatcher> {
    let pattern = anchor(section);
    let pattern = expand_numeric_ranges(&pattern);
    GlobBuilder::new(&pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .ok()
        .map(|glob| glob.compile_matcher())
}

fn anchor(section: &str) -> String {
    if let Some(stripped) = section.strip_prefix('/') {
        stripped.to_string()
    } else if section.contains('/') {
        section.to_string()
    } else {
        format!("**/{section}")
    }
}

fn expand_numeric_ranges(pattern: &str) -> String {
    let Some(range) = numeric_range() else {
        return pattern.to_string();
    };
    range
        .replace_all(pattern, |caps: &regex::Captures<'_>| {
            let (Ok(a), Ok(b)) = (caps[1].parse::<i64>(), caps[2].parse::<i64>()) else {
                return caps[0].to_string();
            };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if hi - lo >= MAX_RANGE_EXPANSION {
                return caps[0].to_string();
            }
            let items = (lo..=hi).map(|n| n.to_string()).collect::<Vec<_>>();
            format!("{{{}}}", items.join(","))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(section: &str, path: &str) -> bool {
        compile_section(section).is_some_and(|m| m.is_match(path))
    }

    #[test]
    fn bare_patterns_match_at_any_depth() {
        assert!(matches("*.cs", "Program.cs"));
        assert!(matches("*.cs", "src/deep/Program.cs"));
        assert!(!matches("*.cs", "src/Program.vb"));
        assert!(matches("*", "a/b/c.txt"));
    }

    #[test]
    fn slash_patterns_are_anchored() {
        assert!(matches("src/*.cs", "src/A.cs"));
        assert!(!matches("src/*.cs", "src/sub/A.cs"));
        assert!(!matches("src/*.cs", "other/src/A.cs"));
        assert!(matches("/lib/**/*.cs", "lib/x/y/A.cs"));
    }

    #[test]
    fn braces_and_numeric_ranges() {
        assert!(matches("*.{cs,vb}", "x/A.vb"));
        assert!(matches("file{1..3}.cs", "file2.cs"));
        assert!(!matches("file{1..3}.cs", "file4.cs"));
    }
}
