use crate::syntax::SyntaxTree;

const GENERATED_FILE_PREFIX: &str = "temporarygeneratedfile_";
const GENERATED_STEM_SUFFIXES: &[&str] = &[".designer", ".generated", ".g", ".g.i"];
const GENERATED_MARKERS: &[&str] = &["<autogenerated", "<auto-generated"];

/// Heuristic generated-code check: tool-produced file names, or an
/// `<auto-generated>` marker in the file's leading comments.
pub fn is_generated_code(tree: &SyntaxTree) -> bool {
    has_generated_name(tree) || has_generated_header(tree)
}

fn has_generated_name(tree: &SyntaxTree) -> bool {
    let Some(name) = tree.path().file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    if name.starts_with(GENERATED_FILE_PREFIX) {
        return true;
    }
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name.as_str(),
    };
    GENERATED_STEM_SUFFIXES
        .iter()
        .any(|suffix| stem.ends_with(suffix))
}

fn has_generated_header(tree: &SyntaxTree) -> bool {
    let comments = tree.leading_comments().to_ascii_lowercase();
    GENERATED_MARKERS
        .iter()
        .any(|marker| comments.contains(marker))
}
