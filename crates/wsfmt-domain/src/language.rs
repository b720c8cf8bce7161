use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

/// Language tag of a project. Only C# and Visual Basic projects are formatted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    CSharp,
    VisualBasic,
    FSharp,
    Other(String),
}

impl Language {
    pub fn from_project_path(path: &Path) -> Self {
        let ext = extension(path);
        match ext.as_str() {
            "csproj" => Self::CSharp,
            "vbproj" => Self::VisualBasic,
            "fsproj" => Self::FSharp,
            _ => Self::Other(ext),
        }
    }

    pub fn from_source_path(path: &Path) -> Option<Self> {
        match extension(path).as_str() {
            "cs" => Some(Self::CSharp),
            "vb" => Some(Self::VisualBasic),
            "fs" | "fsi" | "fsx" => Some(Self::FSharp),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::CSharp | Self::VisualBasic)
    }

    /// Extensions picked up by default compile globs.
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::CSharp => &["cs"],
            Self::VisualBasic => &["vb"],
            Self::FSharp => &["fs", "fsi"],
            Self::Other(_) => &[],
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CSharp => "C#",
            Self::VisualBasic => "Visual Basic",
            Self::FSharp => "F#",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_extensions_map_to_languages() {
        assert_eq!(
            Language::from_project_path(Path::new("App.CSPROJ")),
            Language::CSharp
        );
        assert_eq!(
            Language::from_project_path(Path::new("Lib.fsproj")),
            Language::FSharp
        );
        assert_eq!(
            Language::from_project_path(Path::new("Native.vcxproj")),
            Language::Other("vcxproj".to_string())
        );
    }

    #[test]
    fn only_csharp_and_visual_basic_are_supported() {
        assert!(Language::CSharp.is_supported());
        assert!(Language::VisualBasic.is_supported());
        assert!(!Language::FSharp.is_supported());
        assert!(!Language::Other("sqlproj".into()).is_supported());
    }
}
