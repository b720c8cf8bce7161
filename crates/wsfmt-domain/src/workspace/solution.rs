use std::sync::OnceLock;

use regex::Regex;

const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File";
const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SolutionProject {
    pub name: String,
    pub path: String,
}

fn project_line() -> Option<&'static Regex> {
    static LINE: OnceLock<Option<Regex>> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*Project\("\{([0-9A-Fa-f-]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{[0-9A-Fa-f-]+\}"\s*$"#,
        )
        .ok()
    })
    .as_ref()
}

/// Lists the project entries of a `.sln` file, skipping solution folders.
pub(super) fn parse_solution(contents: &str) -> Result<Vec<SolutionProject>, String> {
    let contents = contents.trim_start_matches('\u{feff}');
    if !contents
        .lines()
        .take(3)
        .any(|line| line.trim_start().starts_with(SOLUTION_HEADER))
    {
        return Err("missing solution file header".to_string());
    }
    let Some(line) = project_line() else {
        return Err("solution parser unavailable".to_string());
    };
    Ok(line
        .captures_iter(contents)
        .filter(|caps| !caps[1].eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE))
        .map(|caps| SolutionProject {
            name: caps[2].to_string(),
            path: caps[3].to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_projects_and_skips_folders() {
        let sln = "\u{feff}\r\nMicrosoft Visual Studio Solution File, Format Version 12.00\r\n\
# Visual Studio Version 17\r\n\
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"src\\App\\App.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\r\n\
EndProject\r\n\
Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"Solution Items\", \"Solution Items\", \"{22222222-2222-2222-2222-222222222222}\"\r\n\
EndProject\r\n\
Project(\"{F184B08F-C81C-45F6-A57F-5ABD9991F28F}\") = \"Legacy\", \"legacy\\Legacy.vbproj\", \"{33333333-3333-3333-3333-333333333333}\"\r\n\
EndProject\r\n";
        let projects = parse_solution(sln).unwrap();
        assert_eq!(
            projects,
            vec![
                SolutionProject {
                    name: "App".into(),
                    path: r"src\App\App.csproj".into()
                },
                SolutionProject {
                    name: "Legacy".into(),
                    path: r"legacy\Legacy.vbproj".into()
                },
            ]
        );
    }

    #[test]
    fn rejects_files_without_header() {
        assert!(parse_solution("Project(\"{X}\") = \"a\", \"b\", \"{C}\"").is_err());
    }
}
