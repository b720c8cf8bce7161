use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

pub const WSFMT_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nCommands:\n{subcommands}\n\nGlobal options:\n{options}\n";

pub const WSFMT_BEFORE_HELP: &str = concat!(
    "wsfmt ",
    env!("CARGO_PKG_VERSION"),
    " – Workspace style normalizer for C# and Visual Basic\n\n",
    "\x1b[1;36mCommands\x1b[0m\n",
    "  format           Fix whitespace, final newlines, line endings and charsets.\n",
    "  configs          Show which .editorconfig files apply to a path.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "wsfmt",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = WSFMT_BEFORE_HELP,
    help_template = WSFMT_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct WsfmtCli {
    #[arg(
        short,
        long,
        help = "Suppress human output and informational logs",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(
        long,
        value_enum,
        help = "Set the log level explicitly (overrides -q/-v)",
        global = true
    )]
    pub verbosity: Option<Verbosity>,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Format the files of a folder, project or solution",
        override_usage = "wsfmt format [WORKSPACE] [--folder] [--check|--dry-run]"
    )]
    Format(FormatArgs),
    #[command(about = "List the .editorconfig files that apply to a path")]
    Configs(ConfigsArgs),
}

#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct FormatArgs {
    #[arg(
        value_name = "WORKSPACE",
        help = "Folder, .sln or project file (defaults to the current directory)"
    )]
    pub workspace: Option<PathBuf>,
    #[arg(
        short = 'f',
        long,
        help = "Treat WORKSPACE as a plain folder of source files"
    )]
    pub folder: bool,
    #[arg(
        long,
        help = "Report files that need formatting and exit 2 without writing",
        conflicts_with = "dry_run"
    )]
    pub check: bool,
    #[arg(long, help = "Format in memory and report without writing")]
    pub dry_run: bool,
    #[arg(
        long,
        value_name = "GLOB",
        num_args = 1..,
        help = "Only format files matching these globs (relative to the workspace)"
    )]
    pub include: Vec<String>,
    #[arg(
        long,
        value_name = "GLOB",
        num_args = 1..,
        help = "Skip files matching these globs (relative to the workspace)"
    )]
    pub exclude: Vec<String>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Write a JSON report of the edits (a directory gets format-report.json)"
    )]
    pub report: Option<PathBuf>,
    #[arg(long, help = "Also format files recognized as generated code")]
    pub include_generated: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigsArgs {
    #[arg(
        value_name = "PATH",
        help = "File or directory to inspect (defaults to the current directory)"
    )]
    pub path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    #[value(alias = "q")]
    Quiet,
    #[value(alias = "m")]
    Minimal,
    #[value(alias = "n")]
    Normal,
    #[value(alias = "d")]
    Detailed,
    #[value(alias = "diag")]
    Diagnostic,
}

impl Verbosity {
    pub fn level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Minimal => "warn",
            Verbosity::Normal => "info",
            Verbosity::Detailed => "debug",
            Verbosity::Diagnostic => "trace",
        }
    }
}
