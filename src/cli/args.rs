use std::path::PathBuf;

use clap::{ArgAction, ColorChoice, Parser, ValueEnum};

/// How the final result set is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Plain,
    Json,
}

/// Command-line arguments accepted by the `pounce` binary.
#[derive(Parser, Debug)]
#[command(
    name = "pounce",
    version,
    about = "Incremental text and file search driven by ripgrep and fd",
    color = ColorChoice::Auto
)]
pub(crate) struct CliArgs {
    #[arg(value_name = "QUERY", help = "Pattern handed to the external search tool")]
    pub(crate) query: String,
    #[arg(
        value_name = "DIR",
        help = "Directories to search (default: current directory)"
    )]
    pub(crate) directories: Vec<PathBuf>,
    #[arg(
        short = 'f',
        long = "files",
        help = "Match file names with fd instead of line contents with rg"
    )]
    pub(crate) files: bool,
    #[arg(
        short,
        long = "config",
        value_name = "FILE",
        env = "POUNCE_CONFIG",
        action = ArgAction::Append,
        help = "Additional configuration file to merge (default: none)"
    )]
    pub(crate) config: Vec<PathBuf>,
    #[arg(
        short = 'n',
        long = "no-config",
        help = "Skip loading default configuration files (default: disabled)"
    )]
    pub(crate) no_config: bool,
    #[arg(
        long = "rg-path",
        value_name = "PATH",
        help = "Path to the ripgrep executable (default: rg on PATH)"
    )]
    pub(crate) rg_path: Option<PathBuf>,
    #[arg(
        long = "fd-path",
        value_name = "PATH",
        help = "Path to the fd executable (default: fd on PATH)"
    )]
    pub(crate) fd_path: Option<PathBuf>,
    #[arg(
        short = 'C',
        long = "context",
        value_name = "NUM",
        help = "Context lines around a previewed hit, 0-100 (default: 20)"
    )]
    pub(crate) context: Option<usize>,
    #[arg(
        long = "preview",
        help = "Print an excerpt around the first hit (default: disabled)"
    )]
    pub(crate) preview: bool,
    #[arg(
        long = "open",
        help = "Open the first hit in $VISUAL/$EDITOR (default: disabled)"
    )]
    pub(crate) open: bool,
    #[arg(
        short = 'p',
        long = "print-config",
        help = "Print the resolved configuration before running (default: disabled)"
    )]
    pub(crate) print_config: bool,
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t = OutputFormat::Plain,
        help = "Choose how to print the result"
    )]
    pub(crate) output: OutputFormat,
}

/// Parse process arguments, exiting with clap's usage output on error.
pub(crate) fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_and_directories_are_positional() {
        let cli = CliArgs::parse_from(["pounce", "needle", "/a", "/b"]);
        assert_eq!(cli.query, "needle");
        assert_eq!(cli.directories.len(), 2);
        assert!(!cli.files);
    }

    #[test]
    fn files_flag_selects_file_mode() {
        let cli = CliArgs::parse_from(["pounce", "--files", "readme"]);
        assert!(cli.files);
        assert!(cli.directories.is_empty());
    }

    #[test]
    fn tool_paths_and_context_are_optional_overrides() {
        let cli = CliArgs::parse_from([
            "pounce",
            "--rg-path",
            "/opt/rg",
            "--context",
            "5",
            "needle",
        ]);
        assert_eq!(cli.rg_path.as_deref(), Some(std::path::Path::new("/opt/rg")));
        assert_eq!(cli.context, Some(5));
    }
}
