//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Planwright: generate Playwright tests from human-written test plans
#[derive(Parser, Debug)]
#[command(name = "planwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only failures are printed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Generator configuration file (.toml, .yaml or .yml)
    #[arg(long, global = true, env = "PLANWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run plan scenarios and write page objects and test files
    Generate(GenerateArgs),

    /// Parse a plan and plan its scenarios without running them
    Validate(ValidateArgs),

    /// List library pages or show one page definition
    Pages(PagesArgs),
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Plan file (markdown, or YAML with a .yaml/.yml extension)
    pub plan: PathBuf,

    /// Scenario selector: `*`, `Group/*`, `Group/Scenario`, `Scenario` or `1.2`
    #[arg(short, long, default_value = "*")]
    pub scenario: String,

    /// Workspace root holding the pages and tests directories
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Use the offline engine where every action succeeds
    #[arg(long)]
    pub offline: bool,

    /// Number of scenarios to run at once (0 = sequential)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Replace existing test files
    #[arg(long)]
    pub overwrite: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Plan file
    pub plan: PathBuf,

    /// Scenario selector
    #[arg(short, long, default_value = "*")]
    pub scenario: String,
}

/// Arguments for the pages command
#[derive(Parser, Debug)]
pub struct PagesArgs {
    /// Page to show; lists every page when omitted
    pub name: Option<String>,

    /// Workspace root
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Print the definition as JSON
    #[arg(long)]
    pub json: bool,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_generate_defaults() {
            let cli = Cli::parse_from(["planwright", "generate", "plan.md"]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected Generate command");
            };
            assert_eq!(args.plan, PathBuf::from("plan.md"));
            assert_eq!(args.scenario, "*");
            assert_eq!(args.root, PathBuf::from("."));
            assert!(!args.offline);
            assert_eq!(args.jobs, None);
        }

        #[test]
        fn test_parse_generate_options() {
            let cli = Cli::parse_from([
                "planwright",
                "generate",
                "plan.md",
                "--scenario",
                "Authentication/*",
                "--root",
                "e2e",
                "--offline",
                "-j",
                "4",
            ]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected Generate command");
            };
            assert_eq!(args.scenario, "Authentication/*");
            assert_eq!(args.root, PathBuf::from("e2e"));
            assert!(args.offline);
            assert_eq!(args.jobs, Some(4));
        }

        #[test]
        fn test_parse_validate() {
            let cli = Cli::parse_from(["planwright", "validate", "plan.md", "-s", "1.2"]);
            let Commands::Validate(args) = cli.command else {
                panic!("expected Validate command");
            };
            assert_eq!(args.scenario, "1.2");
        }

        #[test]
        fn test_parse_pages() {
            let cli = Cli::parse_from(["planwright", "pages", "LoginPage", "--json"]);
            let Commands::Pages(args) = cli.command else {
                panic!("expected Pages command");
            };
            assert_eq!(args.name.as_deref(), Some("LoginPage"));
            assert!(args.json);
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from([
                "planwright",
                "pages",
                "-vv",
                "--color",
                "never",
                "--config",
                "planwright.toml",
            ]);
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.color, ColorArg::Never));
            assert_eq!(cli.config, Some(PathBuf::from("planwright.toml")));
        }

        #[test]
        fn test_missing_plan_is_error() {
            assert!(Cli::try_parse_from(["planwright", "generate"]).is_err());
        }
    }

    mod color_arg_tests {
        use super::*;
        use crate::config::ColorChoice;

        #[test]
        fn test_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        }
    }
}
