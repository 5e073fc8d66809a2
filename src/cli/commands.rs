use crate::sort::TieBreak;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dependency-driven deployer ordering across lifecycle stages
#[derive(Parser, Debug)]
#[command(
    name = "deployorder",
    about = "Dependency-driven deployer ordering across lifecycle stages",
    version,
    author,
    long_about = "deployorder reads a manifest of deployers, each declaring the tokens it \
                  consumes and produces, and computes the order in which they run within \
                  every lifecycle stage. Producers run before modifiers, modifiers before \
                  consumers, and cycles are reported with the deployers involved."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Print the processing order of every stage",
        long_about = "Loads a deployer manifest and prints the order in which deployers run \
                      within each lifecycle stage.\n\n\
                      Examples:\n  \
                      deployorder plan deployers.yaml\n  \
                      deployorder plan deployers.json --format json\n  \
                      deployorder plan deployers.yaml --tie-break name\n  \
                      deployorder plan deployers.yaml --reverse"
    )]
    Plan(PlanArgs),

    #[command(
        about = "Validate a manifest and report dependency cycles",
        long_about = "Loads a deployer manifest and checks that every stage can be ordered. \
                      Exits with status 1 when a stage is unknown or a cycle exists.\n\n\
                      Examples:\n  \
                      deployorder check deployers.yaml"
    )]
    Check(CheckArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    #[arg(value_name = "MANIFEST", help = "Path to the deployer manifest (YAML or JSON)")]
    pub manifest: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 't',
        long,
        value_enum,
        help = "Secondary sort key after relative order (defaults to DEPLOYORDER_TIE_BREAK or registration)"
    )]
    pub tie_break: Option<TieBreakArg>,

    #[arg(short = 'r', long, help = "Print the undeploy order instead")]
    pub reverse: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[arg(value_name = "MANIFEST", help = "Path to the deployer manifest (YAML or JSON)")]
    pub manifest: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakArg {
    Registration,
    Name,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Registration => TieBreak::Registration,
            TieBreakArg::Name => TieBreak::Name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_plan_args() {
        let args = CliArgs::parse_from(["deployorder", "plan", "deployers.yaml"]);
        match args.command {
            Commands::Plan(plan_args) => {
                assert_eq!(plan_args.manifest, PathBuf::from("deployers.yaml"));
                assert_eq!(plan_args.format, OutputFormatArg::Human);
                assert!(plan_args.tie_break.is_none());
                assert!(!plan_args.reverse);
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_plan_with_options() {
        let args = CliArgs::parse_from([
            "deployorder",
            "plan",
            "deployers.json",
            "--format",
            "json",
            "--tie-break",
            "name",
            "--reverse",
        ]);

        match args.command {
            Commands::Plan(plan_args) => {
                assert_eq!(plan_args.format, OutputFormatArg::Json);
                assert_eq!(plan_args.tie_break, Some(TieBreakArg::Name));
                assert!(plan_args.reverse);
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_check_command() {
        let args = CliArgs::parse_from(["deployorder", "check", "deployers.yaml"]);
        assert!(matches!(args.command, Commands::Check(_)));
    }

    #[test]
    fn test_plan_requires_manifest() {
        assert!(CliArgs::try_parse_from(["deployorder", "plan"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["deployorder", "-v", "check", "m.yaml"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["deployorder", "check", "m.yaml", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["deployorder", "--log-level", "debug", "check", "m.yaml"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["deployorder", "-v", "-q", "check", "m.yaml"]).is_err());
    }

    #[test]
    fn test_tie_break_conversion() {
        assert_eq!(TieBreak::from(TieBreakArg::Name), TieBreak::Name);
        assert_eq!(
            TieBreak::from(TieBreakArg::Registration),
            TieBreak::Registration
        );
    }
}
