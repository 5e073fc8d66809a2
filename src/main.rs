use deployorder::cli::commands::{CliArgs, Commands};
use deployorder::cli::handlers::{handle_check, handle_plan};
use deployorder::util::logging::{init_logging, parse_level, LoggingConfig};
use deployorder::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("deployorder v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Plan(plan_args) => handle_plan(plan_args),
        Commands::Check(check_args) => handle_check(check_args, args.quiet),
    };

    std::process::exit(exit_code);
}

/// Flags override the level from `DEPLOYORDER_LOG_LEVEL`; everything else
/// comes from the environment.
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}
