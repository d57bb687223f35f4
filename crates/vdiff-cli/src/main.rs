//! vdiff CLI
//!
//! Command-line interface for variation tree diffs

use clap::{Parser, Subcommand, ValueEnum};
use vdiff_core::logging_facility::{init, Profile};

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "vdiff")]
#[command(about = "vdiff - Variation tree diffs of preprocessor annotated code", long_about = None)]
struct Cli {
    /// Log output format on stderr
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a diff and list its nodes
    Parse(commands::parse::ParseArgs),
    /// Parse a diff and check its invariants
    Check(commands::check::CheckArgs),
    /// Parse a diff and print it again
    Unparse(commands::unparse::UnparseArgs),
    /// Print the source before or after the edit
    Project(commands::project::ProjectArgs),
    /// Diff two source files by matching their variation trees
    Construct(commands::construct::ConstructArgs),
    /// Re-match the changed parts of a diff
    Refine(commands::refine::RefineArgs),
    /// Simplify a diff with transformers
    Transform(commands::transform::TransformArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Unparse(args) => commands::unparse::execute(args),
        Commands::Project(args) => commands::project::execute(args),
        Commands::Construct(args) => commands::construct::execute(args),
        Commands::Refine(args) => commands::refine::execute(args),
        Commands::Transform(args) => commands::transform::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
