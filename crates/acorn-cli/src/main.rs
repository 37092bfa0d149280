//! CLI frontend for the acorn scene runtime.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "acorn",
    about = "acorn: a declarative scene and entity runtime",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scene file and report diagnostics
    Check {
        /// Scene file to validate
        file: PathBuf,

        /// Fail on the first syntax violation instead of collecting
        #[arg(short, long)]
        strict: bool,
    },

    /// Rewrite a scene file in canonical layout
    Fmt {
        /// Scene file to format
        file: PathBuf,

        /// Emit JSON instead of the text format
        #[arg(long)]
        json: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the model built from a scene file
    Inspect {
        /// Scene file to build
        file: PathBuf,

        /// Show one model entry in detail
        name: Option<String>,
    },

    /// Build a scene, run it for a number of frames, and print the
    /// scene it saves back
    Run {
        /// Scene file to build
        file: PathBuf,

        /// Number of frames to run
        #[arg(short, long, default_value = "1")]
        frames: u64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file, strict } => commands::check::run(&file, strict),
        Commands::Fmt { file, json, output } => commands::fmt::run(&file, json, output.as_deref()),
        Commands::Inspect { file, name } => commands::inspect::run(&file, name.as_deref()),
        Commands::Run { file, frames } => commands::run::run(&file, frames),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
