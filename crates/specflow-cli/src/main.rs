mod cmd;
mod output;
mod reporter;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "specflow",
    about = "Spec-driven workflow scaffolding — install slash commands, templates, and per-task command files",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .claude/ or .git/)
    #[arg(long, global = true, env = "SPECFLOW_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the .claude/ spec workflow into the current project
    Setup {
        /// Reset spec-config.json to defaults even if it exists
        #[arg(long)]
        force: bool,
    },

    /// Regenerate per-task command files from a spec's tasks.md
    Generate {
        /// Spec name (directory under .claude/specs/)
        spec_name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let reporter: &dyn reporter::Reporter = if cli.json {
        &reporter::QuietReporter
    } else {
        &reporter::ConsoleReporter
    };

    let result = match cli.command {
        Commands::Setup { force } => cmd::setup::run(&root, force, reporter),
        Commands::Generate { spec_name } => {
            cmd::generate::run(&root, &spec_name, cli.json, reporter)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
