mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    project::ProjectSubcommand, settings::SettingsSubcommand, user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stagewise",
    about = "Track project progress across weighted stages, tasks and shared headcount",
    version,
    propagate_version = true
)]
struct Cli {
    /// Tracker root (default: auto-detect from .stagewise/)
    #[arg(long, global = true, env = "STAGEWISE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .stagewise/ with a default config and a seeded data file
    Init,

    /// Run the HTTP API server until Ctrl-C
    Serve {
        /// Port to listen on (overrides config; 0 = OS-assigned)
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Portfolio dashboard: progress, schedule health and resources
    Status,

    /// Weekly status report
    Report {
        /// Any date in the wanted week (YYYY-MM-DD, default: this week)
        #[arg(long)]
        week: Option<String>,

        /// Write the text export to this file (or into this directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Inspect projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Company resource pool
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommand,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Report { week, output } => {
            cmd::report::run(&root, week.as_deref(), output.as_deref(), cli.json)
        }
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Settings { subcommand } => cmd::settings::run(&root, subcommand, cli.json),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
