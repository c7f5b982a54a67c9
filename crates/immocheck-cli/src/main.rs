mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::tenant::TenantSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "immocheck",
    about = "ImmoCheck — tenant directory, maintenance diagnosis, and letter drafting",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .immocheck/ or .git/)
    #[arg(long, global = true, env = "IMMOCHECK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an ImmoCheck workspace in the current directory
    Init,

    /// Manage the tenant directory
    Tenant {
        #[command(subcommand)]
        subcommand: TenantSubcommand,
    },

    /// Re-read the directory from the configured sheet
    Refresh,

    /// Send a photo and note to the model and record its verdict
    Diagnose {
        /// Property (site) name
        #[arg(long)]
        property: String,
        /// Building within the property, for sites that have them
        #[arg(long)]
        building: Option<String>,
        /// Unit number, as text
        #[arg(long)]
        unit: String,
        /// Free-text description of the issue
        #[arg(long)]
        note: String,
        /// Path to a photo of the issue
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Also draft a letter of this kind (postal|email)
        #[arg(long)]
        letter: Option<String>,
    },

    /// Draft a letter or email from an already-known verdict
    Letter {
        /// Letter kind (postal|email)
        #[arg(long, default_value = "postal")]
        kind: String,
        #[arg(long)]
        property: String,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        unit: String,
        /// Occupant name (default: looked up in the directory)
        #[arg(long)]
        occupant: Option<String>,
        /// One-line issue summary
        #[arg(long)]
        issue: String,
        /// Liability category (occupant|owner|contractor|unclassified)
        #[arg(long)]
        liability: String,
    },

    /// Show recent diagnostic history
    History {
        /// Max entries to show, newest first
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Launch the web form
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Tenant { subcommand } => cmd::tenant::run(&root, subcommand, cli.json),
        Commands::Refresh => cmd::tenant::refresh(&root, cli.json),
        Commands::Diagnose {
            property,
            building,
            unit,
            note,
            photo,
            letter,
        } => cmd::diagnose::run(
            &root,
            cmd::diagnose::DiagnoseArgs {
                property,
                building,
                unit,
                note,
                photo,
                letter,
            },
            cli.json,
        ),
        Commands::Letter {
            kind,
            property,
            building,
            unit,
            occupant,
            issue,
            liability,
        } => cmd::letter::run(
            &root,
            cmd::letter::LetterArgs {
                kind,
                property,
                building,
                unit,
                occupant,
                issue,
                liability,
            },
            cli.json,
        ),
        Commands::History { limit } => cmd::history::run(&root, limit, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
