mod cmd;
mod output;

use checklist_core::store::Store;
use clap::{Parser, Subcommand};
use cmd::{
    enh::EnhSubcommand, run::RunSubcommand, sop::SopSubcommand, step::StepSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chk",
    about = "Interactive SOP checklist runner — steps, run history, and build-log reports",
    version,
    propagate_version = true
)]
struct Cli {
    /// Store directory for saved checklists (default: ~/.sop-checklists)
    #[arg(long, global = true, env = "CHK_ROOT")]
    root: Option<PathBuf>,

    /// SOP id selecting which saved checklist to operate on
    #[arg(long, global = true, default_value = "")]
    sop: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and save a fresh checklist
    Init {
        #[arg(long)]
        name: Option<String>,
        /// SOP id; also the persistence namespace key
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        entity: Option<String>,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        web_root: Option<String>,
        #[arg(long)]
        run_label: Option<String>,
        #[arg(long)]
        img_folder: Option<String>,
        #[arg(long)]
        template_tag: Option<String>,
    },

    /// Show or edit the checklist header
    Sop {
        #[command(subcommand)]
        subcommand: SopSubcommand,
    },

    /// Manage checklist steps
    Step {
        #[command(subcommand)]
        subcommand: StepSubcommand,
    },

    /// Record run/redo attempts on a step
    Run {
        #[command(subcommand)]
        subcommand: RunSubcommand,
    },

    /// Manage the enhancement log
    Enh {
        #[command(subcommand)]
        subcommand: EnhSubcommand,
    },

    /// Generate the flattened build-log report
    Report {
        /// Write to a file (or into a directory using the build-log filename)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export the checklist as a portable JSON snapshot
    Export {
        /// Write to a file (or into a directory using the snapshot filename)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the checklist from an exported snapshot
    Import { file: PathBuf },
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

    let result = open_store(cli.root.as_deref()).and_then(|store| match cli.command {
        Commands::Init {
            name,
            id,
            entity,
            repo,
            web_root,
            run_label,
            img_folder,
            template_tag,
        } => cmd::init::run(
            store,
            checklist_core::sop::SopPatch {
                name,
                id,
                entity,
                repo,
                web_root,
                run_label,
                img_folder,
                template_tag,
            },
            cli.json,
        ),
        Commands::Sop { subcommand } => cmd::sop::run(store, &cli.sop, subcommand, cli.json),
        Commands::Step { subcommand } => cmd::step::run(store, &cli.sop, subcommand, cli.json),
        Commands::Run { subcommand } => cmd::run::run(store, &cli.sop, subcommand, cli.json),
        Commands::Enh { subcommand } => cmd::enh::run(store, &cli.sop, subcommand, cli.json),
        Commands::Report { out } => cmd::snapshot::report(store, &cli.sop, out.as_deref()),
        Commands::Export { out } => cmd::snapshot::export(store, &cli.sop, out.as_deref()),
        Commands::Import { file } => cmd::snapshot::import(store, &cli.sop, &file, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn open_store(root: Option<&std::path::Path>) -> anyhow::Result<Store> {
    match root {
        Some(path) => Ok(Store::open(path)),
        None => Ok(Store::open_default()?),
    }
}
