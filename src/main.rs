use clap::{Parser, Subcommand};
use neuroforge::store::JsonFileStore;
use std::path::PathBuf;
use std::process;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory for the session store.
    #[arg(global = true, long, default_value = "data/store")]
    store: PathBuf,

    /// Population baseline table (CSV: game_type,mean_latency_ms,std_latency_ms).
    #[arg(global = true, long, default_value = "data/baselines.csv")]
    baselines: PathBuf,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a full session with a scripted responder and persist it.
    Simulate(cmd::simulate::SimulateArgs),
    /// Show the normalized trait profile and career matches for a user.
    Profile(cmd::profile::ProfileArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    println!("\n🚀 Initializing NeuroForge Engine...");

    let baselines = if cli.baselines.exists() {
        Some(cli.baselines.as_path())
    } else {
        None
    };
    let mut store = match JsonFileStore::open(&cli.store, baselines) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Could not open session store at {:?}: {e}", cli.store);
            process::exit(1);
        }
    };
    if baselines.is_none() {
        eprintln!("⚠️  Baseline table {:?} not found; z-scores will be skipped.", cli.baselines);
    }

    match cli.command {
        Commands::Simulate(args) => cmd::simulate::run(args, &mut store),
        Commands::Profile(args) => cmd::profile::run(args, &mut store),
    }
}
