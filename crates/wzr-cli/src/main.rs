use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "wzr")]
#[command(about = "Wizard step reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one step of a raw record into its canonical view
    Hydrate {
        /// Layered schema config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Step id
        #[arg(long)]
        step: String,

        /// Raw record JSON file
        #[arg(long)]
        record: String,

        /// JSON file holding an array of currently valid identifiers
        #[arg(long)]
        refs: String,
    },

    /// Build the patch envelope for one edited step
    Persist {
        /// Layered schema config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Step id
        #[arg(long)]
        step: String,

        /// Edited step view JSON file
        #[arg(long)]
        view: String,

        /// Previous envelope JSON file to fold onto
        #[arg(long)]
        accumulator: Option<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlays...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_tracing() {
    // stdout carries JSON results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Hydrate {
            config_paths,
            step,
            record,
            refs,
        } => {
            let out = commands::hydrate::run(&config_paths, &step, &record, &refs)?;
            println!("{out}");
        }

        Commands::Persist {
            config_paths,
            step,
            view,
            accumulator,
        } => {
            let out = commands::persist::run(&config_paths, &step, &view, accumulator.as_deref())?;
            println!("{out}");
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = wzr_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}
