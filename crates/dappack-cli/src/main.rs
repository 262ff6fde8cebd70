//! dappack - on-demand dapp container launcher

mod commands;

use clap::{Parser, Subcommand};
use dappack_config::GlobalConfig;
use dappack_core::LifecycleManager;
use dappack_runtime::connect_runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dappack")]
#[command(author, version, about = "On-demand dapp container launcher", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dapps available in the descriptor registry
    List {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the status and service URL of a dapp
    Status {
        /// Dapp uid
        uid: String,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the descriptor of a dapp
    Show {
        /// Dapp uid
        uid: String,
    },

    /// Build (if needed) and run a dapp, printing its service URL
    Run {
        /// Dapp uid
        uid: String,
        /// Rebuild the image even if one already exists
        #[arg(long)]
        reset: bool,
    },

    /// Stop a running dapp
    Stop {
        /// Dapp uid
        uid: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; results go to stdout, diagnostics to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = GlobalConfig::load().unwrap_or_default();

    let runtime = connect_runtime(&config).await.map_err(|e| {
        anyhow::anyhow!(
            "Cannot connect to the container runtime at {}: {}",
            config.runtime.socket,
            e
        )
    })?;
    let manager = LifecycleManager::new(runtime, config)?;

    match cli.command {
        Commands::List { json } => commands::list(&manager, json).await?,
        Commands::Status { uid, json } => commands::status(&manager, &uid, json).await?,
        Commands::Show { uid } => commands::show(&manager, &uid).await?,
        Commands::Run { uid, reset } => commands::run(&manager, &uid, reset).await?,
        Commands::Stop { uid } => commands::stop(&manager, &uid).await?,
    }

    Ok(())
}
