use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{debug, info};

use notekeep::{
    App, AuthProvider, Commands, Config, LocalAuth, LocalSnapshotStore, NoteStore,
    PersistenceAdapter, RemoteStore, Result,
};

/// Tagged Markdown notes from the command line
#[derive(Parser)]
#[clap(name = "notekeep", version, about)]
struct Cli {
    /// Override the data directory holding the local snapshot
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Endpoint of the AI rewrite proxy
    #[clap(long, global = true)]
    rewrite_url: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

fn initialize_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();
}

#[tokio::main]
async fn main() {
    initialize_logger();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::default();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(url) = cli
        .rewrite_url
        .or_else(|| std::env::var("NOTEKEEP_REWRITE_URL").ok())
    {
        config.rewrite_endpoint = Some(url);
    }
    debug!("Using data dir {}", config.data_dir.display());

    // The remote backend and the local snapshot are mutually exclusive;
    // without remote settings the CLI runs fully offline with an implicit
    // single-user session.
    let (adapter, auth): (Arc<dyn PersistenceAdapter>, Arc<dyn AuthProvider>) =
        match &config.remote {
            Some(remote) => {
                info!("Using remote backend at {}", remote.base_url);
                (
                    Arc::new(RemoteStore::new(&remote.base_url, &remote.api_key)?),
                    Arc::new(LocalAuth::signed_in("local", "local@notekeep")),
                )
            }
            None => (
                Arc::new(LocalSnapshotStore::new(config.snapshot_path())),
                Arc::new(LocalAuth::signed_in("local", "local@notekeep")),
            ),
        };

    let store = NoteStore::new(adapter, auth);
    let mut app = App::new(store, config);
    app.run(cli.command).await
}
