use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use summerjob_db::{DbConfig, SqliteDatabase};
use summerjob_store::StoreConfig;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "summerjob-server", about = "SummerJob backend API server")]
struct Cli {
    /// Address to bind to
    #[arg(long, env = "SUMMERJOB_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, env = "SUMMERJOB_PORT", default_value_t = 4000)]
    port: u16,

    /// SQLite database file (defaults to the data directory)
    #[arg(long, env = "SUMMERJOB_DB")]
    database: Option<String>,

    /// Upload directory, relative to the parent of the working directory
    #[arg(long, env = "UPLOAD_DIR")]
    upload_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let db = SqliteDatabase::open(&DbConfig {
        sqlite_path: cli.database,
    })?;
    let store_config = StoreConfig {
        upload_dir: cli.upload_dir,
        root: None,
    };
    info!("upload root: {}", store_config.upload_root().display());
    let store = summerjob_store::create_store(&store_config);

    let addr = SocketAddr::new(cli.bind.parse()?, cli.port);
    let listener = TcpListener::bind(addr).await?;
    info!("summerjob-server listening on http://{addr}");

    let state = summerjob_server::app_state(Arc::new(db), store);
    summerjob_server::serve(listener, state).await
}
