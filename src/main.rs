use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minion_store::config::Config;
use minion_store::db::{repository, Database, EntityKind};
use minion_store::api;

#[derive(Parser)]
#[command(name = "minion-store")]
#[command(about = "Parents and their minions over SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Delete stored records: one kind, or everything when no kind is given
    Purge {
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Parent,
    Minion,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Parent => EntityKind::Parent,
            KindArg::Minion => EntityKind::Minion,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "minion_store=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting minion-store with database {}", config.db_path.display());

    let db = Database::open_or_unavailable(config.db_path.clone());
    if !db.is_available() {
        tracing::warn!("Store unavailable, every request will be answered with an error");
    }
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("minion-store listening on http://{}", config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}

fn purge(db_path: PathBuf, kind: Option<EntityKind>) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    db.init_schema()?;

    let mut session = db.session()?;
    let removed = repository::remove(&mut session, kind, None)?;

    match kind {
        Some(kind) => println!("Removed {} {} record(s)", removed, kind),
        None => println!("Removed {} record(s)", removed),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env()?;

    match cli.command {
        Some(Commands::Serve { port, host, db }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            serve(config).await?;
        }
        Some(Commands::Purge { kind, db }) => {
            purge(db.unwrap_or(config.db_path), kind.map(Into::into))?;
        }
        None => {
            serve(config).await?;
        }
    }

    Ok(())
}
