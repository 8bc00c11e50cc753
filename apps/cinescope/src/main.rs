use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinescope::config::{Config, ProviderKind};
use cinescope::db::{self, queries};
use cinescope::services::{build_provider, ListKind, MovieProvider, Scheduler};
use cinescope::AppState;

#[derive(Parser)]
#[command(name = "cinescope", version, about = "Movie discovery site")]
struct Cli {
    /// Configuration file (TOML); environment variables still override it.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server and background jobs (default)
    Serve,
    /// Cache the top rated movies shown on the home page
    CacheTopRated {
        /// Refetch even when a cached list is still valid
        #[arg(long)]
        force: bool,
    },
    /// Warm the JSON API listing caches
    Prefetch {
        /// Number of pages per listing
        #[arg(long, default_value_t = 2)]
        pages: u32,
        #[arg(long, value_enum, default_value = "all")]
        kind: PrefetchKind,
    },
    /// Delete expired cache entries
    PurgeCache,
    /// Store an API key in the database
    AddKey {
        key: String,
        /// Outbound proxy used with this key
        #[arg(long)]
        proxy: Option<String>,
        /// Provider the key belongs to (defaults to the configured one)
        #[arg(long, value_enum)]
        service: Option<Service>,
    },
    /// Deactivate a stored API key
    RemoveKey {
        key: String,
        #[arg(long, value_enum)]
        service: Option<Service>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PrefetchKind {
    All,
    Popular,
    TopRated,
}

impl PrefetchKind {
    fn lists(self) -> Vec<ListKind> {
        match self {
            PrefetchKind::All => ListKind::ALL.to_vec(),
            PrefetchKind::Popular => vec![ListKind::Popular],
            PrefetchKind::TopRated => vec![ListKind::TopRated],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Service {
    Tmdb,
    Omdb,
}

impl From<Service> for ProviderKind {
    fn from(service: Service) -> Self {
        match service {
            Service::Tmdb => ProviderKind::Tmdb,
            Service::Omdb => ProviderKind::Omdb,
        }
    }
}

fn init_tracing() {
    // RUST_LOG environment variable controls log levels
    // Default: debug for our crate, info for axum, warn for dependencies
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("cinescope=debug,movie_metadata=debug,tower_http=debug,axum=info,warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    // Initialize tracing first so we can log configuration loading
    init_tracing();

    let cli = Cli::parse();

    let config = match Config::load_from(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            tracing::debug!("Server: {}:{}", cfg.server.host, cfg.server.port);
            tracing::debug!("Database: {:?}", cfg.database.path);
            tracing::debug!("Provider: {}", cfg.provider.kind);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command.unwrap_or(Command::Serve), config).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    // Ensure database directory exists
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }
    }

    let conn = db::init_db(&config.database.path).context("Failed to initialize database")?;
    tracing::info!("Database initialized at {:?}", config.database.path);

    match command {
        Command::AddKey {
            key,
            proxy,
            service,
        } => {
            let kind = service.map(ProviderKind::from).unwrap_or(config.provider.kind);
            let id = queries::insert_api_configuration(
                &conn,
                kind.service_name(),
                &key,
                proxy.as_deref(),
            )
            .context("Failed to store API key")?;
            tracing::info!(id = id, service = %kind, "API key stored");
            return Ok(());
        }
        Command::RemoveKey { key, service } => {
            let kind = service.map(ProviderKind::from).unwrap_or(config.provider.kind);
            let changed = queries::deactivate_api_configuration(&conn, kind.service_name(), &key)
                .context("Failed to deactivate API key")?;
            if changed == 0 {
                anyhow::bail!("No stored {} key matches", kind);
            }
            tracing::info!(service = %kind, "API key deactivated");
            return Ok(());
        }
        _ => {}
    }

    let provider = build_provider(&config, &conn).context("Failed to create movie provider")?;
    tracing::info!(provider = provider.name(), "Movie provider initialized");

    let state = AppState::new(config, Arc::new(Mutex::new(conn)), provider);

    match command {
        Command::Serve => serve(state).await,
        Command::CacheTopRated { force } => {
            let count = state
                .catalog
                .refresh_top_rated(force)
                .await
                .context("Failed to cache top rated movies")?;
            tracing::info!(count = count, "Top rated movies cached");
            Ok(())
        }
        Command::Prefetch { pages, kind } => {
            for list in kind.lists() {
                let fetched = state
                    .catalog
                    .prefetch(list, pages, Duration::from_secs(1))
                    .await
                    .with_context(|| format!("Failed to prefetch {} movies", list))?;
                tracing::info!(kind = %list, pages = fetched, "Prefetch completed");
            }
            Ok(())
        }
        Command::PurgeCache => {
            state
                .catalog
                .purge_expired()
                .await
                .context("Failed to purge cache")?;
            Ok(())
        }
        Command::AddKey { .. } | Command::RemoveKey { .. } => Ok(()),
    }
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let config = Arc::clone(&state.config);

    let scheduler = if config.scheduler.enabled {
        match Scheduler::new(&config.scheduler, state.job_context()).await {
            Ok(scheduler) => match scheduler.start().await {
                Ok(()) => {
                    tracing::info!("Scheduler started");
                    Some(scheduler)
                }
                Err(e) => {
                    tracing::error!("Failed to start scheduler: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::error!("Failed to create scheduler: {}", e);
                None
            }
        }
    } else {
        tracing::info!("Scheduler disabled");
        None
    };

    let app = cinescope::app(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Cinescope v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Failed to stop scheduler: {}", e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
