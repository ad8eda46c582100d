use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pixel_pantry::{
    ArtworkStore,
    config::Config,
    server::router::{PantryState, pantry_router},
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        art_dir = %cfg.storage.art_dir.display(),
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        default_list_limit = cfg.storage.default_list_limit,
        max_list_limit = cfg.storage.max_list_limit,
        max_upload_bytes = cfg.storage.max_upload_bytes,
        cors_origins = ?cfg.cors.allow_origins
    );

    let db = pixel_pantry::db::spawn(&cfg.basic.database_url).await?;
    let store = ArtworkStore::open(db.clone(), &cfg.storage.art_dir)
        .await?
        .with_list_limits(cfg.storage.default_list_limit, cfg.storage.max_list_limit);

    // Runs to completion before the listener binds.
    if cfg.storage.reconcile_on_startup {
        match store.reconcile().await {
            Ok(report) if !report.is_clean() => {
                warn!(
                    orphan_files = report.orphan_files.len(),
                    missing_files = report.missing_files.len(),
                    "Artwork store drift detected at startup."
                );
            }
            Ok(_) => info!("Artwork store is consistent."),
            Err(e) => {
                warn!(error = %e, "Startup artwork reconcile failed.");
            }
        }
    }

    let state = PantryState::new(store);
    let app = pantry_router(state, &cfg);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = db.shutdown().await {
        error!(error = %e, "Failed to stop database actor cleanly.");
    }
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
