//! Jobrec HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use jobrec::config::Config;
use jobrec::gateway::{HandlerState, create_router_with_state};
use jobrec::recommender::FileRecommender;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let recommender = Arc::new(FileRecommender::from_config(&config));

    if let Some(n) = preview_count()? {
        return print_preview(recommender, n).await;
    }

    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        pool = %config.pool_path.display(),
        model = %config.model_path.display(),
        "Jobrec starting"
    );

    let warm_target = Arc::clone(&recommender);
    match tokio::task::spawn_blocking(move || warm_target.warm()).await {
        Ok(Ok(())) => tracing::info!("Caches warm"),
        Ok(Err(e)) => tracing::warn!("Failed to warm caches: {}. Loading on first request.", e),
        Err(e) => tracing::warn!("Warm-up task failed: {}", e),
    }

    let app = create_router_with_state(HandlerState::new(recommender));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Jobrec shutdown complete");
    Ok(())
}

/// `--preview N` prints a random block of `N` records and exits.
fn preview_count() -> anyhow::Result<Option<usize>> {
    let mut args = std::env::args().skip_while(|arg| arg != "--preview");
    if args.next().is_none() {
        return Ok(None);
    }
    let n = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("--preview expects a count, got {raw:?}"))?,
        None => jobrec::constants::DEFAULT_TOP_N,
    };
    Ok(Some(n))
}

async fn print_preview(recommender: Arc<FileRecommender>, n: usize) -> anyhow::Result<()> {
    let records = tokio::task::spawn_blocking(move || recommender.random_block_job_objects(n))
        .await
        .context("preview task failed")??;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("JOBREC_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
