// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use proxyrule_api::{
    api,
    config::{Args, LogFormat, StoreKind},
    constants::TOKIO_WORKER_THREADS,
    manager::RuleManager,
    store::{InMemoryStore, KubeStore, ObjectStore},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("proxyrule-api")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Format: timestamp file:line LEVEL message
    // Respects RUST_LOG if set, otherwise defaults to INFO level
    init_logging(args.log_format);

    info!("Starting ProxyRule API");
    debug!("Configuration: {:?}", args);

    let store = build_store(args.store).await?;
    let manager = Arc::new(RuleManager::new(store, args.namespace.clone()));
    let app = api::router(manager);

    let listener = tokio::net::TcpListener::bind(args.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", args.bind_address))?;

    info!(
        "Serving ProxyRules in namespace {} on {}",
        args.namespace, args.bind_address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("ProxyRule API stopped");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn build_store(kind: StoreKind) -> Result<Arc<dyn ObjectStore>> {
    match kind {
        StoreKind::Kubernetes => {
            debug!("Initializing Kubernetes client");
            let store = KubeStore::try_default()
                .await
                .context("failed to initialize Kubernetes client")?;
            debug!("Kubernetes client initialized successfully");
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("Using the in-memory store; rules are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
