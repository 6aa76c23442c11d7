// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use discovery::{
    constants::{
        DEFAULT_CONTROLLER_NAME, DEFAULT_METRICS_BIND_ADDRESS, DEFAULT_RESYNC_SECS,
        ERROR_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS,
    },
    context::Context,
    controller::{error_policy, reconcile, service_mapper},
    crd::DuckType,
    events::{EventPublisher, KubeEventPublisher},
    lister::StoreServiceLister,
    metrics::gather_metrics,
    tracker::ReferenceTracker,
};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::{
    runtime::{reflector, watcher, Controller, WatchStreamExt},
    Api, Client,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// DuckType discovery controller
#[derive(Parser, Debug)]
#[command(name = "ducktype-controller", version, about)]
struct Args {
    /// Address serving /metrics and /healthz
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    metrics_addr: SocketAddr,

    /// Seconds between successful reconciliations of the same DuckType.
    /// Tracked references are leased for three resync intervals.
    #[arg(long, env = "RESYNC_SECS", default_value_t = DEFAULT_RESYNC_SECS)]
    resync_secs: u64,

    /// Seconds to wait before retrying a failed reconciliation
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = ERROR_REQUEUE_DURATION_SECS)]
    error_requeue_secs: u64,

    /// Name reported as the source of Kubernetes Events
    #[arg(long, env = "CONTROLLER_NAME", default_value = DEFAULT_CONTROLLER_NAME)]
    controller_name: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("ducktype-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

fn init_tracing() {
    // Respects RUST_LOG (default: info) and RUST_LOG_FORMAT (json|text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
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

async fn async_main(args: Args) -> Result<()> {
    init_tracing();

    info!("Starting DuckType discovery controller");
    debug!(?args, "Configuration loaded");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    // Service cache backing the lister
    let (service_store, service_writer) = reflector::store::<Service>();
    let service_reflector = watcher(Api::<Service>::all(client.clone()), watcher::Config::default())
        .default_backoff()
        .reflect(service_writer)
        .touched_objects()
        .for_each(|_| futures::future::ready(()));

    let services = StoreServiceLister::new(service_store);
    let sync_waiter = services.clone();
    tokio::spawn(async move {
        match sync_waiter.wait_until_synced().await {
            Ok(()) => info!("Service cache synced"),
            Err(e) => error!("Service cache failed to sync: {}", e),
        }
    });

    let resync = Duration::from_secs(args.resync_secs);
    let tracker = Arc::new(ReferenceTracker::for_resync(resync));
    let events: Arc<dyn EventPublisher> =
        Arc::new(KubeEventPublisher::new(client.clone(), &args.controller_name));

    let ctx = Arc::new(Context::new(
        client.clone(),
        services,
        tracker.clone(),
        events,
        Duration::from_secs(args.error_requeue_secs),
        resync,
    ));
    info!(
        cluster_domain = %ctx.reconciler.cluster_domain(),
        resync_secs = resync.as_secs(),
        lease_secs = tracker.lease().as_secs(),
        "DuckType controller configured"
    );

    tokio::select! {
        () = service_reflector => {
            error!("CRITICAL: Service reflector exited unexpectedly");
            anyhow::bail!("Service reflector exited unexpectedly")
        }
        result = serve_metrics(args.metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        () = run_ducktype_controller(client, tracker, ctx) => {
            info!("DuckType controller stopped");
            Ok(())
        }
    }
}

/// Run the `DuckType` controller until a shutdown signal is received
async fn run_ducktype_controller(client: Client, tracker: Arc<ReferenceTracker>, ctx: Arc<Context>) {
    info!("Starting DuckType controller");

    let ducktypes = Api::<DuckType>::all(client.clone());
    let services = Api::<Service>::all(client);

    Controller::new(ducktypes, watcher::Config::default())
        .watches(services, watcher::Config::default(), service_mapper(tracker))
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled {}", obj),
                Err(e) => warn!("Reconciliation failed: {}", e),
            }
        })
        .await;
}

/// Serve Prometheus metrics and a liveness endpoint
async fn serve_metrics(addr: SocketAddr) -> Result<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving metrics on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
