use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use camino::Utf8PathBuf as PathBuf;
use clap::Parser;
use eyre::{self, Context, Result};
use tokio::signal;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use trackbox::{
    app_state::{AppState, SharedState},
    routes,
};
use trackbox_core::{
    config::{self, Config, StorageConfig},
    core::{album_service::AlbumService, storage::Storage},
    model::repository::db,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file, configuration is read from the environment if omitted
    #[arg(short, long)]
    config: Option<String>,
    #[cfg(feature = "opentelemetry")]
    #[arg(long)]
    otel_endpoint: Option<String>,
}

/// Local upload directory to serve at `/uploads`, if the public URLs point there.
fn served_uploads_dir(config: &Config) -> Option<PathBuf> {
    match &config.storage {
        StorageConfig::Local(local) => {
            let base_url = local.public_base_url.as_deref()?;
            let path = match base_url.split_once("://") {
                Some((_scheme, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
                None => base_url,
            };
            path.starts_with("/uploads").then(|| local.root.clone())
        }
        StorageConfig::S3(_) => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1")
    }
    if std::env::var("RUST_SPANTRACE").is_err() {
        std::env::set_var("RUST_SPANTRACE", "1");
    }
    color_eyre::install()?;
    if std::env::var("TRACKBOX_LOG").is_err() {
        std::env::set_var("TRACKBOX_LOG", "info,tower_http=debug")
    }
    let tracing = tracing_subscriber::registry()
        .with(EnvFilter::from_env("TRACKBOX_LOG"))
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    #[cfg(feature = "opentelemetry")]
    {
        use opentelemetry_otlp::WithExportConfig;
        let telemetry = args
            .otel_endpoint
            .as_ref()
            .map(|otel_endpoint| -> Result<_> {
                let tracer = opentelemetry_otlp::new_pipeline()
                    .tracing()
                    .with_exporter(
                        opentelemetry_otlp::new_exporter()
                            .tonic()
                            .with_endpoint(otel_endpoint),
                    )
                    .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                        opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                            "trackbox",
                        )]),
                    ))
                    .install_batch(opentelemetry_sdk::runtime::Tokio)
                    .wrap_err("error setting up OpenTelemetry exporter")?;
                Ok(tracing_opentelemetry::layer().with_tracer(tracer))
            })
            .transpose()?;
        tracing.with(telemetry).init();
    }
    #[cfg(not(feature = "opentelemetry"))]
    {
        tracing.init();
    }

    let config = match &args.config {
        Some(path) => config::read_config(&PathBuf::from(path)).await?,
        None => config::config_from_env().wrap_err("error reading config from environment")?,
    };

    let addr: IpAddr = config
        .address
        .as_ref()
        .map(|a| a.parse().wrap_err("error parsing listening address"))
        .transpose()?
        .unwrap_or(IpAddr::from([127, 0, 0, 1]));
    let port = config.port.unwrap_or(3000);
    let max_upload_size =
        usize::try_from(config.max_upload_size).wrap_err("max_upload_size is too large")?;

    info!("Starting up...");
    if let Some(db_dir) = config.database.path.parent() {
        if !db_dir.as_str().is_empty() {
            tokio::fs::create_dir_all(db_dir)
                .await
                .wrap_err(format!("error creating database directory {}", db_dir))?;
        }
    }
    let pool = db::setup_db_pool(config.database.path.as_str()).await?;
    let storage = Storage::from_config(&config.storage).await;
    let shared_state: SharedState = Arc::new(AppState {
        albums: AlbumService::new(pool, storage),
    });

    let mut app = routes::app(shared_state, max_upload_size);
    if let Some(uploads_dir) = served_uploads_dir(&config) {
        info!("serving uploads from {}", uploads_dir);
        app = app.nest_service("/uploads", ServeDir::new(uploads_dir));
    }

    let listener = tokio::net::TcpListener::bind(SocketAddr::new(addr, port))
        .await
        .wrap_err("Error binding socket")?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("error running server")?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Unable to listen for shutdown signal: {}", err);
            std::process::exit(1);
        }
    }
}
