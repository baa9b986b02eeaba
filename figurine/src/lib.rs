//! # figurine: placeholder 3D-model generation service
//!
//! `figurine` sits between a frontend upload flow and blob storage. Clients
//! upload an image, then ask this service to act on it by task identifier.
//! Two operations are exposed:
//!
//! - `POST /v1/image` echoes the staged upload back to the caller, with a
//!   content type derived from its file extension.
//! - `POST /v1/model` synthesizes a fixed humanoid figure (sphere head,
//!   cylindrical torso, arms and legs, merged with hardcoded transforms),
//!   exports it as binary glTF, uploads it as `{taskId}.glb` and returns
//!   the artifact's public URL.
//!
//! The model generator is a deliberate placeholder: it performs no image
//! analysis and the uploaded bytes never influence the geometry, so the
//! same GLB is produced for every task. The upload is still staged and
//! verified, which keeps the request/response contract stable for when a
//! real reconstruction pipeline lands behind the same endpoint.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Storage is
//! abstracted behind [`storage::BlobStore`] with S3-compatible object
//! storage for deployments and a directory tree for development and tests.
//! A bounded existence poll absorbs upload visibility lag before the first
//! read. There is no database and no state beyond the two buckets.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use figurine::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = figurine::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     figurine::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod glb;
pub mod mesh;
pub mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{Router, middleware, routing::get, routing::post};
pub use config::Config;
use storage::BlobStore;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Bucket holding client uploads
    pub input: Arc<dyn BlobStore>,
    /// Bucket receiving generated models
    pub output: Arc<dyn BlobStore>,
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/v1/image", post(api::handlers::images::fetch_image))
        .route("/v1/model", post(api::handlers::meshes::make_model))
        .with_state(state)
        .merge(Scalar::with_url("/docs", openapi::ApiDoc::openapi()));

    router
        // CORS runs outside routing so preflights are answered for every path
        .layer(middleware::from_fn(api::cors::permissive_cors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The assembled application.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects the storage backends and
///    builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with storage connected.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        tracing::debug!("Starting figurine with configuration: {:#?}", config);

        let input = storage::connect(&config.storage, &config.input.bucket).await?;
        let output = storage::connect(&config.storage, &config.output.bucket).await?;

        let state = AppState {
            config: config.clone(),
            input,
            output,
        };
        let router = build_router(state);

        Ok(Self { router, config })
    }

    /// Start serving the application, stopping when `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "figurine listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutdown complete");
        Ok(())
    }
}
