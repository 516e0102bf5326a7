//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use voxgate_core::{
    AudioDecoder, ConcurrencyGate, InferenceSettings, SpeechDeps, SpeechGenerator, SpeechService,
    StatusBus, StreamConfig, validate_settings,
};
use voxgate_runtime::{CommandGenerator, CommandSpec, FallbackDecoder, WavEncoder};

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Concurrency, timeout and streaming limits.
    pub settings: InferenceSettings,
    /// Command that hosts the speech model.
    pub generator: CommandSpec,
}

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8000;

    /// Create config with default address, CORS and inference settings.
    pub fn new(generator: CommandSpec) -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            cors: CorsConfig::default(),
            settings: InferenceSettings::default(),
            generator,
        }
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: InferenceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
///
/// Holds the initialized services shared by every handler.
pub struct AxumContext {
    /// Blocking and streaming generation.
    pub speech: SpeechService,
    /// Process-wide status broadcaster.
    pub status: StatusBus,
    /// Decoder for uploaded reference clips.
    pub decoder: Arc<dyn AudioDecoder>,
}

impl AxumContext {
    /// Assemble the context around an already-built generator.
    pub fn new(
        settings: &InferenceSettings,
        status: StatusBus,
        generator: Arc<dyn SpeechGenerator>,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Self {
        let speech = SpeechService::new(SpeechDeps {
            gate: ConcurrencyGate::from_settings(settings),
            generator,
            encoder: Arc::new(WavEncoder::default()),
            status: Arc::new(status.clone()),
            stream: StreamConfig::from_settings(settings),
        });

        Self {
            speech,
            status,
            decoder,
        }
    }
}

/// Bootstrap the Axum server with all services.
///
/// Must run inside a tokio runtime: it starts the status dispatcher that
/// carries generator progress from worker threads onto the bus.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    validate_settings(&config.settings)?;

    let status = StatusBus::new(config.settings.status_keepalive);
    status.spawn_dispatcher();

    let generator = Arc::new(CommandGenerator::new(
        config.generator.clone(),
        Arc::new(status.publisher()),
    ));

    info!(
        generator = %config.generator.program.display(),
        max_concurrency = config.settings.max_concurrency,
        request_timeout_s = config.settings.request_timeout.map(|t| t.as_secs()),
        stream_request_timeout_s = config.settings.stream_request_timeout.map(|t| t.as_secs()),
        stream_segment_chars = config.settings.stream_segment_chars,
        "Axum bootstrap complete"
    );

    Ok(AxumContext::new(
        &config.settings,
        status,
        generator,
        Arc::new(FallbackDecoder::default()),
    ))
}

/// Start the web server and run until Ctrl-C.
///
/// Shutdown closes the status bus so open status streams end and the
/// server can drain.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config)?;
    let status = ctx.status.clone();
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("voxgate listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(status))
        .await?;
    Ok(())
}

async fn shutdown_signal(status: StatusBus) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
    status.close();
}
