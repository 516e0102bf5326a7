//! Command-line interface for the `voxgate` binary.

use std::path::PathBuf;

use clap::Parser;
use voxgate_core::InferenceSettings;
use voxgate_runtime::CommandSpec;

use crate::bootstrap::ServerConfig;

/// Serve text-to-speech generation over HTTP.
///
/// Inference limits come from the environment (`MAX_CONCURRENCY`,
/// `REQUEST_TIMEOUT_S`, `STREAM_REQUEST_TIMEOUT_S`, `STREAM_SEGMENT_CHARS`,
/// `STATUS_KEEPALIVE_S`); a `.env` file is honoured.
#[derive(Parser, Debug)]
#[command(name = "voxgate", version, about)]
pub struct Cli {
    /// Interface to bind
    #[arg(long, default_value = ServerConfig::DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = ServerConfig::DEFAULT_PORT)]
    pub port: u16,

    /// Allowed CORS origin (repeatable); all origins are allowed when omitted
    #[arg(long = "allow-origin")]
    pub allow_origins: Vec<String>,

    /// Program that hosts the speech model
    #[arg(long, env = "GENERATOR_CMD")]
    pub generator: PathBuf,

    /// Argument passed to the generator program (repeatable)
    #[arg(long = "generator-arg", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,
}

impl Cli {
    /// Combine the parsed flags with inference settings.
    pub fn into_config(self, settings: InferenceSettings) -> ServerConfig {
        let mut config = ServerConfig::new(
            CommandSpec::new(self.generator).with_args(self.generator_args),
        )
        .with_settings(settings);
        config.host = self.host;
        config.port = self.port;
        if !self.allow_origins.is_empty() {
            config = config.with_allowed_origins(self.allow_origins);
        }
        config
    }
}
