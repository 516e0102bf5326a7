//! `voxgate` binary - the composition root for the HTTP server.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voxgate_axum::{Cli, start_server};
use voxgate_core::InferenceSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let settings = InferenceSettings::from_env()?;

    start_server(cli.into_config(settings)).await
}
