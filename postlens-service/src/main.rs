use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod error;
mod extraction;
mod suggest;

use crate::api::AppState;
use crate::config::StaticConfig;
use crate::extraction::Extractor;
use crate::suggest::SuggestionGenerator;

// Re-export config crate types to avoid namespace collision
use ::config::{Config as ConfigBuilder, Environment, File};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!(
        "Starting PostLens service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let static_config: StaticConfig = ConfigBuilder::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("POSTLENS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
        .map_err(|e| crate::error::ServiceError::Config {
            message: e.to_string(),
        })?;

    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        "Configuration loaded"
    );

    let extractor = Extractor::new(static_config.extraction.clone());
    let suggester = SuggestionGenerator::new(&static_config.genai)?;

    let state = Arc::new(AppState {
        extractor,
        suggester,
    });
    let app = api::router(state, &static_config);

    let addr = format!(
        "{}:{}",
        static_config.server.host, static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("postlens_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
