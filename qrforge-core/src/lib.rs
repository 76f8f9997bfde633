//! Core library for qrforge, a minimal QR code generator service with WiFi support.
//! This crate defines the core traits (the QR encoder seam and UI asset delivery),
//! the WiFi payload builder, request parameter validation, the PNG rasterizer
//! and the axum web server that ties them together.

pub mod config;
pub mod encoder;
pub mod factory;
pub mod frontends;
pub mod page;
pub mod params;
pub mod traits;
pub mod web_server;
pub mod wifi;

// Define a shared Error and Result type for the entire crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Parameter '{name}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Parameter '{name}' has an invalid value: '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    #[error("QR encoding failed: {0}")]
    Encoding(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Web server error: {0}")]
    WebServer(#[from] axum::BoxError),
}

impl Error {
    /// Whether the error was caused by the request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::OutOfRange { .. }
                | Error::InvalidParameter { .. }
                | Error::AssetNotFound(_)
        )
    }
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Builds the encoder and frontend, then serves HTTP until shutdown.
pub async fn run(config: config::AppConfig) -> Result<()> {
    tracing::info!("🚀 Starting qrforge v{}", env!("CARGO_PKG_VERSION"));

    let frontend = factory::create_frontend();
    let encoder = factory::create_encoder(&config.qr);

    web_server::start_web_server(config.server.bind_addr, encoder, frontend).await?
}
