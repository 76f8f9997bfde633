use crate::config::QrConfig;
use crate::encoder::QrcodeEncoder;
use crate::traits::{QrEncoder, UiAssetProvider};
use std::sync::Arc;

/// Picks the UI asset provider selected at compile time.
pub fn create_frontend() -> Arc<dyn UiAssetProvider> {
    #[cfg(feature = "ui_disk")]
    {
        tracing::info!("💿 Frontend: Disk Provider selected (for local development)");
        Arc::new(crate::frontends::provider_disk::DiskFrontend::new())
    }
    #[cfg(not(feature = "ui_disk"))]
    {
        tracing::info!("📦 Frontend: Embed Provider selected");
        Arc::new(crate::frontends::provider_embed::EmbedFrontend::new())
    }
}

pub fn create_encoder(config: &QrConfig) -> Arc<dyn QrEncoder> {
    tracing::info!(
        "🔳 Encoder: qrcode, error correction {:?}",
        config.error_correction
    );
    Arc::new(QrcodeEncoder::new(config.error_correction))
}
