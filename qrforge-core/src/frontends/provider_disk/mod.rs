use crate::traits::UiAssetProvider;
use crate::{Error, Result};
use async_trait::async_trait;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

const UI_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../ui");

/// A UI asset provider that reads files directly from disk.
pub struct DiskFrontend {
    root: PathBuf,
}

impl DiskFrontend {
    pub fn new() -> Self {
        Self::with_root(UI_DIR)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for DiskFrontend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UiAssetProvider for DiskFrontend {
    async fn get_asset(&self, path: &str) -> Result<(Cow<'static, [u8]>, String)> {
        // Only plain relative paths below the UI root.
        if !Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            tracing::warn!("Rejected asset path: {}", path);
            return Err(Error::AssetNotFound(path.to_string()));
        }

        let content = fs::read(self.root.join(path))
            .await
            .map_err(|_| Error::AssetNotFound(path.to_string()))?;

        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok((Cow::Owned(content), mime))
    }
}
