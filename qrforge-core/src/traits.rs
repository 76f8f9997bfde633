use async_trait::async_trait;
use std::borrow::Cow;

// Shared data structures and the traits implemented by encoders and frontends.

/// A square QR symbol: `width` modules per side, stored row-major.
/// `true` marks a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Returns `None` if `modules` does not hold exactly `width * width` entries.
    pub fn new(width: usize, modules: Vec<bool>) -> Option<Self> {
        (width > 0 && modules.len() == width * width).then_some(Self { width, modules })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// The QR encoding capability.
///
/// Implementations compute the module matrix only; rasterization lives in
/// [`crate::encoder::rasterize_to_png`].
pub trait QrEncoder: Send + Sync {
    /// Encodes `text` into a QR matrix.
    ///
    /// # Arguments
    /// * `text` - The content to encode, as UTF-8 bytes.
    /// * `micro_allowed` - Whether a Micro QR symbol may be produced for short input.
    ///
    /// # Returns
    /// The matrix, or [`crate::Error::Encoding`] if no symbol can hold `text`.
    fn encode(&self, text: &str, micro_allowed: bool) -> crate::Result<QrMatrix>;
}

/// UI asset provider interface.
#[async_trait]
pub trait UiAssetProvider: Send + Sync {
    /// Retrieves a single UI asset.
    ///
    /// # Arguments
    /// * `path` - The path to the asset (e.g., "index.html", "style.css").
    ///
    /// # Returns
    /// A `Result` containing a tuple of (`Cow<'static, [u8]>`, `String`)
    /// representing the asset's content and its MIME type, or an `Error` if not found.
    async fn get_asset(&self, path: &str) -> crate::Result<(Cow<'static, [u8]>, String)>;
}
