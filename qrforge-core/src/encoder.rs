//! QR matrix encoding (backed by the `qrcode` crate) and PNG rasterization.

use crate::config::ErrorCorrection;
use crate::params::{BORDER_MAX, BORDER_MIN, SCALE_MAX, SCALE_MIN};
use crate::traits::{QrEncoder, QrMatrix};
use crate::{Error, Result};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode, Version};
use std::io::Cursor;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// A [`QrEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder {
    ec_level: ErrorCorrection,
}

impl QrcodeEncoder {
    pub fn new(ec_level: ErrorCorrection) -> Self {
        Self { ec_level }
    }

    fn encode_micro(data: &[u8], ec: EcLevel) -> Option<QrCode> {
        (1..=4).find_map(|v| QrCode::with_version(data, Version::Micro(v), ec).ok())
    }

    /// Smallest standard version at the configured level, then the highest
    /// level that still fits that same version.
    fn encode_standard(&self, data: &[u8]) -> Result<QrCode> {
        let base = QrCode::with_error_correction_level(data, self.ec_level.into())
            .map_err(|e| Error::Encoding(e.to_string()))?;
        let version = base.version();

        let boosted = [ErrorCorrection::H, ErrorCorrection::Q, ErrorCorrection::M]
            .into_iter()
            .filter(|level| *level > self.ec_level)
            .find_map(|level| QrCode::with_version(data, version, level.into()).ok());
        Ok(boosted.unwrap_or(base))
    }
}

impl QrEncoder for QrcodeEncoder {
    fn encode(&self, text: &str, micro_allowed: bool) -> Result<QrMatrix> {
        let data = text.as_bytes();
        let ec = EcLevel::from(self.ec_level);

        let micro = if micro_allowed {
            Self::encode_micro(data, ec)
        } else {
            None
        };
        let code = match micro {
            Some(code) => code,
            None => self.encode_standard(data)?,
        };

        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        QrMatrix::new(code.width(), modules)
            .ok_or_else(|| Error::Encoding("encoder returned a malformed matrix".to_string()))
    }
}

/// Rasterizes `matrix` into a greyscale PNG.
///
/// Each module becomes a `scale` x `scale` pixel block and `border` light
/// modules of quiet zone surround the symbol.
pub fn rasterize_to_png(matrix: &QrMatrix, scale: u32, border: u32) -> Result<Vec<u8>> {
    let modules = matrix.width() as u32;
    let side = (modules + 2 * border) * scale;

    let img = GrayImage::from_fn(side, side, |px, py| {
        let (mx, my) = (px / scale, py / scale);
        let inside = (border..border + modules).contains(&mx) && (border..border + modules).contains(&my);
        if inside && matrix.is_dark((mx - border) as usize, (my - border) as usize) {
            DARK
        } else {
            LIGHT
        }
    });

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Encodes `text` as a standard (non-Micro) QR symbol and returns PNG bytes.
pub fn render_qr_png(
    encoder: &dyn QrEncoder,
    text: &str,
    scale: u32,
    border: u32,
) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Err(Error::InvalidArgument(
            "Parameter 'data' is required".to_string(),
        ));
    }
    check_range("scale", scale, SCALE_MIN, SCALE_MAX)?;
    check_range("border", border, BORDER_MIN, BORDER_MAX)?;

    let matrix = encoder.encode(text, false)?;
    tracing::debug!(
        modules = matrix.width(),
        scale,
        border,
        "Rasterizing QR symbol"
    );
    rasterize_to_png(&matrix, scale, border)
}

fn check_range(name: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            name,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_png(png: &[u8]) -> String {
        let img = image::load_from_memory_with_format(png, ImageFormat::Png)
            .unwrap()
            .to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            img.width() as usize,
            img.height() as usize,
            |x, y| img.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
        let (_meta, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn png_scans_back_to_input() {
        let encoder = QrcodeEncoder::default();
        let png = render_qr_png(&encoder, "https://example.com", 5, 4).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(decode_png(&png), "https://example.com");
    }

    #[test]
    fn wifi_payload_scans_back_verbatim() {
        let payload = r#"WIFI:T:WEP;S:My\;Net;P:p\"w;H:true;;"#;
        let png = render_qr_png(&QrcodeEncoder::new(ErrorCorrection::H), payload, 4, 4).unwrap();
        assert_eq!(decode_png(&png), payload);
    }

    #[test]
    fn image_side_follows_scale_and_border() {
        let encoder = QrcodeEncoder::default();
        let matrix = encoder.encode("hello", false).unwrap();
        assert_eq!(matrix.width(), 21);

        let png = rasterize_to_png(&matrix, 3, 2).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(img.width(), (21 + 2 * 2) * 3);
        assert_eq!(img.height(), img.width());
        // Quiet zone is light, the top-left finder corner is dark.
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert_eq!(img.get_pixel(2 * 3, 2 * 3)[0], 0);
    }

    #[test]
    fn zero_border_starts_with_finder_pattern() {
        let matrix = QrcodeEncoder::default().encode("x", false).unwrap();
        let png = rasterize_to_png(&matrix, 1, 0).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(img.width() as usize, matrix.width());
        assert_eq!(img.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn micro_symbols_only_when_allowed() {
        let encoder = QrcodeEncoder::new(ErrorCorrection::L);
        // Micro QR tops out at 17 modules (M4).
        assert!(encoder.encode("12345", true).unwrap().width() <= 17);
        assert_eq!(encoder.encode("12345", false).unwrap().width(), 21);
    }

    #[test]
    fn default_level_fits_long_text() {
        // Beyond level M capacity (2331 bytes), within level L (2953 bytes).
        let text = "x".repeat(2500);
        assert!(render_qr_png(&QrcodeEncoder::default(), &text, 1, 0).is_ok());
        assert!(matches!(
            QrcodeEncoder::new(ErrorCorrection::M).encode(&text, false),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn level_is_raised_within_the_same_version() {
        // "hello" fits version 1 even at level H.
        let boosted = QrcodeEncoder::default().encode("hello", false).unwrap();
        let high = QrcodeEncoder::new(ErrorCorrection::H).encode("hello", false).unwrap();
        assert_eq!(boosted.width(), 21);
        assert_eq!(boosted, high);
    }

    #[test]
    fn empty_text_is_a_client_error() {
        let err = render_qr_png(&QrcodeEncoder::default(), "", 5, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let encoder = QrcodeEncoder::default();
        for (scale, border) in [(0, 4), (51, 4), (5, 21)] {
            let err = render_qr_png(&encoder, "data", scale, border).unwrap_err();
            assert!(matches!(err, Error::OutOfRange { .. }), "{scale}/{border}");
        }
    }

    #[test]
    fn oversized_text_fails_to_encode() {
        let text = "x".repeat(8000);
        let err = render_qr_png(&QrcodeEncoder::default(), &text, 1, 0).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
