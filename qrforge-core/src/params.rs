//! Query parameter parsing and validation for the HTTP endpoints.
//!
//! Raw query structs deserialize whatever the client sent; `validate()` turns
//! them into typed parameter structs with defaults applied, bounds checked and
//! free-text enums normalized. Handlers only ever see the validated form.

use crate::wifi::{AuthType, WifiCredentials};
use crate::{Error, Result};
use serde::Deserialize;

pub const SCALE_MIN: u32 = 1;
pub const SCALE_MAX: u32 = 50;
pub const SCALE_DEFAULT: u32 = 5;

pub const BORDER_MIN: u32 = 0;
pub const BORDER_MAX: u32 = 20;
pub const BORDER_DEFAULT: u32 = 4;

/// Which kind of content the form page is building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Text,
    Wifi,
}

impl Mode {
    /// Trims and lower-cases `raw`; anything unrecognised becomes `Text`.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "wifi" => Mode::Wifi,
            _ => Mode::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Text => "text",
            Mode::Wifi => "wifi",
        }
    }
}

/// Rendering options shared by both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub scale: u32,
    pub border: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: SCALE_DEFAULT,
            border: BORDER_DEFAULT,
        }
    }
}

impl RenderOptions {
    fn from_raw(scale: Option<i64>, border: Option<i64>) -> Result<Self> {
        Ok(Self {
            scale: bounded("scale", scale, SCALE_DEFAULT, SCALE_MIN, SCALE_MAX)?,
            border: bounded("border", border, BORDER_DEFAULT, BORDER_MIN, BORDER_MAX)?,
        })
    }
}

/// Raw query of `GET /qr`.
#[derive(Debug, Default, Deserialize)]
pub struct QrQuery {
    pub data: Option<String>,
    pub scale: Option<i64>,
    pub border: Option<i64>,
}

/// Validated parameters of `GET /qr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrParams {
    pub data: String,
    pub render: RenderOptions,
}

impl QrQuery {
    pub fn validate(self) -> Result<QrParams> {
        let data = self
            .data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::InvalidArgument("Parameter 'data' is required".to_string()))?;

        Ok(QrParams {
            data,
            render: RenderOptions::from_raw(self.scale, self.border)?,
        })
    }
}

impl QrParams {
    /// The `/qr` link that renders these parameters, query string percent-encoded.
    pub fn to_href(&self) -> String {
        let scale = self.render.scale.to_string();
        let border = self.render.border.to_string();
        let pairs = [
            ("data", self.data.as_str()),
            ("scale", scale.as_str()),
            ("border", border.as_str()),
        ];
        match serde_urlencoded::to_string(&pairs[..]) {
            Ok(query) => format!("/qr?{query}"),
            Err(e) => {
                tracing::error!("Failed to encode /qr query: {}", e);
                "/qr".to_string()
            }
        }
    }
}

/// Raw query of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub mode: Option<String>,
    pub data: Option<String>,
    pub scale: Option<i64>,
    pub border: Option<i64>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub wifi_auth: Option<String>,
    pub wifi_hidden: Option<String>,
}

/// Validated parameters of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexParams {
    pub mode: Mode,
    pub data: Option<String>,
    pub render: RenderOptions,
    pub wifi: WifiCredentials,
}

impl IndexQuery {
    pub fn validate(self) -> Result<IndexParams> {
        let render = RenderOptions::from_raw(self.scale, self.border)?;
        let hidden = match self.wifi_hidden.as_deref() {
            Some(raw) => parse_flag("wifi_hidden", raw)?,
            None => false,
        };

        Ok(IndexParams {
            mode: self.mode.as_deref().map(Mode::parse_or_default).unwrap_or_default(),
            data: self.data.filter(|d| !d.is_empty()),
            render,
            wifi: WifiCredentials {
                ssid: self.wifi_ssid,
                password: self.wifi_password,
                auth: self
                    .wifi_auth
                    .as_deref()
                    .map(AuthType::parse_or_default)
                    .unwrap_or_default(),
                hidden,
            },
        })
    }
}

impl IndexParams {
    /// The text that `/qr` would encode for this form state, if any.
    pub fn effective_data(&self) -> Option<String> {
        match self.mode {
            Mode::Text => self.data.clone(),
            Mode::Wifi => self.wifi.payload(),
        }
    }
}

fn bounded(name: &'static str, raw: Option<i64>, default: u32, min: u32, max: u32) -> Result<u32> {
    let Some(value) = raw else {
        return Ok(default);
    };
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or(Error::OutOfRange {
            name,
            value,
            min: min.into(),
            max: max.into(),
        })
}

/// Parses an HTML-form style boolean (`on` from a checkbox included).
pub fn parse_flag(name: &'static str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(Error::InvalidParameter {
            name,
            value: raw.to_string(),
        }),
    }
}
