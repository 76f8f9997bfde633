//! WiFi QR payload construction.
//!
//! Scanner apps recognise the informal `WIFI:` convention:
//! `WIFI:T:<auth>;S:<ssid>;P:<password>;H:<hidden>;;`

use std::fmt;
use std::str::FromStr;

/// Authentication type announced in the `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    Wep,
    #[default]
    Wpa,
    NoPass,
}

impl AuthType {
    /// Trims and upper-cases `raw`; anything unrecognised becomes `Wpa`.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WEP" => AuthType::Wep,
            "WPA" => AuthType::Wpa,
            "NOPASS" => AuthType::NoPass,
            _ => AuthType::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Wep => "WEP",
            AuthType::Wpa => "WPA",
            AuthType::NoPass => "NOPASS",
        }
    }
}

impl FromStr for AuthType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_or_default(s))
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The inputs needed to build a WiFi QR payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub auth: AuthType,
    pub hidden: bool,
}

impl WifiCredentials {
    /// Returns `None` when there is no usable SSID.
    pub fn payload(&self) -> Option<String> {
        build_wifi_payload(
            self.ssid.as_deref(),
            self.password.as_deref(),
            self.auth,
            self.hidden,
        )
    }
}

/// Builds the escaped `WIFI:` payload, or `None` if `ssid` is absent or blank.
pub fn build_wifi_payload(
    ssid: Option<&str>,
    password: Option<&str>,
    auth: AuthType,
    hidden: bool,
) -> Option<String> {
    let ssid = ssid.filter(|s| !s.trim().is_empty())?;
    let password = password.unwrap_or("");

    Some(format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        auth,
        escape_field(ssid),
        escape_field(password),
        hidden,
    ))
}

/// Escapes the characters that are structural in the payload.
///
/// Backslash goes first so the escapes added afterwards are not doubled.
pub fn escape_field(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace(':', "\\:")
        .replace('"', "\\\"")
}
