use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub qr: QrConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8002)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QrConfig {
    pub error_correction: ErrorCorrection,
}

/// QR error correction level, from lowest (L, ~7%) to highest (H, ~30%) redundancy.
///
/// The configured level is a minimum: the encoder raises it while the symbol
/// version stays the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum ErrorCorrection {
    #[default]
    L,
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

// Intermediate structures for TOML parsing; every key is optional.

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AppConfigFile {
    #[serde(default)]
    server: ServerConfigToml,
    #[serde(default)]
    qr: QrConfigToml,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ServerConfigToml {
    bind_addr: Option<SocketAddr>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct QrConfigToml {
    error_correction: Option<ErrorCorrection>,
}

impl From<AppConfigFile> for AppConfig {
    fn from(t: AppConfigFile) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            server: ServerConfig {
                bind_addr: t.server.bind_addr.unwrap_or(defaults.server.bind_addr),
            },
            qr: QrConfig {
                error_correction: t
                    .qr
                    .error_correction
                    .unwrap_or(defaults.qr.error_correction),
            },
        }
    }
}

impl AppConfig {
    /// Reads the TOML file at `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                let contents = std::fs::read_to_string(path)?;
                load_config_from_toml_str(&contents)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Loads the application configuration from a TOML string.
pub fn load_config_from_toml_str(s: &str) -> crate::Result<AppConfig> {
    let parsed: AppConfigFile = toml::from_str(s)?;
    Ok(AppConfig::from(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = load_config_from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.bind_addr.port(), 8002);
        assert_eq!(config.qr.error_correction, ErrorCorrection::L);
    }

    #[test]
    fn parses_all_sections() {
        let config = load_config_from_toml_str(
            r#"
            [server]
            bind_addr = "0.0.0.0:9000"

            [qr]
            error_correction = "H"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.qr.error_correction, ErrorCorrection::H);
    }

    #[test]
    fn rejects_bad_values_and_unknown_keys() {
        assert!(matches!(
            load_config_from_toml_str("[server]\nbind_addr = \"not an address\""),
            Err(crate::Error::Config(_))
        ));
        assert!(load_config_from_toml_str("[qr]\nerror_correction = \"X\"").is_err());
        assert!(load_config_from_toml_str("[qr]\nscale = 3").is_err());
    }

    #[test]
    fn load_without_path_uses_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
