use anyhow::{Context, Result};
use qrforge_core::config::AppConfig;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "QRFORGE_CONFIG";
const BIND_ENV: &str = "QRFORGE_BIND";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging is the entry point's job.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Process configuration.
    let config = load_config().context("invalid configuration")?;

    // 3. Serve until Ctrl-C. Errors propagate to anyhow's report and exit status 1.
    qrforge_core::run(config).await.context("qrforge failed")?;

    tracing::info!("🛑 Shutting down.");
    Ok(())
}

/// Reads the TOML file named by `QRFORGE_CONFIG` (defaults if unset), then
/// applies the `QRFORGE_BIND` override.
fn load_config() -> Result<AppConfig> {
    resolve_config(
        env::var_os(CONFIG_ENV).map(PathBuf::from),
        env::var(BIND_ENV).ok(),
    )
}

fn resolve_config(path: Option<PathBuf>, bind: Option<String>) -> Result<AppConfig> {
    let mut config = AppConfig::load(path.as_deref())
        .with_context(|| format!("failed to load config from {:?}", path))?;

    if let Some(bind) = bind {
        config.server.bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("{BIND_ENV} is not a socket address: {bind}"))?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_override_replaces_address() {
        let config = resolve_config(None, Some("0.0.0.0:9100".to_string())).unwrap();
        assert_eq!(config.server.bind_addr.port(), 9100);
    }

    #[test]
    fn bad_settings_are_returned_as_errors() {
        let err = resolve_config(None, Some("localhost".to_string())).unwrap_err();
        assert!(err.to_string().contains(BIND_ENV));

        let missing = PathBuf::from("/nonexistent/qrforge.toml");
        let err = resolve_config(Some(missing), None).unwrap_err();
        assert!(err.to_string().starts_with("failed to load config"));
    }
}
