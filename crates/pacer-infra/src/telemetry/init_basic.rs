use pacer_core::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "pacer=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Initialize tracing with a text or JSON formatter.
///
/// `RUST_LOG` overrides the default filter. Returns an error if a global
/// subscriber has already been installed.
pub fn init_telemetry(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    tracing::info!(format = ?format, "Tracing initialized");
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown (nothing to flush)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_init_is_rejected() {
        let _ = init_telemetry(LogFormat::Json);
        assert!(init_telemetry(LogFormat::Text).is_err());
        shutdown_telemetry().await;
    }
}
