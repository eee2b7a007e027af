use std::sync::Arc;

use anyhow::Context;

use lead_notify::config::AppConfig;
use lead_notify::dispatch::Dispatcher;
use lead_notify::server::lead_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);

    eprintln!("📨 lead-notify v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Channel: {} ({})", config.channel, dispatcher.adapter().name());
    eprintln!(
        "   CORS origin: {}",
        config.site_origin.as_deref().unwrap_or("*")
    );
    eprintln!("   Leads: http://0.0.0.0:{}/api/lead\n", config.port);

    let app = lead_routes(dispatcher, config.site_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, channel = %config.channel, "Lead server started");

    axum::serve(listener, app).await?;

    Ok(())
}
