use clap::Parser;
use kibana_alert_provider::{
    Args, config, http, kibana::Kibana, metrics, resource::ProviderContext, signal_handler,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Register metrics
    metrics::register_metrics()?;

    // Parse config
    let args = Args::parse();
    let config = config::Config::from_file(&args.config)?;

    // Handle signals
    signal_handler()?;

    // Connect the client handle shared by every resource callback
    let kibana = Kibana::new(config.kibana.clone())?;
    let ctx = ProviderContext::new(Box::new(kibana));

    // Start the HTTP server
    http::create_server(config, ctx).await
}
