use discovery_intake::config::AppConfig;
use discovery_intake::generation::{GenerationService, create_provider};
use discovery_intake::routes::app_routes;
use discovery_intake::webhook::WebhookSender;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("📋 Discovery Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);
    eprintln!(
        "   Generation: {}",
        match &config.provider {
            Some(provider) => format!("openai ({})", provider.model),
            None => "disabled (fixed questions only)".to_string(),
        }
    );
    eprintln!(
        "   Webhook: {}",
        if config.webhook.url.is_some() {
            "configured"
        } else {
            "log-only"
        }
    );

    let provider = create_provider(config.provider.clone());
    let generation = GenerationService::new(provider, config.max_ai_questions);
    let webhook = WebhookSender::new(config.webhook.clone());

    let app = app_routes(generation, webhook);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Intake server started");
    axum::serve(listener, app).await?;

    Ok(())
}
