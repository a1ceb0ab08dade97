use std::sync::Arc;

use anyhow::Context;
use auth::Argon2PasswordEncoder;
use auth_service::config::CassandraConfig;
use auth_service::config::Config;
use auth_service::config::DirectoryBackend;
use auth_service::domain::identity::ports::GatewayServicePort;
use auth_service::domain::identity::ports::UserDirectory;
use auth_service::domain::identity::service::GatewayService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::CassandraUserDirectory;
use auth_service::outbound::repositories::InMemoryUserDirectory;
use auth_service::outbound::sessions::InMemorySessionStore;
use auth_service::seed::seed_directory;
use axum::http::HeaderName;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        directory = ?config.directory.backend,
        token_header = %config.security.token_header,
        custom_rules = config.security.rules.is_some(),
        seed = config.seed.enabled,
        "Configuration loaded"
    );

    let gateway = match config.directory.backend {
        DirectoryBackend::Cassandra => {
            let cassandra: &CassandraConfig = config
                .cassandra
                .as_ref()
                .context("directory backend is cassandra but [cassandra] is not configured")?;
            let directory = CassandraUserDirectory::new(cassandra).await?;
            tracing::info!(database = "cassandra", "User directory connected");
            build_gateway(Arc::new(directory), &config).await?
        }
        DirectoryBackend::Memory => {
            tracing::info!(database = "memory", "Using in-memory user directory");
            build_gateway(Arc::new(InMemoryUserDirectory::new()), &config).await?
        }
    };

    let token_header = HeaderName::try_from(config.security.token_header.as_str())
        .context("security.token_header is not a valid header name")?;

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(gateway, token_header, &config.security.realm);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

/// Seed the directory if requested and wire the gateway around it.
async fn build_gateway<UD>(
    directory: Arc<UD>,
    config: &Config,
) -> Result<Arc<dyn GatewayServicePort>, anyhow::Error>
where
    UD: UserDirectory,
{
    let policy = config.security.policy()?;
    for rule in policy.rules() {
        tracing::debug!(rule = %rule, requirement = ?rule.requirement, "Access rule");
    }

    let encoder = Arc::new(Argon2PasswordEncoder::new());

    if config.seed.enabled {
        seed_directory(directory.as_ref(), encoder.as_ref(), &config.seed.password).await?;
    }

    let sessions = Arc::new(InMemorySessionStore::new());

    Ok(Arc::new(GatewayService::new(
        directory, sessions, encoder, policy,
    )))
}
