use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::user::ports::AuthenticationServicePort;
use account_service::domain::user::service::AuthenticationService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = config.jwt.expiration_seconds,
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    let signing_key = config.jwt.signing_key()?;
    tracing::info!(key_length = signing_key.byte_len(), "Signing key loaded");

    let password_hasher = match config.password {
        Some(cost) => PasswordHasher::with_cost(cost)?,
        None => PasswordHasher::new(),
    };

    let authenticator = Arc::new(
        Authenticator::new(&signing_key, config.jwt.token_ttl())
            .with_password_hasher(password_hasher),
    );

    // Pay for the dummy hash before the first login does
    authenticator.verify_dummy("");

    let auth_service: Arc<dyn AuthenticationServicePort> = match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
            Arc::new(AuthenticationService::new(user_repository, authenticator))
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");

            let user_repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(AuthenticationService::new(user_repository, authenticator))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
