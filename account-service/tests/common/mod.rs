use std::sync::Arc;

use account_service::domain::user::service::AuthenticationService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use auth::Authenticator;
use auth::JwtHandler;
use auth::ManualClock;
use auth::PasswordCost;
use auth::PasswordHasher;
use auth::SigningKey;
use chrono::DateTime;
use chrono::Duration;

/// Base64 of "test-secret-key-for-jwt-signing-at-least-32-bytes"
pub const TEST_SECRET: &str = "dGVzdC1zZWNyZXQta2V5LWZvci1qd3Qtc2lnbmluZy1hdC1sZWFzdC0zMi1ieXRlcw==";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: InMemoryUserRepository,
    pub clock: Arc<ManualClock>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application with a one hour token lifetime
    pub async fn spawn() -> Self {
        Self::spawn_with_ttl(Duration::hours(1)).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_ttl(token_ttl: Duration) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let signing_key = SigningKey::from_base64(TEST_SECRET).expect("Invalid test secret");
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));

        // Cheap hashing keeps the suite fast
        let password_hasher = PasswordHasher::with_cost(PasswordCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Invalid test hashing cost");

        let authenticator = Arc::new(
            Authenticator::new(&signing_key, token_ttl)
                .with_password_hasher(password_hasher)
                .with_clock(clock.clone()),
        );

        let repository = InMemoryUserRepository::new();
        let auth_service = Arc::new(AuthenticationService::new(
            Arc::new(repository.clone()),
            authenticator,
        ));

        let router = create_router(auth_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            clock,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(&signing_key),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and return the response
    pub async fn register(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&serde_json::json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Pull the token out of a successful register/login response
pub async fn token_from(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    body["data"]["token"]
        .as_str()
        .expect("Response has no token")
        .to_string()
}
