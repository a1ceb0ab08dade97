use std::collections::BTreeSet;
use std::sync::Arc;

use auth::Argon2PasswordEncoder;
use auth::PasswordEncoder;
use auth_service::config::SecurityConfig;
use auth_service::domain::identity::models::CredentialRecord;
use auth_service::domain::identity::ports::UserDirectory;
use auth_service::domain::identity::service::GatewayService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryUserDirectory;
use auth_service::outbound::sessions::InMemorySessionStore;
use auth_service::seed::seed_directory;
use axum::http::HeaderName;

pub const TOKEN_HEADER: &str = "X-AUTH-TOKEN";
pub const PASSWORD: &str = "password";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub directory: InMemoryUserDirectory,
    pub sessions: InMemorySessionStore,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application with the seeded accounts plus a disabled one
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let encoder = Argon2PasswordEncoder::new();
        let directory = InMemoryUserDirectory::new();
        seed_directory(&directory, &encoder, PASSWORD)
            .await
            .expect("Failed to seed directory");
        directory
            .save(CredentialRecord {
                username: "frozen".to_string(),
                password: encoder.hash(PASSWORD).unwrap(),
                email: "frozen@example.com".to_string(),
                active: false,
                roles: BTreeSet::from(["USER".to_string()]),
            })
            .await
            .expect("Failed to save disabled account");

        let sessions = InMemorySessionStore::new();
        let security = SecurityConfig::default();

        let gateway = GatewayService::new(
            Arc::new(directory.clone()),
            Arc::new(sessions.clone()),
            Arc::new(encoder),
            security.policy().expect("Default rules should be valid"),
        );

        let router = create_router(
            Arc::new(gateway),
            HeaderName::from_static("x-auth-token"),
            &security.realm,
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            directory,
            sessions,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with a session token
    pub fn get_with_token(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).header(TOKEN_HEADER, token)
    }

    /// Helper to make DELETE request with a session token
    pub fn delete_with_token(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.delete(path).header(TOKEN_HEADER, token)
    }

    /// Log in with Basic credentials and return the issued session token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .get("/session")
            .basic_auth(username, Some(password))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        response
            .headers()
            .get(TOKEN_HEADER)
            .expect("Login response should carry a session token")
            .to_str()
            .unwrap()
            .to_string()
    }
}
