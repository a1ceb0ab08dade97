use std::env;

use auth::AccessPolicy;
use auth::AccessRule;
use auth::HttpMethod;
use auth::PolicyError;
use auth::Requirement;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

pub const DEFAULT_TOKEN_HEADER: &str = "X-AUTH-TOKEN";
pub const DEFAULT_REALM: &str = "Realm";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    pub cassandra: Option<CassandraConfig>,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    Cassandra,
    #[default]
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub backend: DirectoryBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CassandraConfig {
    pub nodes: Vec<String>,
    pub keyspace: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Request/response header carrying the session token.
    #[serde(default = "default_token_header")]
    pub token_header: String,
    /// Realm advertised in `WWW-Authenticate` challenges.
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Ordered access rules; first match wins. `None` selects the built-in table.
    #[serde(default)]
    pub rules: Option<Vec<AccessRule>>,
}

impl SecurityConfig {
    /// Validate the configured rule table and build the policy from it.
    ///
    /// # Errors
    /// Any rule of the configured or built-in table that fails validation
    pub fn policy(&self) -> Result<AccessPolicy, PolicyError> {
        let rules = match &self.rules {
            Some(rules) => rules.clone(),
            None => default_rules()?,
        };
        AccessPolicy::new(rules)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            token_header: default_token_header(),
            realm: default_realm(),
            rules: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_seed_password")]
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            password: default_seed_password(),
        }
    }
}

fn default_token_header() -> String {
    DEFAULT_TOKEN_HEADER.to_string()
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

fn default_seed_password() -> String {
    "password".to_string()
}

/// Built-in rule table.
///
/// Order matters: logout is permitted before the authenticated `/session`
/// rule can match it.
pub fn default_rules() -> Result<Vec<AccessRule>, PolicyError> {
    let rules = [
        (Some(HttpMethod::Get), "/users/exists", Requirement::PermitAll),
        (Some(HttpMethod::Delete), "/session", Requirement::PermitAll),
        (None, "/session", Requirement::Authenticated),
        (None, "/users/{user}/**", Requirement::path_variable("user")),
    ];

    rules
        .into_iter()
        .map(|(method, pattern, requirement)| match method {
            Some(method) => AccessRule::new(method, pattern, requirement),
            None => AccessRule::any(pattern, requirement),
        })
        .collect()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SERVER__HTTP_PORT, DIRECTORY__BACKEND, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: SECURITY__TOKEN_HEADER=X-Session overrides security.token_header
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
