//! Configuration types and builders.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::time::Duration;

/// How the bearer token sent to Snowflake should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    #[default]
    Oauth,
    KeypairJwt,
    ProgrammaticAccessToken,
}

impl TokenType {
    /// Parse a token type, accepting the header spelling and a few aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "OAUTH" => Some(Self::Oauth),
            "KEYPAIR_JWT" | "JWT" => Some(Self::KeypairJwt),
            "PROGRAMMATIC_ACCESS_TOKEN" | "PAT" => Some(Self::ProgrammaticAccessToken),
            _ => None,
        }
    }

    /// Value of the `X-Snowflake-Authorization-Token-Type` header.
    pub fn header_value(self) -> &'static str {
        match self {
            Self::Oauth => "OAUTH",
            Self::KeypairJwt => "KEYPAIR_JWT",
            Self::ProgrammaticAccessToken => "PROGRAMMATIC_ACCESS_TOKEN",
        }
    }
}

impl TryFrom<&str> for TokenType {
    type Error = ConfigError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        Self::parse(s).ok_or_else(|| ConfigError::InvalidValue {
            field: "token_type".into(),
            message: format!(
                "Unknown token type: '{}'. Valid types: OAUTH, KEYPAIR_JWT, PROGRAMMATIC_ACCESS_TOKEN",
                s
            )
            .into(),
        })
    }
}

/// Snowflake account connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowflakeConfig {
    pub account: String,
    pub host: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub token_type: TokenType,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub request_timeout: Duration,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            host: String::new(),
            token: String::new(),
            token_type: TokenType::default(),
            role: None,
            warehouse: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl SnowflakeConfig {
    /// Base URL for REST calls, e.g. `https://myorg-acct.snowflakecomputing.com`.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host.trim_end_matches('/'))
        }
    }
}

/// Builder for SnowflakeConfig with fluent API.
#[derive(Default)]
pub struct SnowflakeConfigBuilder {
    config: SnowflakeConfig,
}

impl SnowflakeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.config.account = account.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    pub fn token_type(mut self, token_type: TokenType) -> Self {
        self.config.token_type = token_type;
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.config.role = Some(role.into());
        self
    }

    pub fn warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.config.warehouse = Some(warehouse.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build from environment variables.
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(account) = env::var("SNOWFLAKE_ACCOUNT") {
            self.config.account = account;
        }

        if let Ok(host) = env::var("SNOWFLAKE_HOST") {
            self.config.host = host;
        }

        if let Ok(token) = env::var("SNOWFLAKE_TOKEN") {
            self.config.token = token;
        }

        if let Ok(token_type) = env::var("SNOWFLAKE_TOKEN_TYPE") {
            self.config.token_type = TokenType::try_from(token_type.as_str())?;
        }

        if let Ok(role) = env::var("SNOWFLAKE_ROLE") {
            self.config.role = Some(role);
        }

        if let Ok(warehouse) = env::var("SNOWFLAKE_WAREHOUSE") {
            self.config.warehouse = Some(warehouse);
        }

        if let Ok(timeout) = env::var("SNOWFLAKE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SNOWFLAKE_REQUEST_TIMEOUT_SECS".into(),
                message: "Expected a whole number of seconds".into(),
            })?;
            self.config.request_timeout = Duration::from_secs(secs);
        }

        Ok(self)
    }

    pub fn build(mut self) -> Result<SnowflakeConfig> {
        if self.config.host.is_empty() && !self.config.account.is_empty() {
            self.config.host = format!("{}.snowflakecomputing.com", self.config.account.to_lowercase());
        }
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<()> {
        if self.config.account.is_empty() && self.config.host.is_empty() {
            return Err(ConfigError::MissingField("account".into()).into());
        }
        if self.config.token.is_empty() {
            return Err(ConfigError::MissingField("token".into()).into());
        }
        if self.config.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout".into(),
                message: "Request timeout must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
    /// `None` until credentials are available; tool calls fail until then.
    pub snowflake: Option<SnowflakeConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "snowflake-object-mcp".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            snowflake: None,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn snowflake(mut self, snowflake: SnowflakeConfig) -> Self {
        self.config.snowflake = Some(snowflake);
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
