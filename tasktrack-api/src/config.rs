/// Configuration management for the API server
///
/// Configuration is read from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL write endpoint (required)
/// - `DATABASE_READ_URL`: PostgreSQL read endpoint (default: `DATABASE_URL`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size per endpoint (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `TASKS_PAGE_SIZE`: Tasks per page for paginated listing (default: 20)
/// - `ACCESS_TOKEN_TTL_SECONDS`: Lifetime of a login session (default: 1200)
/// - `CACHE_MAX_AGE_SECONDS`: `max-age` of cacheable responses (default: 60)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use tasktrack_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Task listing configuration
    pub tasks: TasksConfig,

    /// Session configuration
    pub sessions: SessionsConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// `max-age` in seconds sent on cacheable responses
    pub cache_max_age_seconds: u32,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Write endpoint URL
    pub write_url: String,

    /// Read endpoint URL
    pub read_url: String,

    /// Maximum number of connections per pool
    pub max_connections: u32,
}

/// Task listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Rows per page for `?page=N`
    pub page_size: u32,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                cache_max_age_seconds: 60,
            },
            database: DatabaseConfig {
                write_url: String::new(),
                read_url: String::new(),
                max_connections: 10,
            },
            tasks: TasksConfig { page_size: 20 },
            sessions: SessionsConfig {
                access_token_ttl_seconds: 1200,
            },
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric variable does
    /// not parse or is out of range.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let write_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let read_url = env::var("DATABASE_READ_URL").unwrap_or_else(|_| write_url.clone());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.api.cors_origins);

        let page_size = parse_var("TASKS_PAGE_SIZE", defaults.tasks.page_size)?;
        if page_size == 0 {
            anyhow::bail!("TASKS_PAGE_SIZE must be greater than zero");
        }

        let access_token_ttl_seconds = parse_var(
            "ACCESS_TOKEN_TTL_SECONDS",
            defaults.sessions.access_token_ttl_seconds,
        )?;
        if access_token_ttl_seconds <= 0 {
            anyhow::bail!("ACCESS_TOKEN_TTL_SECONDS must be greater than zero");
        }

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or(defaults.api.host),
                port: parse_var("API_PORT", defaults.api.port)?,
                cors_origins,
                cache_max_age_seconds: parse_var(
                    "CACHE_MAX_AGE_SECONDS",
                    defaults.api.cache_max_age_seconds,
                )?,
            },
            database: DatabaseConfig {
                write_url,
                read_url,
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                )?,
            },
            tasks: TasksConfig { page_size },
            sessions: SessionsConfig {
                access_token_ttl_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}
