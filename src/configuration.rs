use anyhow::Context;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt_secret: String,
    pub log_filter: String,
    pub default_organizer: Option<DefaultOrganizerSettings>,
}

#[derive(Debug, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub sqlx_logging: bool,
}

/// Account created at startup when no user with `username` exists yet.
#[derive(Debug, Clone)]
pub struct DefaultOrganizerSettings {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Settings {
    /// Reads settings from the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let application = ApplicationSettings {
            host: env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("APP_PORT", 8080)?,
        };

        let database = DatabaseSettings {
            url: database_url,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: parse_var("DATABASE_MIN_CONNECTIONS", 5)?,
            connect_timeout: Duration::from_secs(parse_var("DATABASE_CONNECT_TIMEOUT_SECS", 8)?),
            idle_timeout: Some(Duration::from_secs(parse_var("DATABASE_IDLE_TIMEOUT_SECS", 300)?)),
            max_lifetime: Some(Duration::from_secs(parse_var("DATABASE_MAX_LIFETIME_SECS", 1800)?)),
            sqlx_logging: parse_var("DATABASE_SQLX_LOGGING", true)?,
        };

        let default_organizer = match (
            env::var("DEFAULT_ORGANIZER_USERNAME"),
            env::var("DEFAULT_ORGANIZER_EMAIL"),
            env::var("DEFAULT_ORGANIZER_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(DefaultOrganizerSettings { username, email, password }),
            _ => None,
        };

        Ok(Self {
            application,
            database,
            jwt_secret,
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| "info,sqlx=warn".to_string()),
            default_organizer,
        })
    }
}

impl DatabaseSettings {
    /// Single-connection in-memory SQLite; the pool must never drop its connection.
    pub fn in_memory_sqlite() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(8),
            idle_timeout: None,
            max_lifetime: None,
            sqlx_logging: false,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}
