use anyhow::anyhow;
use std::env;

pub const DEFAULT_PORT: u16 = 5020;
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 15;
pub const DEFAULT_REFRESH_TOKEN_HOURS: i64 = 168;
/// One week.
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 10_080;
/// One year.
pub const MAX_REFRESH_TOKEN_HOURS: i64 = 8_760;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 15;
pub const DEFAULT_ADMIN_ROLE_LABEL: &str = "ผู้ดูแลระบบ";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_hours: i64,
    pub cors_allow_origins: Vec<String>,
    pub admin_name: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Localized role label that is treated the same as `admin`.
    pub admin_role_label: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. Numeric settings that fail to parse
    /// or are not positive fall back to their defaults; token lifetimes are
    /// capped at [`MAX_ACCESS_TOKEN_MINUTES`] and [`MAX_REFRESH_TOKEN_HOURS`].
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let jwt_secret = get("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET is required"))?;
        let database_url =
            get("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL is required"))?;

        let port = get("PORT")
            .and_then(|raw| raw.parse::<u16>().ok())
            .filter(|port| *port > 0)
            .unwrap_or(DEFAULT_PORT);

        let database_max_connections = get("DATABASE_MAX_CONNECTIONS")
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|count| *count > 0)
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS);
        let access_token_minutes =
            positive(get("ACCESS_TOKEN_MINUTES"), DEFAULT_ACCESS_TOKEN_MINUTES)
                .min(MAX_ACCESS_TOKEN_MINUTES);
        let refresh_token_hours =
            positive(get("REFRESH_TOKEN_HOURS"), DEFAULT_REFRESH_TOKEN_HOURS)
                .min(MAX_REFRESH_TOKEN_HOURS);

        let cors_allow_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let admin_username = get("APP_ADMIN_USERNAME")
            .or_else(|| get("APP_ADMIN_EMAIL"))
            .unwrap_or_else(|| "admin".to_string());

        Ok(Config {
            port,
            database_url,
            database_max_connections,
            jwt_secret,
            access_token_minutes,
            refresh_token_hours,
            cors_allow_origins,
            admin_name: get("APP_ADMIN_NAME").unwrap_or_else(|| "System Admin".to_string()),
            admin_username,
            admin_password: get("APP_ADMIN_PASSWORD").unwrap_or_else(|| "admin12345".to_string()),
            admin_role_label: get("APP_ADMIN_ROLE_LABEL")
                .unwrap_or_else(|| DEFAULT_ADMIN_ROLE_LABEL.to_string()),
        })
    }
}

fn positive(raw: Option<String>, fallback: i64) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(fallback)
}
