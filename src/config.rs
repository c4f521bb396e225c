use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub otp_ttl_minutes: i64,
    pub upload_dir: String,
    pub event_channel_capacity: usize,
    /// Browser origins allowed by CORS. Empty means any origin, which suits
    /// local development only; set `CORS_ALLOWED_ORIGINS` in deployments.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            access_token_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", 60),
            refresh_token_ttl_days: parse_or("REFRESH_TOKEN_TTL_DAYS", 30),
            otp_ttl_minutes: parse_or("OTP_TTL_MINUTES", 10),
            upload_dir,
            event_channel_capacity: parse_or("EVENT_CHANNEL_CAPACITY", 256),
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            ),
        })
    }

    /// Config with defaults for everything but the secrets; used by tests and tools.
    pub fn with_secret(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: jwt_secret.into(),
            access_token_ttl_minutes: 60,
            refresh_token_ttl_days: 30,
            otp_ttl_minutes: 10,
            upload_dir: "uploads".to_string(),
            event_channel_capacity: 256,
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Splits a comma separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" https://app.example.com/, ,http://localhost:5173"),
            vec!["https://app.example.com", "http://localhost:5173"]
        );
        assert!(parse_origins("").is_empty());
    }
}
