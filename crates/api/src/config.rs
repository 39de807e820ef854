//! Environment-driven configuration, read once at startup.

/// Process configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// Postgres connection string. Absent means in-memory stores (dev/test).
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Process-wide HS256 signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued access tokens.
    pub token_ttl_minutes: i64,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let token_ttl_minutes = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            db_max_connections,
            jwt_secret,
            token_ttl_minutes,
        }
    }
}
