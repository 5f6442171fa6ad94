use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Upper bound on how long a placement transaction waits for a product
    /// row lock before giving up with a retryable error.
    pub order_lock_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            order_lock_timeout_ms: env::var("ORDER_LOCK_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
        })
    }
}
