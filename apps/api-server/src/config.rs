//! Server configuration.

use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Refresh token expiration in hours.
    pub refresh_expiration_hours: u64,
    /// Root directory for uploaded media files.
    pub media_root: PathBuf,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("RESONATE_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("RESONATE_JWT_SECRET is required"))?;

        Ok(Self {
            host: env::var("RESONATE_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("RESONATE_SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            jwt_secret,
            jwt_expiration_hours: env::var("RESONATE_JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            refresh_expiration_hours: env::var("RESONATE_REFRESH_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "168".to_string())
                .parse()
                .unwrap_or(168),
            media_root: env::var("RESONATE_MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            log_level: env::var("RESONATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_secret_required() {
        // SAFETY: Tests run serially or in isolation
        unsafe {
            env::remove_var("RESONATE_JWT_SECRET");
        }
        assert!(Config::from_env().is_err());

        // SAFETY: see above
        unsafe {
            env::set_var("RESONATE_JWT_SECRET", "test-secret");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.media_root, PathBuf::from("media"));
    }
}
