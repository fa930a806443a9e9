use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string, or `memory://` for the in-process store.
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Send the session cookie with the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            secure_cookies: parse_flag(std::env::var("SECURE_COOKIES").ok().as_deref())
                .context("SECURE_COOKIES must be true or false")?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_SCHEME)
    }
}

pub const MEMORY_SCHEME: &str = "memory://";

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("0") | Some("false") | Some("no") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some(other) => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_defaults_to_false() {
        assert!(!parse_flag(None).unwrap());
        assert!(!parse_flag(Some("")).unwrap());
        assert!(!parse_flag(Some("false")).unwrap());
    }

    #[test]
    fn test_parse_flag_accepts_true_spellings() {
        assert!(parse_flag(Some("true")).unwrap());
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some("1")).unwrap());
    }

    #[test]
    fn test_parse_flag_rejects_garbage() {
        assert!(parse_flag(Some("maybe")).is_err());
    }

    #[test]
    fn test_memory_scheme_detection() {
        let config = Config {
            database_url: "memory://".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            secure_cookies: false,
        };
        assert!(config.uses_memory_store());

        let config = Config {
            database_url: "postgres://localhost/talent_scout".to_string(),
            ..config
        };
        assert!(!config.uses_memory_store());
    }
}
