use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    /// Drop and recreate the users table on startup.
    pub reset_on_start: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };
        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let reset_on_start = lookup("DB_RESET")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            reset_on_start,
        })
    }

    pub fn is_sqlite(&self) -> bool {
        self.database_url.starts_with("sqlite:")
    }

    pub fn is_in_memory_sqlite(&self) -> bool {
        self.is_sqlite()
            && (self.database_url.contains(":memory:") || self.database_url.contains("mode=memory"))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/users")]))
                .expect("config");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 10);
        assert!(!config.reset_on_start);
        assert!(!config.is_sqlite());
        assert!(!config.is_in_memory_sqlite());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "3000"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_RESET", "true"),
        ]))
        .expect("config");
        assert!(config.is_sqlite());
        assert!(config.is_in_memory_sqlite());
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.max_connections, 4);
        assert!(config.reset_on_start);
    }

    #[test]
    fn in_memory_detection_covers_url_variants() {
        for (url, expected) in [
            ("sqlite::memory:?cache=shared", true),
            ("sqlite:file:users?mode=memory&cache=shared", true),
            ("sqlite:users.db", false),
            ("sqlite://data/users.db?mode=rwc", false),
        ] {
            let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", url)])).unwrap();
            assert_eq!(config.is_in_memory_sqlite(), expected, "{}", url);
        }
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("APP_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
