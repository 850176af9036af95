//! Connection settings.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::Result;

/// How [`Storage`](crate::Storage) opens its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    url: String,
    max_connections: u32,
    foreign_keys: bool,
    create_if_missing: bool,
}

impl StorageOptions {
    /// Options for the database at `url`, e.g. `sqlite://app.db` or
    /// `sqlite::memory:`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            foreign_keys: true,
            create_if_missing: true,
        }
    }

    /// A private in-memory database.
    ///
    /// Every pooled connection to `:memory:` opens its own database, so the
    /// pool is limited to one connection.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:").max_connections(1)
    }

    /// Upper bound on pooled connections.
    #[must_use]
    pub const fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Enforce foreign keys (`PRAGMA foreign_keys = ON`).
    #[must_use]
    pub const fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Create the database file when it does not exist.
    #[must_use]
    pub const fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Database URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn connect_options(&self) -> Result<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(&self.url)?
            .foreign_keys(self.foreign_keys)
            .create_if_missing(self.create_if_missing))
    }

    pub(crate) fn pool_options(&self) -> SqlitePoolOptions {
        SqlitePoolOptions::new().max_connections(self.max_connections)
    }
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_uses_one_connection() {
        let options = StorageOptions::in_memory();
        assert_eq!(options.url(), "sqlite::memory:");
        assert_eq!(options.max_connections, 1);
        assert!(options.foreign_keys);
    }

    #[test]
    fn test_connect_options_parse() {
        let options = StorageOptions::new("sqlite://app.db").foreign_keys(false);
        let connect = options.connect_options().unwrap();
        assert_eq!(connect.get_filename().to_str(), Some("app.db"));
    }
}
