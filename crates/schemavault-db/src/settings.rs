//! Connection settings for the MySQL server.

use std::fmt;
use std::time::Duration;

/// Runtime settings for the database connection pool.
///
/// `host` and `user` are optional because the service must start without
/// them; their absence is reported as "not configured" rather than an error.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// Server host name or address.
    pub host: Option<String>,

    /// Server TCP port.
    pub port: u16,

    /// Login user.
    pub user: Option<String>,

    /// Login password.
    pub password: Option<String>,

    /// Maximum number of pooled connections.
    pub connection_limit: u32,

    /// How long a borrow waits for a free or new connection.
    pub acquire_timeout: Duration,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: 3306,
            user: None,
            password: None,
            connection_limit: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("connection_limit", &self.connection_limit)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl DbSettings {
    /// Returns the resolved connection target, or `None` when the mandatory
    /// host or user is missing.
    pub fn target(&self) -> Option<ConnectionTarget> {
        let host = self.host.as_deref().filter(|h| !h.trim().is_empty())?;
        let user = self.user.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(ConnectionTarget {
            host: host.to_string(),
            port: self.port,
            user: user.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Fully resolved coordinates of the database server.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
}

impl ConnectionTarget {
    /// JDBC URL addressing `schema` on this server, as the changelog tool expects it.
    pub fn jdbc_url(&self, schema: &str) -> String {
        format!("jdbc:mysql://{}:{}/{}", self.host, self.port, schema)
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
