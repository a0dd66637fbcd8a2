//! Remote service identity.

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::lookup_host;

/// Errors raised while constructing a [`ConnectionTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("service name must not be empty")]
    EmptyName,

    #[error("address '{0}' has no host")]
    MissingHost(String),

    #[error("address '{address}' has an invalid port '{port}'")]
    InvalidPort { address: String, port: String },
}

/// A named remote service and the endpoint it listens on.
///
/// Immutable once constructed. The address is validated syntactically
/// (`host:port`); DNS resolution happens per attempt in [`ConnectionTarget::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    name: String,
    host: String,
    port: u16,
}

impl ConnectionTarget {
    /// Build a target from a name and a `host:port` address.
    ///
    /// A bare port (`"5432"`) is joined to the service name, so the name
    /// doubles as the hostname.
    pub fn new(name: impl Into<String>, address: &str) -> Result<Self, TargetError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TargetError::EmptyName);
        }

        let address = address.trim();
        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) => (host.trim_start_matches('[').trim_end_matches(']'), port),
            None => (name.as_str(), address),
        };

        if host.is_empty() {
            return Err(TargetError::MissingHost(address.to_string()));
        }

        let port = port.parse::<u16>().map_err(|_| TargetError::InvalidPort {
            address: address.to_string(),
            port: port.to_string(),
        })?;

        let host = host.to_string();
        Ok(Self { name, host, port })
    }

    /// Build a target whose host is the service name itself.
    pub fn from_port(name: impl Into<String>, port: u16) -> Result<Self, TargetError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TargetError::EmptyName);
        }
        Ok(Self {
            host: name.clone(),
            name,
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Resolve the endpoint to socket addresses.
    pub async fn resolve(&self) -> std::io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = lookup_host((self.host.as_str(), self.port)).await?.collect();
        if addrs.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no addresses found for {}", self.authority()),
            ));
        }
        Ok(addrs)
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.authority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let target = ConnectionTarget::new("librate-db", "localhost:5432").unwrap();
        assert_eq!(target.name(), "librate-db");
        assert_eq!(target.host(), "localhost");
        assert_eq!(target.port(), 5432);
        assert_eq!(target.to_string(), "librate-db (localhost:5432)");
    }

    #[test]
    fn bare_port_uses_name_as_host() {
        let target = ConnectionTarget::new("recommendation", "50051").unwrap();
        assert_eq!(target.authority(), "recommendation:50051");

        let same = ConnectionTarget::from_port("recommendation", 50051).unwrap();
        assert_eq!(target, same);
    }

    #[test]
    fn ipv6_literal() {
        let target = ConnectionTarget::new("db", "[::1]:5432").unwrap();
        assert_eq!(target.host(), "::1");
        assert_eq!(target.authority(), "[::1]:5432");
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(
            ConnectionTarget::new("  ", "localhost:1").unwrap_err(),
            TargetError::EmptyName
        );
        assert_eq!(
            ConnectionTarget::new("db", ":5432").unwrap_err(),
            TargetError::MissingHost(":5432".into())
        );
        assert!(matches!(
            ConnectionTarget::new("db", "localhost:99999"),
            Err(TargetError::InvalidPort { .. })
        ));
        assert!(matches!(
            ConnectionTarget::new("db", "localhost:pg"),
            Err(TargetError::InvalidPort { .. })
        ));
    }

    #[tokio::test]
    async fn resolves_loopback() {
        let target = ConnectionTarget::new("local", "127.0.0.1:8080").unwrap();
        let addrs = target.resolve().await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:8080".parse::<SocketAddr>().unwrap()]);
    }
}
