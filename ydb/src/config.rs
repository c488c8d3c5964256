use std::time::Duration;

use url::Url;

use crate::errors::ClientError;
use ydb_gax::conn::ConnectionOptions;

/// Parsed form of `grpc(s)://host[:port][/database][?database=...&application=...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    /// Database path, from the URL path or the `database` query parameter.
    pub database: String,
    pub application: Option<String>,
}

impl ConnectionString {
    pub fn parse(dsn: &str) -> Result<ConnectionString, ClientError> {
        let url =
            Url::parse(dsn).map_err(|e| ClientError::InvalidConnectionString(e.to_string()))?;
        let ssl = match url.scheme() {
            "grpc" => false,
            "grpcs" => true,
            other => {
                return Err(ClientError::InvalidConnectionString(format!(
                    "unsupported scheme '{other}'"
                )))
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::InvalidConnectionString("missing host".to_string()))?
            .to_string();
        let port = url.port().unwrap_or(if ssl { 443 } else { 80 });

        let query_database = url
            .query_pairs()
            .find(|(k, _)| k == "database")
            .map(|(_, v)| v.into_owned());
        let path_database = match url.path().trim_end_matches('/') {
            "" => None,
            path => Some(path.to_string()),
        };
        let database = path_database.or(query_database).ok_or_else(|| {
            ClientError::InvalidConnectionString(
                "database missing from path and query".to_string(),
            )
        })?;

        let application = url
            .query_pairs()
            .find(|(k, _)| k == "application")
            .map(|(_, v)| v.into_owned());

        Ok(ConnectionString {
            host,
            port,
            ssl,
            database,
            application,
        })
    }

    pub fn uri(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Maximum time for [`crate::Driver::ready`] to observe a responsive server.
    pub ready_timeout: Duration,
    /// Maximum time to obtain a token from the token source.
    pub token_timeout: Duration,
    pub enable_discovery: bool,
    /// Per-attempt timeout of a discovery round.
    pub discovery_timeout: Duration,
    /// Period of background re-discovery. Must exceed `discovery_timeout`.
    pub discovery_interval: Duration,
    /// Local datacenter tag used to prefer nearby endpoints.
    pub local_dc: Option<String>,
    pub connection: ConnectionOptions,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(30),
            token_timeout: Duration::from_secs(10),
            enable_discovery: true,
            discovery_timeout: Duration::from_secs(10),
            discovery_interval: Duration::from_secs(60),
            local_dc: None,
            connection: ConnectionOptions::default(),
        }
    }
}

impl DriverOptions {
    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.enable_discovery && self.discovery_interval <= self.discovery_timeout {
            return Err(ClientError::InvalidConfig(format!(
                "discovery_interval ({:?}) must be greater than discovery_timeout ({:?})",
                self.discovery_interval, self.discovery_timeout
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database_in_path() {
        let cs = ConnectionString::parse("grpc://localhost:2136/local").unwrap();
        assert_eq!(cs.host, "localhost");
        assert_eq!(cs.port, 2136);
        assert!(!cs.ssl);
        assert_eq!(cs.database, "/local");
        assert_eq!(cs.application, None);
        assert_eq!(cs.uri(), "http://localhost:2136");
    }

    #[test]
    fn test_parse_database_in_query() {
        let cs =
            ConnectionString::parse("grpcs://db.example.com?database=/ru/prod&application=app1")
                .unwrap();
        assert!(cs.ssl);
        assert_eq!(cs.port, 443);
        assert_eq!(cs.database, "/ru/prod");
        assert_eq!(cs.application.as_deref(), Some("app1"));
        assert_eq!(cs.uri(), "https://db.example.com:443");
    }

    #[test]
    fn test_parse_default_ports_by_scheme() {
        let plain = ConnectionString::parse("grpc://h?database=/d").unwrap();
        assert_eq!(plain.port, 80);
        let tls = ConnectionString::parse("grpcs://h?database=/d").unwrap();
        assert_eq!(tls.port, 443);
    }

    #[test]
    fn test_parse_rejects_missing_database() {
        let err = ConnectionString::parse("grpc://localhost:2136").unwrap_err();
        assert!(matches!(err, ClientError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = ConnectionString::parse("http://localhost/db").unwrap_err();
        assert!(matches!(err, ClientError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_validate_discovery_interval() {
        let mut options = DriverOptions::default();
        options.discovery_interval = Duration::from_secs(5);
        assert!(options.validate().is_err());
        options.enable_discovery = false;
        assert!(options.validate().is_ok());
    }
}
