use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};

use wikisearch_base::pal::http::HttpServerConfig;
use wikisearch_base::{FilePath, Pal, ResultExt, WikiSearchResult, err};

/// Name of the configuration file looked up when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "wikisearch.toml";

/// Configuration for a wikisearch server, read from `wikisearch.toml`.
///
/// Every field is optional in the file:
///
/// ```toml
/// host = "0.0.0.0"
/// port = 8080
/// document_root = "public"
/// index_file = "index.json"
/// io_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on, 0 for an OS-assigned port.
    pub port: u16,
    /// Directory static files are served from.
    pub document_root: PathBuf,
    /// JSON index loaded at startup. Without one every search is empty.
    pub index_file: Option<PathBuf>,
    /// Read/write timeout for accepted connections, in milliseconds.
    pub io_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            document_root: PathBuf::from("."),
            index_file: None,
            io_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> WikiSearchResult<Self> {
        toml::from_str(text).map_err(|e| err!("Invalid configuration: {}", e))
    }

    /// Socket settings for the listener.
    pub fn http_config(&self) -> HttpServerConfig {
        let config = HttpServerConfig::new(self.host.clone()).with_port(self.port);
        match self.io_timeout_ms {
            Some(ms) => config.with_io_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

/// Read and parse a configuration file through the PAL.
#[instrument(skip(pal), fields(path = %path))]
pub fn load_config(pal: &dyn Pal, path: &FilePath) -> WikiSearchResult<ServerConfig> {
    let text = pal
        .read_file_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path))?;
    ServerConfig::from_toml(&text).with_context(|| format!("Failed to load configuration {}", path))
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(pal: &dyn Pal, path: &FilePath) -> WikiSearchResult<ServerConfig> {
    if pal.file_exists(path)? {
        load_config(pal, path)
    } else {
        debug!(%path, "no configuration file, using defaults");
        Ok(ServerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use wikisearch_base::MockPal;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.http_config().address(), "0.0.0.0:80");
        assert_eq!(config.http_config().io_timeout, None);
    }

    #[test]
    fn test_full_config() {
        let config = ServerConfig::from_toml(
            r#"
            host = "127.0.0.1"
            port = 8080
            document_root = "public"
            index_file = "index.json"
            io_timeout_ms = 1500
            "#,
        )
        .unwrap();
        expect![[r#"
            ServerConfig {
                host: "127.0.0.1",
                port: 8080,
                document_root: "public",
                index_file: Some(
                    "index.json",
                ),
                io_timeout_ms: Some(
                    1500,
                ),
            }
        "#]]
        .assert_debug_eq(&config);
        assert_eq!(
            config.http_config().io_timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = ServerConfig::from_toml("prot = 8080").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_port_out_of_range_is_rejected() {
        assert!(ServerConfig::from_toml("port = 70000").is_err());
    }

    #[test]
    fn test_load_config_through_pal() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("wikisearch.toml"), b"port = 9000".to_vec());

        let config = load_config(&pal, &FilePath::from("wikisearch.toml")).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_load_config_missing_file_is_error() {
        let pal = MockPal::new();
        let err = load_config(&pal, &FilePath::from("wikisearch.toml")).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Failed to read configuration wikisearch.toml")
        );
    }

    #[test]
    fn test_load_config_or_default() {
        let pal = MockPal::new();
        let path = FilePath::from(DEFAULT_CONFIG_FILE);
        assert_eq!(
            load_config_or_default(&pal, &path).unwrap(),
            ServerConfig::default()
        );

        pal.add_file(path.clone(), b"host = \"::1\"".to_vec());
        assert_eq!(load_config_or_default(&pal, &path).unwrap().host, "::1");
    }
}
