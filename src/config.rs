//! Engine configuration
//!
//! Values come from an optional JSON file, then `ETF_ALLOCATOR_*`
//! environment variables, then CLI flags (applied by the binary).

use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use crate::allocator::Allocator;
use crate::catalog::{Catalog, HttpCatalog, SnapshotCatalog};
use crate::criteria::DEFAULT_MAX_RESULTS;
use crate::error::{Error, Result};

pub const ENV_CATALOG: &str = "ETF_ALLOCATOR_CATALOG";
pub const ENV_API_CODE: &str = "ETF_ALLOCATOR_API_CODE";
pub const ENV_QUERY_TIMEOUT_MS: &str = "ETF_ALLOCATOR_QUERY_TIMEOUT_MS";
pub const ENV_MAX_RESULTS: &str = "ETF_ALLOCATOR_MAX_RESULTS";
pub const ENV_LOG: &str = "ETF_ALLOCATOR_LOG";

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// File path or `http(s)://` URL of the catalog snapshot.
    #[serde(default)]
    pub catalog: Option<String>,
    /// Sent as `X-API-Code` to HTTP catalogs.
    #[serde(default)]
    pub api_code: Option<String>,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            catalog: None,
            api_code: None,
            query_timeout_ms: default_query_timeout_ms(),
            max_results: default_max_results(),
            log_filter: default_log_filter(),
        }
    }
}

impl EngineConfig {
    /// Read `path` if given, then apply environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let contents = fs::read_to_string(p).map_err(|source| Error::Io {
                    path: p.to_string(),
                    source,
                })?;
                serde_json::from_str(&contents)?
            }
            None => EngineConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CATALOG) {
            self.catalog = Some(v);
        }
        if let Some(v) = lookup(ENV_API_CODE) {
            self.api_code = Some(v);
        }
        if let Some(v) = lookup(ENV_QUERY_TIMEOUT_MS) {
            self.query_timeout_ms = v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be an integer, got '{}'", ENV_QUERY_TIMEOUT_MS, v)))?;
        }
        if let Some(v) = lookup(ENV_MAX_RESULTS) {
            self.max_results = v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be an integer, got '{}'", ENV_MAX_RESULTS, v)))?;
        }
        if let Some(v) = lookup(ENV_LOG) {
            self.log_filter = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.query_timeout_ms == 0 {
            return Err(Error::Config("query_timeout_ms must be positive".into()));
        }
        if self.max_results == 0 {
            return Err(Error::Config("max_results must be positive".into()));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Build the catalog named by `catalog`: URLs get an `HttpCatalog`,
    /// anything else is loaded as a snapshot file.
    pub fn build_catalog(&self) -> Result<Arc<dyn Catalog>> {
        let source = self
            .catalog
            .as_deref()
            .ok_or_else(|| Error::Config(format!("no catalog configured (set {} or --catalog)", ENV_CATALOG)))?;

        if source.starts_with("http://") || source.starts_with("https://") {
            let catalog = HttpCatalog::new(source, self.api_code.clone())?.with_max_results(self.max_results);
            Ok(Arc::new(catalog))
        } else {
            let catalog = SnapshotCatalog::load(source)?.with_max_results(self.max_results);
            Ok(Arc::new(catalog))
        }
    }

    pub fn build_allocator(&self) -> Result<Allocator> {
        Ok(Allocator::new(self.build_catalog()?).with_query_timeout(self.query_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.query_timeout(), Duration::from_secs(2));
        assert_eq!(config.max_results, 100);
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"catalog": "snap.json"}"#).unwrap();
        assert_eq!(config.catalog.as_deref(), Some("snap.json"));
        assert_eq!(config.query_timeout_ms, 2000);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config: EngineConfig =
            serde_json::from_str(r#"{"catalog": "a.json", "max_results": 10}"#).unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_CATALOG, "https://example.test/catalog"),
            (ENV_MAX_RESULTS, " 25 "),
            (ENV_LOG, "debug"),
        ]
        .into_iter()
        .collect();

        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.catalog.as_deref(), Some("https://example.test/catalog"));
        assert_eq!(config.max_results, 25);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.query_timeout_ms, 2000);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(|k| (k == ENV_QUERY_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_zero_limits() {
        let config = EngineConfig {
            max_results: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builds_file_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"instruments": [{{"symbol": "AGG"}}]}}"#).unwrap();

        let config = EngineConfig {
            catalog: Some(file.path().to_string_lossy().into_owned()),
            ..EngineConfig::default()
        };
        assert!(config.build_allocator().is_ok());
    }

    #[test]
    fn missing_catalog_is_a_config_error() {
        let err = EngineConfig::default().build_catalog().err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
