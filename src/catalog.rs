//! Catalog collaborators the engine queries for candidate instruments
//!
//! This module handles:
//! - The `Catalog` seam the allocator depends on
//! - An in-memory snapshot catalog (from records, a JSON string or a file)
//! - An HTTP catalog that fetches a snapshot document per query

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

use crate::criteria::{SelectionCriteria, DEFAULT_MAX_RESULTS};
use crate::error::{Error, Result};
use crate::instrument::{CatalogSnapshot, InstrumentRecord};

const API_CODE_HEADER: &str = "X-API-Code";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of instrument records. Implementations apply the criteria (at the
/// source or as a post-filter) and cap the result size.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn query(&self, criteria: &SelectionCriteria) -> Result<Vec<InstrumentRecord>>;
}

/// Read-only records held in memory.
#[derive(Debug, Clone)]
pub struct SnapshotCatalog {
    records: Vec<InstrumentRecord>,
    max_results: usize,
}

impl SnapshotCatalog {
    pub fn new(records: Vec<InstrumentRecord>) -> Self {
        SnapshotCatalog {
            records,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(Self::new(CatalogSnapshot::from_json(contents)?.into_records()))
    }

    pub fn load(path: &str) -> Result<Self> {
        Ok(Self::new(CatalogSnapshot::load(path)?.into_records()))
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for SnapshotCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Catalog for SnapshotCatalog {
    async fn query(&self, criteria: &SelectionCriteria) -> Result<Vec<InstrumentRecord>> {
        let matched = criteria.apply(&self.records, self.max_results);
        debug!(matched = matched.len(), total = self.records.len(), "Snapshot query");
        Ok(matched)
    }
}

/// Fetches a `CatalogSnapshot` document from `url` on every query.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
    api_code: Option<String>,
    max_results: usize,
}

impl HttpCatalog {
    pub fn new(url: &str, api_code: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(HttpCatalog {
            client,
            url: url.to_string(),
            api_code,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(code) = &self.api_code {
            let value = HeaderValue::from_str(code)
                .map_err(|e| Error::Config(format!("invalid API code header: {}", e)))?;
            headers.insert(API_CODE_HEADER, value);
        }
        Ok(headers)
    }

    async fn fetch(&self) -> Result<Vec<InstrumentRecord>> {
        let resp = self
            .client
            .get(&self.url)
            .headers(self.headers()?)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(CatalogSnapshot::from_json(&text)?.into_records())
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn query(&self, criteria: &SelectionCriteria) -> Result<Vec<InstrumentRecord>> {
        let records = self.fetch().await?;
        let matched = criteria.apply(&records, self.max_results);
        debug!(url = %self.url, matched = matched.len(), total = records.len(), "HTTP query");
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    #[tokio::test]
    async fn snapshot_query_filters_and_caps() {
        let records: Vec<InstrumentRecord> = (0..150)
            .map(|i| InstrumentRecord::new(&format!("BND{}", i)).with_aum(1e9))
            .collect();
        let catalog = SnapshotCatalog::new(records);

        let all = catalog.query(&SelectionCriteria::new()).await.unwrap();
        assert_eq!(all.len(), DEFAULT_MAX_RESULTS);

        let bonds = catalog
            .with_max_results(5)
            .query(&SelectionCriteria::new().category(Category::Bonds))
            .await
            .unwrap();
        assert_eq!(bonds.len(), 5);
        assert_eq!(bonds[0].symbol, "BND0");
    }

    #[test]
    fn default_catalog_keeps_the_result_cap() {
        let catalog = SnapshotCatalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.max_results, DEFAULT_MAX_RESULTS);
    }

    #[tokio::test]
    async fn snapshot_from_json() {
        let catalog = SnapshotCatalog::from_json(
            r#"{"instruments": [{"symbol": "AGG"}, {"symbol": ""}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn rejects_unprintable_api_code() {
        let catalog = HttpCatalog::new("http://localhost:1/catalog", Some("bad\ncode".into())).unwrap();
        assert!(matches!(catalog.headers(), Err(Error::Config(_))));
    }
}
