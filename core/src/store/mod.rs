use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, SourceError};

mod fetch;

pub use fetch::{DatasetFetcher, FetchError, HttpFetcher};

/// The reference dataset the original deployment ships with: one polygon
/// per North Carolina zip code.
pub const DEFAULT_DATASET_URL: &str = "https://raw.githubusercontent.com/OpenDataDE/State-zip-code-GeoJSON/master/nc_north_carolina_zip_codes_geo.min.json";

/// A normalized zip-code identifier: trimmed and left-padded with `'0'` to
/// 5 characters, so `28277`, `"28277"` and `" 28277 "` all compare equal.
/// Construction always normalizes; there is no other way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    pub fn new(raw: impl fmt::Display) -> Self {
        Self(format!("{:0>5}", raw.to_string().trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The result of resolving a zip code against the reference dataset.
///
/// `found == false` together with `geometry == None` means the identifier
/// has no entry in the dataset, which is a normal outcome rather than an
/// error. Records are immutable value objects keyed by `zip_code`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipRecord {
    pub zip_code: ZipCode,
    /// The entry's original GeoJSON geometry, handed back verbatim so the
    /// map layer can render it directly.
    pub geometry: Option<Value>,
    pub found: bool,
}

impl ZipRecord {
    pub fn hit(zip_code: ZipCode, geometry: Option<Value>) -> Self {
        Self {
            zip_code,
            geometry,
            found: true,
        }
    }

    pub fn miss(zip_code: ZipCode) -> Self {
        Self {
            zip_code,
            geometry: None,
            found: false,
        }
    }
}

/// One `{zip_code, geometry}` pair from the reference dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry {
    pub zip_code: ZipCode,
    pub geometry: Option<Value>,
}

/// The parsed reference dataset: an ordered, read-only sequence of zip-code
/// polygons. Entries keep the document's original order, which is the order
/// match results are reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    entries: Vec<DatasetEntry>,
}

impl Dataset {
    /// Builds a dataset directly from entries, bypassing the wire format.
    pub fn from_entries(entries: Vec<DatasetEntry>) -> Self {
        Self { entries }
    }

    /// Parses the remote FeatureCollection document. Features without a
    /// usable zip identifier are dropped; a document that is not valid
    /// JSON or lacks the `features` field is a parse error.
    pub fn parse(body: &[u8]) -> Result<Self, SourceError> {
        let document: FeatureCollection = serde_json::from_slice(body)?;

        let entries = document
            .features
            .into_iter()
            .filter_map(|feature| {
                let zip_code = feature.properties.as_ref().and_then(Properties::zip_code)?;
                Some(DatasetEntry {
                    zip_code,
                    geometry: feature.geometry,
                })
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Option<Properties>,
    geometry: Option<Value>,
}

#[derive(Deserialize)]
struct Properties {
    #[serde(rename = "ZCTA5CE10")]
    zcta: Option<Value>,
    zip: Option<Value>,
}

impl Properties {
    /// The census `ZCTA5CE10` attribute wins over the plain `zip` field.
    /// Either may arrive as a JSON string or number.
    fn zip_code(&self) -> Option<ZipCode> {
        raw_identifier(self.zcta.as_ref()).or_else(|| raw_identifier(self.zip.as_ref()))
    }
}

fn raw_identifier(value: Option<&Value>) -> Option<ZipCode> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(ZipCode::new(s)),
        Value::Number(n) => Some(ZipCode::new(n)),
        _ => None,
    }
}

/// Loads and caches the reference dataset.
///
/// The cache is populated lazily by the first [`load`](Self::load) and then
/// lives for the store's lifetime; there is no eviction or refresh, the
/// dataset is static per deployment. Concurrent first loads collapse into a
/// single fetch: all callers await the same in-flight initialization. A
/// failed load is not cached, so a later call retries.
pub struct GeometryStore {
    url: String,
    fetcher: Arc<dyn DatasetFetcher>,
    cache: OnceCell<Arc<Dataset>>,
}

impl GeometryStore {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn DatasetFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
            cache: OnceCell::new(),
        }
    }

    /// A store reading the bundled dataset URL over HTTP.
    pub fn with_default_source() -> Self {
        Self::new(DEFAULT_DATASET_URL, Arc::new(HttpFetcher::new()))
    }

    /// Returns the cached dataset, fetching and parsing it on first use.
    pub async fn load(&self) -> Result<Arc<Dataset>, Error> {
        let dataset = self
            .cache
            .get_or_try_init(|| async {
                debug!(url = %self.url, "fetching reference dataset");
                let body =
                    self.fetcher
                        .fetch(&self.url)
                        .await
                        .map_err(|err| SourceError::Fetch {
                            url: self.url.clone(),
                            message: err.to_string(),
                        })?;
                let dataset = Dataset::parse(&body)?;
                debug!(entries = dataset.len(), "reference dataset cached");
                Ok::<_, SourceError>(Arc::new(dataset))
            })
            .await
            .map_err(Error::SourceUnavailable)?;

        Ok(Arc::clone(dataset))
    }

    /// Resolves a single zip code against the dataset. A missing identifier
    /// yields a `found == false` record, never an error; only a dataset
    /// load failure propagates.
    pub async fn lookup(&self, zip: impl fmt::Display) -> Result<ZipRecord, Error> {
        let zip = ZipCode::new(zip);
        let dataset = self.load().await?;

        match dataset.entries().iter().find(|e| e.zip_code == zip) {
            Some(entry) => Ok(ZipRecord::hit(entry.zip_code.clone(), entry.geometry.clone())),
            None => Ok(ZipRecord::miss(zip)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{Dataset, DatasetFetcher, FetchError, GeometryStore, ZipCode, ZipRecord};
    use crate::error::Error;

    /// Serves a fixed document and counts how many times it was asked.
    struct StaticFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn new(body: impl Into<Vec<u8>>) -> Self {
            Self {
                body: body.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DatasetFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    /// Fails the first request, then serves the document.
    struct FlakyFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DatasetFetcher for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(FetchError::new("connection refused"))
            } else {
                Ok(self.body.clone())
            }
        }
    }

    fn sample_document() -> Vec<u8> {
        json!({
            "features": [
                {
                    "properties": { "ZCTA5CE10": "28277" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-80.9, 35.0], [-80.7, 35.0], [-80.7, 35.2], [-80.9, 35.2]]],
                    },
                },
                {
                    "properties": { "zip": 601 },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-66.3, 18.1], [-66.2, 18.1], [-66.2, 18.2]]],
                    },
                },
                {
                    "properties": { "name": "no identifier here" },
                    "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]] },
                },
            ],
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn zip_codes_normalize_identically() {
        assert_eq!(ZipCode::new(28277), ZipCode::new("28277"));
        assert_eq!(ZipCode::new(" 28277 "), ZipCode::new("28277"));
        assert_eq!(ZipCode::new(28277).as_str(), "28277");
    }

    #[test]
    fn short_codes_are_left_padded() {
        assert_eq!(ZipCode::new(601).as_str(), "00601");
        assert_eq!(ZipCode::new("601").as_str(), "00601");
    }

    #[test]
    fn over_long_codes_are_kept() {
        assert_eq!(ZipCode::new("123456").as_str(), "123456");
    }

    #[test]
    fn parse_extracts_entries_in_document_order() {
        let dataset = Dataset::parse(&sample_document()).unwrap();
        let zips: Vec<&str> = dataset
            .entries()
            .iter()
            .map(|e| e.zip_code.as_str())
            .collect();

        // The identifier-less feature is dropped; numeric zips are padded.
        assert_eq!(zips, vec!["28277", "00601"]);
    }

    #[test]
    fn parse_rejects_documents_without_features() {
        assert!(Dataset::parse(b"{\"type\": \"FeatureCollection\"}").is_err());
        assert!(Dataset::parse(b"not json at all").is_err());
    }

    #[tokio::test]
    async fn lookup_hit_and_miss() -> anyhow::Result<()> {
        let store = GeometryStore::new(
            "http://test/dataset.json",
            Arc::new(StaticFetcher::new(sample_document())),
        );

        let hit = store.lookup("28277").await?;
        assert!(hit.found);
        assert!(hit.geometry.is_some());
        assert_eq!(hit.zip_code.as_str(), "28277");

        let miss = store.lookup("99999").await?;
        assert_eq!(miss, ZipRecord::miss(ZipCode::new("99999")));
        Ok(())
    }

    #[tokio::test]
    async fn lookup_normalizes_its_input() {
        let store = GeometryStore::new(
            "http://test/dataset.json",
            Arc::new(StaticFetcher::new(sample_document())),
        );

        assert!(store.lookup(" 28277 ").await.unwrap().found);
        assert!(store.lookup(601).await.unwrap().found);
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_fetch() -> anyhow::Result<()> {
        let fetcher = Arc::new(StaticFetcher::new(sample_document()));
        let store = GeometryStore::new(
            "http://test/dataset.json",
            Arc::clone(&fetcher) as Arc<dyn DatasetFetcher>,
        );

        let (a, b, c) = tokio::join!(store.load(), store.load(), store.load());
        let (a, b, c) = (a?, b?, c?);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));

        // A later call still hits the cache.
        let d = store.load().await?;
        assert!(Arc::ptr_eq(&a, &d));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let fetcher = Arc::new(FlakyFetcher {
            body: sample_document(),
            calls: AtomicUsize::new(0),
        });
        let store = GeometryStore::new(
            "http://test/dataset.json",
            Arc::clone(&fetcher) as Arc<dyn DatasetFetcher>,
        );

        let first = store.load().await;
        assert!(matches!(first, Err(Error::SourceUnavailable(_))));

        // The error was not cached; the retry fetches again and succeeds.
        let second = store.load().await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
