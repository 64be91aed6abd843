//! Per-site extraction adapters.
//!
//! An adapter knows where a marketplace's search lives, what its rendered
//! results look like and how to read items out of them. Extraction runs as a
//! script inside the page that returns plain JSON; turning that JSON into
//! [`Item`]s happens here, in Rust, so it can be tested without a browser.

mod mercari;
mod overlay;
mod vinted;

pub use mercari::Mercari;
pub use overlay::{parse_overlay_title, OverlayTitle};
pub use vinted::Vinted;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::app::{Result, TrawlerError};
use crate::browser::BrowserSession;
use crate::domain::{Item, ItemDetail, Pagination, Query, Site};

/// Site-specific knowledge the task engine needs.
pub trait SiteAdapter: Send + Sync {
    fn pagination(&self) -> Pagination;

    /// Search endpoint without a query string.
    fn search_endpoint(&self) -> &str;

    /// Query-string parameter that carries the search text.
    fn query_param(&self) -> &str;

    /// Element whose presence means search results have rendered.
    fn content_selector(&self) -> &str;

    fn content_timeout(&self) -> Duration;

    /// Overlays (cookie consent, region pickers) to dismiss when present.
    fn interstitials(&self) -> &[&str] {
        &[]
    }

    /// "Next page" control for page-paginated sites.
    fn next_page_selector(&self) -> Option<&str> {
        None
    }

    /// One result card. Used to tell a freshly loaded page from the one just
    /// left, since the content container itself may survive navigation.
    fn card_selector(&self) -> Option<&str> {
        None
    }

    /// Script evaluated in the results page; returns a JSON array of raw items.
    fn listing_script(&self) -> &str;

    fn parse_listing(&self, raw: Value) -> Result<Vec<Item>>;

    /// Element whose presence means an item's own page has rendered. `None`
    /// when the site has no detail-page support.
    fn detail_content_selector(&self) -> Option<&str> {
        None
    }

    fn detail_timeout(&self) -> Duration {
        self.content_timeout()
    }

    fn detail_script(&self) -> Option<&str> {
        None
    }

    fn parse_detail(&self, _raw: Value) -> Result<ItemDetail> {
        Ok(ItemDetail::default())
    }

    fn search_url(&self, query: &Query) -> Result<Url> {
        search_url(self.search_endpoint(), self.query_param(), query)
    }
}

/// `endpoint?param=<keyword> -<filter>...`, URL-encoded.
pub fn search_url(endpoint: &str, param: &str, query: &Query) -> Result<Url> {
    let url = Url::parse_with_params(endpoint, &[(param, query.search_text())])?;
    Ok(url)
}

/// Reads the raw items currently rendered in the session.
pub async fn extract(
    adapter: &dyn SiteAdapter,
    session: &mut dyn BrowserSession,
) -> Result<Vec<Item>> {
    let raw = session.evaluate(adapter.listing_script()).await?;
    adapter.parse_listing(raw)
}

/// Reads extra fields from an item page the session is showing. `None` when
/// the adapter has no detail support.
pub async fn extract_detail(
    adapter: &dyn SiteAdapter,
    session: &mut dyn BrowserSession,
) -> Result<Option<ItemDetail>> {
    let Some(script) = adapter.detail_script() else {
        return Ok(None);
    };
    let raw = session.evaluate(script).await?;
    adapter.parse_detail(raw).map(Some)
}

/// Parses the JSON array a listing script returns into typed raw records.
/// Malformed entries are an extraction error; missing fields are not.
pub(crate) fn parse_array<T: serde::de::DeserializeOwned>(raw: Value) -> Result<Vec<T>> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(raw)
            .map_err(|e| TrawlerError::Extraction(format!("Unexpected listing shape: {}", e))),
        other => Err(TrawlerError::Extraction(format!(
            "Listing script returned {} instead of an array",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Drops the query string, which only carries tracking parameters.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Maps each [`Site`] to its adapter.
#[derive(Clone)]
pub struct SiteRegistry {
    adapters: HashMap<Site, Arc<dyn SiteAdapter>>,
}

impl SiteRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, site: Site, adapter: Arc<dyn SiteAdapter>) {
        self.adapters.insert(site, adapter);
    }

    pub fn get(&self, site: Site) -> Result<Arc<dyn SiteAdapter>> {
        self.adapters
            .get(&site)
            .cloned()
            .ok_or_else(|| TrawlerError::Config(format!("No adapter registered for {}", site)))
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Site::Mercari, Arc::new(Mercari));
        registry.register(Site::Vinted, Arc::new(Vinted));
        registry
    }
}
