use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use exam_core::Clock;
use exam_core::model::Catalog;
use reqwest::Client;
use reqwest::header::CACHE_CONTROL;
use url::Url;

use crate::error::CatalogLoadError;

/// File name of the question bank next to the exam page.
pub const DEFAULT_CATALOG_FILE: &str = "questions.json";

/// Where the question bank comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(Url),
}

impl CatalogSource {
    /// `http(s)://` locations become URLs; anything else is a file path.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError::InvalidUrl` for a malformed http(s) location.
    pub fn parse(raw: &str) -> Result<Self, CatalogLoadError> {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(Self::Url(Url::parse(trimmed)?));
        }
        Ok(Self::File(PathBuf::from(trimmed)))
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// URL of `file_name` in the same directory as `page`.
///
/// Works for pages served from a sub-folder (`/exam/index.html` resolves to
/// `/exam/questions.json`). Query and fragment of the page are dropped.
///
/// # Errors
///
/// Returns `url::ParseError` if `file_name` cannot be joined onto the page URL.
pub fn resolve_catalog_url(page: &Url, file_name: &str) -> Result<Url, url::ParseError> {
    let mut base = page.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.join(file_name)
}

/// Append a `v=<unix millis>` query parameter so caches never serve a stale bank.
#[must_use]
pub fn with_cache_buster(url: &Url, now: DateTime<Utc>) -> Url {
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("v", &now.timestamp_millis().to_string());
    busted
}

/// Fetches and validates question banks from disk or over HTTP.
#[derive(Clone)]
pub struct CatalogLoader {
    client: Client,
    clock: Clock,
}

impl CatalogLoader {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            client: Client::new(),
            clock,
        }
    }

    /// Load and validate the catalog at `source`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError` for I/O, HTTP, status, or validation failures.
    pub async fn load(&self, source: &CatalogSource) -> Result<Catalog, CatalogLoadError> {
        let raw = match source {
            CatalogSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CatalogLoadError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            CatalogSource::Url(url) => self.fetch(url).await?,
        };

        let catalog = Catalog::from_json(&raw)?;
        tracing::info!(
            source = %source,
            sections = catalog.sections().len(),
            questions = catalog.question_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    async fn fetch(&self, url: &Url) -> Result<String, CatalogLoadError> {
        let url = with_cache_buster(url, self.clock.now());
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogLoadError::HttpStatus(response.status()));
        }

        Ok(response.text().await?)
    }
}
