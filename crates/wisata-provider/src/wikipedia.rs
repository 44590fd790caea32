//! Encyclopedia lookups for the city explorer.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use wisata_core::text::title_case;

use crate::error::ProviderError;

/// Sentence terminator followed by whitespace or end of text.
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+(\s+|$)").expect("valid sentence regex")
});

/// Short encyclopedic descriptions of places.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// The first `sentences` sentences of the article about `title`.
    async fn summary(&self, title: &str, sentences: usize) -> Result<String, ProviderError>;
}

/// Wikipedia client: REST `page/summary/{title}` for descriptions and the
/// action API for the links of a disambiguation page.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    site_url: String,
}

impl WikipediaClient {
    /// Client for the given language edition, e.g. `id` or `en`.
    pub fn new(lang: &str) -> Self {
        Self::with_site_url(format!("https://{lang}.wikipedia.org"))
    }

    /// Client for a wiki rooted at `site_url` (no trailing `/api/...`).
    pub fn with_site_url(site_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent("wisata/0.1")
                .build()
                .unwrap_or_default(),
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn page_summary(&self, page: &str) -> Result<SummaryResponse, ProviderError> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.site_url,
            urlencoding::encode(&page.replace(' ', "_"))
        );
        debug!(%url, "wikipedia summary");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(page.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// First article linked from a disambiguation page.
    async fn first_option(&self, page: &str) -> Result<String, ProviderError> {
        let url = format!("{}/w/api.php", self.site_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("action", "query"),
                ("prop", "links"),
                ("titles", page),
                ("plnamespace", "0"),
                ("pllimit", "20"),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let body: LinksResponse = resp.json().await?;
        body.query
            .pages
            .into_iter()
            .flat_map(|p| p.links)
            .map(|l| l.title)
            .find(|t| !t.trim().is_empty())
            .ok_or_else(|| ProviderError::NotFound(page.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    extract: String,
}

impl SummaryResponse {
    fn is_disambiguation(&self) -> bool {
        self.kind == "disambiguation"
    }
}

#[derive(Debug, Default, Deserialize)]
struct LinksResponse {
    #[serde(default)]
    query: LinksQuery,
}

#[derive(Debug, Default, Deserialize)]
struct LinksQuery {
    #[serde(default)]
    pages: Vec<LinksPage>,
}

#[derive(Debug, Deserialize)]
struct LinksPage {
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    /// A disambiguation page is answered with the summary of its first
    /// linked article; only if that fails too is the title not found.
    async fn summary(&self, title: &str, sentences: usize) -> Result<String, ProviderError> {
        let page = title_case(title.trim());
        if page.is_empty() {
            return Err(ProviderError::NotFound(title.to_string()));
        }

        let mut body = self.page_summary(&page).await?;
        if body.is_disambiguation() {
            let resolved = match self.first_option(&page).await {
                Ok(option) => {
                    debug!(%page, %option, "disambiguation resolved to first option");
                    self.page_summary(&option).await.ok()
                }
                Err(e) => {
                    debug!(%page, error = %e, "disambiguation has no usable option");
                    None
                }
            };
            body = resolved
                .filter(|b| !b.is_disambiguation())
                .ok_or_else(|| ProviderError::NotFound(title.to_string()))?;
        }

        if body.extract.trim().is_empty() {
            return Err(ProviderError::NotFound(title.to_string()));
        }
        Ok(first_sentences(&body.extract, sentences))
    }
}

/// Keep the first `n` sentences of `text`; the whole text if it has fewer.
pub fn first_sentences(text: &str, n: usize) -> String {
    let text = text.trim();
    if n == 0 {
        return String::new();
    }
    match SENTENCE_END.find_iter(text).nth(n - 1) {
        Some(m) => text[..m.end()].trim_end().to_string(),
        None => text.to_string(),
    }
}
