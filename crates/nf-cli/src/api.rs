//! Outbound calls to the two metered APIs, gated by the quota tracker.
//!
//! Contract with the tracker: check before calling, record only after a
//! confirmed success. Failed or rejected calls never consume quota.

use std::fmt;

use serde::Deserialize;

use nf_store::{Clock, KvStore, QuotaTracker, StoreError};

pub const NEWS_IDENTITY: &str = "news";
pub const SUMMARY_IDENTITY: &str = "summary";

const NEWS_BASE_URL: &str = "https://newsdata.io/api/1/news";
const SUMMARY_API_URL: &str = "https://api.smmry.com/&SM_LENGTH=2";

/// The summary API accepts at most this much input.
const SUMMARY_INPUT_CHARS: usize = 2000;

#[derive(Debug)]
pub enum NewsApiError {
    /// The client-side quota refused the call before it was attempted.
    QuotaExhausted { reset_at_ms: u64 },
    /// Upstream 429: the server-side limit was hit despite our gate.
    RateLimited,
    Unauthorized,
    Forbidden,
    Http(u16),
    Upstream(String),
    Network(reqwest::Error),
    Store(StoreError),
}

impl NewsApiError {
    /// Whether this failure is a rate limit, ours or the server's.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            NewsApiError::QuotaExhausted { .. } | NewsApiError::RateLimited
        )
    }
}

impl fmt::Display for NewsApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsApiError::QuotaExhausted { reset_at_ms } => write!(
                f,
                "rate limit exceeded, resets at {}",
                nf_store::unix_ms_to_iso8601(*reset_at_ms)
            ),
            NewsApiError::RateLimited => write!(f, "API rate limit exceeded, try again later"),
            NewsApiError::Unauthorized => write!(f, "invalid API key"),
            NewsApiError::Forbidden => write!(f, "API access forbidden"),
            NewsApiError::Http(status) => write!(f, "HTTP error, status {status}"),
            NewsApiError::Upstream(msg) => write!(f, "news API error: {msg}"),
            NewsApiError::Network(e) => write!(f, "network error: {e}"),
            NewsApiError::Store(e) => write!(f, "quota tracker error: {e}"),
        }
    }
}

impl std::error::Error for NewsApiError {}

impl From<reqwest::Error> for NewsApiError {
    fn from(e: reqwest::Error) -> Self {
        NewsApiError::Network(e)
    }
}

impl From<StoreError> for NewsApiError {
    fn from(e: StoreError) -> Self {
        NewsApiError::Store(e)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsFilters {
    pub category: Option<String>,
    pub country: Option<String>,
    pub query: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsResponse {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    #[serde(default)]
    pub results: Vec<Article>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Article {
    pub article_id: String,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    sm_api_content: Option<String>,
}

/// Query-string parameters for a headline request. Size is capped at 10
/// articles per call to stretch the free tier.
fn build_params(api_key: &str, filters: &NewsFilters) -> Vec<(&'static str, String)> {
    let language = filters.language.clone().unwrap_or_else(|| "en".to_string());
    let mut params = vec![
        ("apikey", api_key.to_string()),
        ("language", language),
        ("size", "10".to_string()),
    ];
    if let Some(category) = &filters.category {
        params.push(("category", category.clone()));
    }
    if let Some(country) = &filters.country {
        params.push(("country", country.clone()));
    }
    if let Some(query) = &filters.query {
        params.push(("q", query.clone()));
    }
    params
}

/// Fetch headlines, gated by the `news` quota.
pub async fn fetch_news<S: KvStore, C: Clock>(
    client: &reqwest::Client,
    tracker: &mut QuotaTracker<S, C>,
    api_key: &str,
    filters: &NewsFilters,
) -> Result<NewsResponse, NewsApiError> {
    if !tracker.can_make_request(NEWS_IDENTITY)? {
        return Err(NewsApiError::QuotaExhausted {
            reset_at_ms: tracker.reset_time(NEWS_IDENTITY)?,
        });
    }

    let response = client
        .get(NEWS_BASE_URL)
        .query(&build_params(api_key, filters))
        .header("Accept", "application/json")
        .send()
        .await?;

    match response.status().as_u16() {
        429 => return Err(NewsApiError::RateLimited),
        401 => return Err(NewsApiError::Unauthorized),
        403 => return Err(NewsApiError::Forbidden),
        status if !(200..300).contains(&status) => return Err(NewsApiError::Http(status)),
        _ => {}
    }

    let data: NewsResponse = response.json().await?;
    if data.status != "success" {
        return Err(NewsApiError::Upstream(
            data.message.unwrap_or_else(|| "failed to fetch news".to_string()),
        ));
    }

    let persisted = tracker.record_success(NEWS_IDENTITY)?;
    if !persisted {
        tracing::warn!("news quota recorded in memory only");
    }
    Ok(data)
}

/// Summarize via the remote summary API, gated by the `summary` quota.
///
/// Total: quota exhaustion and every upstream failure fall back to the
/// local summarizer instead of erroring.
pub async fn summarize_article<S: KvStore, C: Clock>(
    client: &reqwest::Client,
    tracker: &mut QuotaTracker<S, C>,
    text: &str,
) -> String {
    match tracker.can_make_request(SUMMARY_IDENTITY) {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("summary quota exhausted, using local fallback");
            return nf_core::brief_summary(text);
        }
        Err(e) => {
            tracing::warn!("quota check failed ({e}), using local fallback");
            return nf_core::brief_summary(text);
        }
    }

    let input: String = text.chars().take(SUMMARY_INPUT_CHARS).collect();
    let response = match client
        .post(SUMMARY_API_URL)
        .form(&[("sm_api_input", input.as_str())])
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => response,
        Ok(_) | Err(_) => {
            tracing::info!("summary API unavailable, using local fallback");
            return nf_core::brief_summary(text);
        }
    };

    match response.json::<SummaryResponse>().await {
        Ok(SummaryResponse {
            sm_api_content: Some(content),
        }) if !content.is_empty() => {
            if let Ok(false) = tracker.record_success(SUMMARY_IDENTITY) {
                tracing::warn!("summary quota recorded in memory only");
            }
            content
        }
        _ => nf_core::brief_summary(text),
    }
}
