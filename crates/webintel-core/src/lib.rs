use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing API credential")]
    MissingCredential,
    #[error("transport failure: {cause}")]
    Transport { cause: String, timed_out: bool },
    #[error("API error {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("malformed API response: {0}")]
    BadResponse(String),
}

impl Error {
    /// True when the failure was the request deadline expiring, as opposed
    /// to a name-resolution or connection problem. Callers that want to
    /// retry at a higher level can branch on this; nothing in this crate
    /// retries on its own.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport { timed_out: true, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// One ranked search result. `full_content` stays `None` until (and unless)
/// a matching extraction success is merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Relevance in 0.0..=1.0 when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Short snippet (`content` on the wire).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub images: Vec<String>,
}

impl SearchHit {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            score: None,
            snippet: None,
            full_content: None,
            images: Vec::new(),
        }
    }
}

/// Successful extraction of one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageExtract {
    pub url: String,
    pub raw_content: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub images: Vec<String>,
}

/// A per-URL extraction failure, reported by the API or synthesized when
/// the whole extraction call was unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractFailure {
    pub url: String,
    pub error: String,
}

/// Outcome of stage 2 for one requested URL. Produced once; never retried
/// or merged with another outcome for the same URL.
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    Success(PageExtract),
    Failure(ExtractFailure),
}

impl ExtractOutcome {
    pub fn url(&self) -> &str {
        match self {
            ExtractOutcome::Success(p) => &p.url,
            ExtractOutcome::Failure(f) => &f.url,
        }
    }
}

/// Credit/usage counters keyed by metric name (e.g. `search_credits`).
/// Only ever combined additively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usage(pub BTreeMap<String, f64>);

impl Usage {
    pub fn of(metric: impl Into<String>, count: f64) -> Self {
        let mut m = BTreeMap::new();
        m.insert(metric.into(), count);
        Usage(m)
    }

    pub fn get(&self, metric: &str) -> f64 {
        self.0.get(metric).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Per-metric sum. A metric present on only one side carries through
    /// unchanged; an absent second stage contributes zero to every metric,
    /// so `combine(a, None) == a`.
    pub fn combine(mut a: Usage, b: Option<Usage>) -> Usage {
        if let Some(b) = b {
            for (k, v) in b.0 {
                *a.0.entry(k).or_insert(0.0) += v;
            }
        }
        a
    }
}

/// Top-level output of the deep-search workflow. Built once per run and
/// handed to the rendering layer; nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DeepSearchReport {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub results: Vec<SearchHit>,
    pub failed_extractions: Vec<ExtractFailure>,
    pub usage: Usage,
}

/// Merge extraction outcomes into the search hits they were derived from.
///
/// Walks `primary` in its original order and attaches `raw_content` (and
/// images) from any matching `Success` outcome; all other hit fields are
/// left untouched. `Failure` outcomes pass through to the returned failure
/// list in arrival order, without removing or altering the matching hit —
/// a hit whose extraction failed keeps its snippet. A `Success` whose URL
/// matches no hit is recorded as an orphan failure rather than dropped;
/// current callers only request URLs taken from `primary`, so that path is
/// defensive.
///
/// Every secondary outcome lands in exactly one place: merged into a hit
/// or appended to the failure list. Hits are never duplicated or dropped.
pub fn merge_extractions(
    primary: Vec<SearchHit>,
    secondary: Vec<ExtractOutcome>,
) -> (Vec<SearchHit>, Vec<ExtractFailure>) {
    let mut merged = primary;
    let mut failures = Vec::new();
    let mut extracted: BTreeMap<String, PageExtract> = BTreeMap::new();

    for outcome in secondary {
        match outcome {
            ExtractOutcome::Success(page) => {
                if merged.iter().any(|h| h.url == page.url) {
                    extracted.insert(page.url.clone(), page);
                } else {
                    failures.push(ExtractFailure {
                        url: page.url,
                        error: "no matching search result for extracted URL".to_string(),
                    });
                }
            }
            ExtractOutcome::Failure(f) => failures.push(f),
        }
    }

    for hit in &mut merged {
        if let Some(page) = extracted.remove(&hit.url) {
            hit.full_content = Some(page.raw_content);
            if !page.images.is_empty() {
                hit.images = page.images;
            }
        }
    }

    (merged, failures)
}
