use crate::payload::PayloadBuilder;
use crate::ApiTransport;
use serde::Deserialize;
use std::time::Duration;
use webintel_core::{Error, ExtractFailure, ExtractOutcome, PageExtract, Result, Usage};

pub const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// The API rejects batches larger than this; the CLI checks before calling.
pub const MAX_URLS_PER_REQUEST: usize = 20;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// One of: basic, advanced.
    pub depth: String,
    pub include_images: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            depth: "basic".to_string(),
            include_images: false,
        }
    }
}

pub fn extract_payload(urls: &[String], opts: &ExtractOptions) -> serde_json::Value {
    PayloadBuilder::new()
        .required("urls", urls.to_vec())
        .required("extract_depth", opts.depth.as_str())
        .required("include_images", opts.include_images)
        .build()
}

#[derive(Debug, Clone)]
pub struct ExtractOutput {
    /// Successes first (response order), then per-URL failures in the
    /// order the API reported them.
    pub outcomes: Vec<ExtractOutcome>,
    pub usage: Usage,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ExtractResponseWire {
    #[serde(default)]
    results: Vec<ExtractResultWire>,
    #[serde(default)]
    failed_results: Vec<FailedResultWire>,
    usage: Option<UsageWire>,
}

#[derive(Debug, Deserialize)]
struct ExtractResultWire {
    url: Option<String>,
    raw_content: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FailedResultWire {
    url: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageWire {
    credits: Option<f64>,
}

pub async fn extract<T: ApiTransport + ?Sized>(
    transport: &T,
    urls: &[String],
    opts: &ExtractOptions,
) -> Result<ExtractOutput> {
    let payload = extract_payload(urls, opts);
    let body = transport
        .post_json("extract", &payload, EXTRACT_TIMEOUT)
        .await?;
    parse_extract(body)
}

fn parse_extract(body: serde_json::Value) -> Result<ExtractOutput> {
    let wire: ExtractResponseWire =
        serde_json::from_value(body.clone()).map_err(|e| Error::BadResponse(e.to_string()))?;

    let mut outcomes = Vec::new();
    for r in wire.results {
        let Some(url) = r.url else { continue };
        outcomes.push(ExtractOutcome::Success(PageExtract {
            url,
            raw_content: r.raw_content.unwrap_or_default(),
            images: r.images,
        }));
    }
    for f in wire.failed_results {
        let Some(url) = f.url else { continue };
        outcomes.push(ExtractOutcome::Failure(ExtractFailure {
            url,
            error: f.error.unwrap_or_else(|| "unknown error".to_string()),
        }));
    }

    let usage = match wire.usage.and_then(|u| u.credits) {
        Some(c) => Usage::of("credits", c),
        None => Usage::default(),
    };

    Ok(ExtractOutput {
        outcomes,
        usage,
        raw: body,
    })
}
