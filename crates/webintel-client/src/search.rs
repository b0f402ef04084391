use crate::payload::PayloadBuilder;
use crate::ApiTransport;
use serde::Deserialize;
use std::time::Duration;
use webintel_core::{Error, Result, SearchHit, Usage};

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs for the `search` endpoint. The first block is always sent (the
/// API treats them as explicit settings); the `Option` block is sent only
/// when supplied.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// One of: ultra-fast, fast, basic, advanced.
    pub depth: String,
    /// One of: general, news, finance.
    pub topic: String,
    pub max_results: usize,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
    /// Last-N-days filter (news/finance only).
    pub days: Option<u32>,
    /// One of: day, week, month, year.
    pub time_range: Option<String>,
    pub chunks_per_source: Option<u32>,
    pub include_domains: Option<Vec<String>>,
    pub exclude_domains: Option<Vec<String>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            depth: "basic".to_string(),
            topic: "general".to_string(),
            max_results: 5,
            include_answer: false,
            include_raw_content: false,
            include_images: false,
            days: None,
            time_range: None,
            chunks_per_source: None,
            include_domains: None,
            exclude_domains: None,
        }
    }
}

pub fn search_payload(query: &str, opts: &SearchOptions) -> serde_json::Value {
    PayloadBuilder::new()
        .required("query", query)
        .required("search_depth", opts.depth.as_str())
        .required("topic", opts.topic.as_str())
        .required("max_results", opts.max_results as u64)
        .required("include_answer", opts.include_answer)
        .required("include_raw_content", opts.include_raw_content)
        .required("include_images", opts.include_images)
        .optional("days", opts.days)
        .optional("time_range", opts.time_range.clone())
        .optional("chunks_per_source", opts.chunks_per_source)
        .optional("include_domains", opts.include_domains.clone())
        .optional("exclude_domains", opts.exclude_domains.clone())
        .build()
}

#[derive(Debug, Clone)]
pub struct SearchOutput {
    pub answer: Option<String>,
    pub results: Vec<SearchHit>,
    pub usage: Usage,
    /// The response exactly as the API sent it, for `--json` output.
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponseWire {
    #[serde(default)]
    results: Vec<SearchResultWire>,
    answer: Option<String>,
    usage: Option<UsageWire>,
}

#[derive(Debug, Deserialize)]
struct SearchResultWire {
    url: Option<String>,
    title: Option<String>,
    // The snippet field is named `content` on the wire.
    content: Option<String>,
    score: Option<f64>,
    raw_content: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UsageWire {
    credits: Option<f64>,
}

pub async fn search<T: ApiTransport + ?Sized>(
    transport: &T,
    query: &str,
    opts: &SearchOptions,
) -> Result<SearchOutput> {
    let payload = search_payload(query, opts);
    let body = transport.post_json("search", &payload, SEARCH_TIMEOUT).await?;
    parse_search(body)
}

fn parse_search(body: serde_json::Value) -> Result<SearchOutput> {
    let wire: SearchResponseWire =
        serde_json::from_value(body.clone()).map_err(|e| Error::BadResponse(e.to_string()))?;

    let results = wire
        .results
        .into_iter()
        .filter_map(|r| {
            let url = r.url?;
            Some(SearchHit {
                url,
                title: r.title,
                score: r.score,
                snippet: r.content,
                full_content: r.raw_content,
                images: r.images,
            })
        })
        .collect();

    let usage = match wire.usage.and_then(|u| u.credits) {
        Some(c) => Usage::of("credits", c),
        None => Usage::default(),
    };

    Ok(SearchOutput {
        answer: wire.answer,
        results,
        usage,
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_send_exactly_the_explicit_settings() {
        let v = search_payload("what is RAG", &SearchOptions::default());
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        assert_eq!(v["query"], "what is RAG");
        assert_eq!(v["search_depth"], "basic");
        assert_eq!(v["topic"], "general");
        assert_eq!(v["max_results"], 5);
        assert_eq!(v["include_answer"], false);
        assert!(!obj.contains_key("days"));
        assert!(!obj.contains_key("include_domains"));
    }

    #[test]
    fn payload_includes_supplied_filters() {
        let opts = SearchOptions {
            days: Some(7),
            time_range: Some("week".to_string()),
            include_domains: Some(vec!["docs.rs".to_string()]),
            ..SearchOptions::default()
        };
        let v = search_payload("q", &opts);
        assert_eq!(v["days"], 7);
        assert_eq!(v["time_range"], "week");
        assert_eq!(v["include_domains"], serde_json::json!(["docs.rs"]));
    }

    #[test]
    fn parses_minimal_search_shape() {
        let body = serde_json::json!({
            "results": [
                {"url": "https://example.com", "title": "Example", "content": "Hello", "score": 0.93}
            ],
            "answer": "An answer.",
            "usage": {"credits": 2}
        });
        let out = parse_search(body).unwrap();
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].url, "https://example.com");
        assert_eq!(out.results[0].snippet.as_deref(), Some("Hello"));
        assert_eq!(out.results[0].score, Some(0.93));
        assert_eq!(out.results[0].full_content, None);
        assert_eq!(out.answer.as_deref(), Some("An answer."));
        assert_eq!(out.usage.get("credits"), 2.0);
    }

    #[test]
    fn results_without_a_url_are_skipped() {
        let body = serde_json::json!({
            "results": [{"title": "no url"}, {"url": "https://a"}]
        });
        let out = parse_search(body).unwrap();
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].url, "https://a");
    }

    #[test]
    fn non_object_body_is_a_format_error() {
        let err = parse_search(serde_json::json!([1, 2, 3])).err().unwrap();
        assert!(matches!(err, Error::BadResponse(_)));
    }
}
