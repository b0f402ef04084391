use crate::payload::PayloadBuilder;
use crate::ApiTransport;
use serde::Deserialize;
use std::time::Duration;
use webintel_core::{Error, Result};

// The API enforces its own wait cap (the `timeout` payload field); this is
// the outer bound on the HTTP call itself.
pub const CRAWL_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_depth: u32,
    pub max_breadth: u32,
    pub limit: u32,
    /// One of: basic, advanced.
    pub extract_depth: String,
    /// One of: markdown, text.
    pub format: String,
    pub allow_external: bool,
    /// Server-side wait cap, seconds.
    pub timeout_s: u32,
    pub instructions: Option<String>,
    pub chunks_per_source: Option<u32>,
    pub select_paths: Option<Vec<String>>,
    pub exclude_paths: Option<Vec<String>>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_breadth: 20,
            limit: 50,
            extract_depth: "basic".to_string(),
            format: "markdown".to_string(),
            allow_external: true,
            timeout_s: 150,
            instructions: None,
            chunks_per_source: None,
            select_paths: None,
            exclude_paths: None,
        }
    }
}

pub fn crawl_payload(url: &str, opts: &CrawlOptions) -> serde_json::Value {
    PayloadBuilder::new()
        .required("url", url)
        .required("max_depth", opts.max_depth)
        .required("max_breadth", opts.max_breadth)
        .required("limit", opts.limit)
        .required("extract_depth", opts.extract_depth.as_str())
        .required("format", opts.format.as_str())
        .required("allow_external", opts.allow_external)
        .required("timeout", opts.timeout_s)
        .optional("instructions", opts.instructions.clone())
        .optional("chunks_per_source", opts.chunks_per_source)
        .optional("select_paths", opts.select_paths.clone())
        .optional("exclude_paths", opts.exclude_paths.clone())
        .build()
}

#[derive(Debug, Clone)]
pub struct CrawlPage {
    pub url: String,
    pub raw_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub base_url: String,
    pub pages: Vec<CrawlPage>,
    pub response_time: Option<f64>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CrawlResponseWire {
    base_url: Option<String>,
    #[serde(default)]
    results: Vec<CrawlResultWire>,
    response_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CrawlResultWire {
    url: Option<String>,
    raw_content: Option<String>,
}

pub async fn crawl<T: ApiTransport + ?Sized>(
    transport: &T,
    url: &str,
    opts: &CrawlOptions,
) -> Result<CrawlOutput> {
    let payload = crawl_payload(url, opts);
    let body = transport.post_json("crawl", &payload, CRAWL_TIMEOUT).await?;
    parse_crawl(body)
}

fn parse_crawl(body: serde_json::Value) -> Result<CrawlOutput> {
    let wire: CrawlResponseWire =
        serde_json::from_value(body.clone()).map_err(|e| Error::BadResponse(e.to_string()))?;
    let pages = wire
        .results
        .into_iter()
        .filter_map(|r| {
            let url = r.url?;
            Some(CrawlPage {
                url,
                raw_content: r.raw_content,
            })
        })
        .collect();
    Ok(CrawlOutput {
        base_url: wire.base_url.unwrap_or_default(),
        pages,
        response_time: wire.response_time,
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_omits_unset_path_filters() {
        let v = crawl_payload("https://docs.example.com", &CrawlOptions::default());
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 8);
        assert_eq!(v["url"], "https://docs.example.com");
        assert_eq!(v["max_depth"], 1);
        assert_eq!(v["allow_external"], true);
        assert_eq!(v["timeout"], 150);
        assert!(!obj.contains_key("instructions"));
        assert!(!obj.contains_key("select_paths"));
    }

    #[test]
    fn parses_minimal_crawl_shape() {
        let body = serde_json::json!({
            "base_url": "https://docs.example.com",
            "results": [
                {"url": "https://docs.example.com/a", "raw_content": "# A"},
                {"url": "https://docs.example.com/b"}
            ],
            "response_time": 12.5
        });
        let out = parse_crawl(body).unwrap();
        assert_eq!(out.base_url, "https://docs.example.com");
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.pages[0].raw_content.as_deref(), Some("# A"));
        assert_eq!(out.pages[1].raw_content, None);
        assert_eq!(out.response_time, Some(12.5));
    }
}
