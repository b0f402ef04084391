use crate::payload::PayloadBuilder;
use crate::ApiTransport;
use serde::Deserialize;
use std::time::Duration;
use webintel_core::{Error, Result};

pub const MAP_TIMEOUT: Duration = Duration::from_secs(60);

/// URL discovery shares the crawl knobs minus the extraction ones.
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub max_depth: u32,
    pub max_breadth: u32,
    pub limit: u32,
    pub allow_external: bool,
    pub instructions: Option<String>,
    pub select_paths: Option<Vec<String>>,
    pub exclude_paths: Option<Vec<String>>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            max_breadth: 20,
            limit: 50,
            allow_external: true,
            instructions: None,
            select_paths: None,
            exclude_paths: None,
        }
    }
}

pub fn map_payload(url: &str, opts: &MapOptions) -> serde_json::Value {
    PayloadBuilder::new()
        .required("url", url)
        .required("max_depth", opts.max_depth)
        .required("max_breadth", opts.max_breadth)
        .required("limit", opts.limit)
        .required("allow_external", opts.allow_external)
        .optional("instructions", opts.instructions.clone())
        .optional("select_paths", opts.select_paths.clone())
        .optional("exclude_paths", opts.exclude_paths.clone())
        .build()
}

#[derive(Debug, Clone)]
pub struct MapOutput {
    pub base_url: String,
    pub urls: Vec<String>,
    pub response_time: Option<f64>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MapResponseWire {
    base_url: Option<String>,
    // Unlike crawl, map results are bare URL strings.
    #[serde(default)]
    results: Vec<String>,
    response_time: Option<f64>,
}

pub async fn map_site<T: ApiTransport + ?Sized>(
    transport: &T,
    url: &str,
    opts: &MapOptions,
) -> Result<MapOutput> {
    let payload = map_payload(url, opts);
    let body = transport.post_json("map", &payload, MAP_TIMEOUT).await?;
    parse_map(body)
}

fn parse_map(body: serde_json::Value) -> Result<MapOutput> {
    let wire: MapResponseWire =
        serde_json::from_value(body.clone()).map_err(|e| Error::BadResponse(e.to_string()))?;
    Ok(MapOutput {
        base_url: wire.base_url.unwrap_or_default(),
        urls: wire.results,
        response_time: wire.response_time,
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_has_no_extraction_fields() {
        let v = map_payload("https://example.com", &MapOptions::default());
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert!(!obj.contains_key("extract_depth"));
        assert!(!obj.contains_key("format"));
    }

    #[test]
    fn parses_minimal_map_shape() {
        let body = serde_json::json!({
            "base_url": "https://example.com",
            "results": ["https://example.com/a", "https://example.com/b"],
            "response_time": 3.2
        });
        let out = parse_map(body).unwrap();
        assert_eq!(out.urls.len(), 2);
        assert_eq!(out.urls[0], "https://example.com/a");
        assert_eq!(out.response_time, Some(3.2));
    }
}
