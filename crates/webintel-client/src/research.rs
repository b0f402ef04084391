use crate::payload::PayloadBuilder;
use crate::ApiTransport;
use serde::Deserialize;
use std::time::Duration;
use webintel_core::{Error, Result};

// Research synthesis routinely takes 30-120s server-side.
pub const RESEARCH_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct ResearchOptions {
    /// One of: mini, pro, auto.
    pub model: String,
    /// One of: numbered, mla, apa, chicago.
    pub citation_format: String,
    /// Optional JSON schema for structured output.
    pub output_schema: Option<serde_json::Value>,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            model: "auto".to_string(),
            citation_format: "numbered".to_string(),
            output_schema: None,
        }
    }
}

pub fn research_payload(input: &str, opts: &ResearchOptions) -> serde_json::Value {
    PayloadBuilder::new()
        .required("input", input)
        .required("model", opts.model.as_str())
        // Streaming responses are out of scope for a one-shot CLI call.
        .required("stream", false)
        .required("citation_format", opts.citation_format.as_str())
        .optional("output_schema", opts.output_schema.clone())
        .build()
}

#[derive(Debug, Clone)]
pub struct ResearchSource {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResearchOutput {
    pub content: String,
    pub sources: Vec<ResearchSource>,
    pub response_time: Option<f64>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ResearchResponseWire {
    content: Option<String>,
    #[serde(default)]
    sources: Vec<ResearchSourceWire>,
    response_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ResearchSourceWire {
    title: Option<String>,
    url: Option<String>,
}

pub async fn research<T: ApiTransport + ?Sized>(
    transport: &T,
    input: &str,
    opts: &ResearchOptions,
) -> Result<ResearchOutput> {
    let payload = research_payload(input, opts);
    let body = transport
        .post_json("research", &payload, RESEARCH_TIMEOUT)
        .await?;
    parse_research(body)
}

fn parse_research(body: serde_json::Value) -> Result<ResearchOutput> {
    let wire: ResearchResponseWire =
        serde_json::from_value(body.clone()).map_err(|e| Error::BadResponse(e.to_string()))?;
    Ok(ResearchOutput {
        content: wire.content.unwrap_or_default(),
        sources: wire
            .sources
            .into_iter()
            .map(|s| ResearchSource {
                title: s.title,
                url: s.url,
            })
            .collect(),
        response_time: wire.response_time,
        raw: body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_always_disables_streaming() {
        let v = research_payload("EV market analysis", &ResearchOptions::default());
        assert_eq!(v["stream"], false);
        assert_eq!(v["model"], "auto");
        assert_eq!(v["citation_format"], "numbered");
        assert!(!v.as_object().unwrap().contains_key("output_schema"));
    }

    #[test]
    fn payload_includes_supplied_schema_verbatim() {
        let schema = serde_json::json!({"properties": {"summary": {"type": "string"}}});
        let opts = ResearchOptions {
            output_schema: Some(schema.clone()),
            ..ResearchOptions::default()
        };
        let v = research_payload("fintech startups", &opts);
        assert_eq!(v["output_schema"], schema);
    }

    #[test]
    fn parses_minimal_research_shape() {
        let body = serde_json::json!({
            "content": "Findings...",
            "sources": [{"title": "Paper", "url": "https://example.com"}],
            "response_time": 42.0
        });
        let out = parse_research(body).unwrap();
        assert_eq!(out.content, "Findings...");
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].title.as_deref(), Some("Paper"));
    }
}
