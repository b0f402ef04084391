//! Two-stage deep search: a broad search whose top hits are fed straight
//! into a content-extraction batch, with the two response sets correlated
//! by URL.
//!
//! Failure handling is deliberately asymmetric. A stage-1 failure aborts
//! the run and propagates untouched. A stage-2 failure is contained: each
//! selected URL is recorded as a failed extraction and the run still
//! returns the ranked stage-1 snippets, so degraded extraction never costs
//! the user the search results they already paid for.

use crate::search::{self, SearchOptions};
use crate::{extract, ApiTransport};
use webintel_core::{
    merge_extractions, DeepSearchReport, ExtractFailure, ExtractOutcome, Result, Usage,
};

pub const DEFAULT_EXTRACT_TOP: usize = 3;

#[derive(Debug, Clone)]
pub struct DeepSearchOptions {
    /// One of: general, news, finance.
    pub topic: String,
    pub max_results: usize,
    /// How many of the top hits to extract full content from.
    pub extract_top: usize,
    /// Last-N-days filter; only honored for news/finance topics.
    pub days: Option<u32>,
}

impl Default for DeepSearchOptions {
    fn default() -> Self {
        Self {
            topic: "general".to_string(),
            max_results: 5,
            extract_top: DEFAULT_EXTRACT_TOP,
            days: None,
        }
    }
}

pub async fn deep_search<T: ApiTransport + ?Sized>(
    transport: &T,
    query: &str,
    opts: &DeepSearchOptions,
) -> Result<DeepSearchReport> {
    // Stage 1: advanced-depth search with a synthesized answer. Errors
    // here abort the whole run.
    let search_opts = SearchOptions {
        depth: "advanced".to_string(),
        topic: opts.topic.clone(),
        max_results: opts.max_results,
        include_answer: true,
        days: opts
            .days
            .filter(|_| matches!(opts.topic.as_str(), "news" | "finance")),
        ..SearchOptions::default()
    };
    let stage1 = search::search(transport, query, &search_opts).await?;
    let stage1_usage = Usage::of("search_credits", stage1.usage.get("credits"));

    // Stage 2 targets: the first extract_top hits that carry a URL.
    let targets: Vec<String> = stage1
        .results
        .iter()
        .take(opts.extract_top)
        .filter(|h| !h.url.is_empty())
        .map(|h| h.url.clone())
        .collect();

    let (secondary, stage2_usage) = if targets.is_empty() {
        // Nothing to extract; stage 2 is skipped at zero cost.
        (Vec::new(), None)
    } else {
        match extract::extract(transport, &targets, &extract::ExtractOptions::default()).await {
            Ok(out) => {
                let usage = Usage::of("extract_credits", out.usage.get("credits"));
                (out.outcomes, Some(usage))
            }
            Err(err) => {
                // Extraction being unavailable degrades the run rather
                // than failing it: one synthesized failure per target.
                let fallback = targets
                    .into_iter()
                    .map(|url| {
                        ExtractOutcome::Failure(ExtractFailure {
                            url,
                            error: format!("extraction unavailable: {err}"),
                        })
                    })
                    .collect();
                (fallback, None)
            }
        }
    };

    let (results, failed_extractions) = merge_extractions(stage1.results, secondary);
    let usage = Usage::combine(stage1_usage, stage2_usage);

    Ok(DeepSearchReport {
        query: query.to_string(),
        answer: stage1.answer,
        results,
        failed_extractions,
        usage,
    })
}
