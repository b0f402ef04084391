//! Markdown rendering of finished API results.
//!
//! Long page content is cut to a per-command character budget with a
//! `... [truncated, N chars total]` marker, where N is always the original
//! length.

use webintel_client::crawl::CrawlOutput;
use webintel_client::extract::ExtractOutput;
use webintel_client::research::ResearchOutput;
use webintel_client::search::SearchOutput;
use webintel_client::sitemap::MapOutput;
use webintel_core::{DeepSearchReport, ExtractFailure, ExtractOutcome, PageExtract};

pub const SEARCH_CONTENT_BUDGET: usize = 2000;
pub const DEEP_CONTENT_BUDGET: usize = 3000;
pub const EXTRACT_CONTENT_BUDGET: usize = 5000;
pub const CRAWL_CONTENT_BUDGET: usize = 2000;

/// Cut `content` to `budget` characters, appending the truncation marker
/// with the original character count. Content at or under budget passes
/// through untouched.
pub fn truncated(content: &str, budget: usize) -> String {
    let total = content.chars().count();
    if total <= budget {
        return content.to_string();
    }
    let cut: String = content.chars().take(budget).collect();
    format!("{cut}\n... [truncated, {total} chars total]")
}

fn fmt_credits(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

pub fn format_search(out: &SearchOutput, show_raw: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(answer) = &out.answer {
        lines.push("## Answer".to_string());
        lines.push(answer.clone());
        lines.push(String::new());
    }

    if !out.results.is_empty() {
        lines.push(format!("## Results ({} found)", out.results.len()));
        lines.push(String::new());
        for (i, r) in out.results.iter().enumerate() {
            lines.push(format!(
                "### {}. {}",
                i + 1,
                r.title.as_deref().unwrap_or("No title")
            ));
            lines.push(format!("**URL:** {}", r.url));
            if let Some(score) = r.score {
                lines.push(format!("**Relevance:** {score:.2}"));
            }
            lines.push(String::new());
            match (&r.full_content, &r.snippet) {
                (Some(content), _) if show_raw => {
                    lines.push("**Content:**".to_string());
                    lines.push(truncated(content, SEARCH_CONTENT_BUDGET));
                }
                (_, Some(snippet)) => lines.push(snippet.clone()),
                _ => {}
            }
            lines.push(String::new());
        }
    }

    if !out.usage.0.is_empty() {
        lines.push("---".to_string());
        lines.push(format!(
            "*Credits used: {}*",
            fmt_credits(out.usage.get("credits"))
        ));
    }

    lines.join("\n")
}

pub fn format_extract(out: &ExtractOutput) -> String {
    let mut successes: Vec<&PageExtract> = Vec::new();
    let mut failures: Vec<&ExtractFailure> = Vec::new();
    for o in &out.outcomes {
        match o {
            ExtractOutcome::Success(p) => successes.push(p),
            ExtractOutcome::Failure(f) => failures.push(f),
        }
    }

    let mut lines: Vec<String> = Vec::new();

    if !successes.is_empty() {
        lines.push(format!("## Extracted Content ({} pages)", successes.len()));
        lines.push(String::new());
        for (i, page) in successes.iter().enumerate() {
            lines.push(format!("### {}. {}", i + 1, page.url));
            lines.push(String::new());
            if page.raw_content.is_empty() {
                lines.push("*No content extracted*".to_string());
            } else {
                lines.push(truncated(&page.raw_content, EXTRACT_CONTENT_BUDGET));
            }
            if !page.images.is_empty() {
                lines.push(String::new());
                lines.push(format!("**Images ({}):**", page.images.len()));
                for img in page.images.iter().take(5) {
                    lines.push(format!("- {img}"));
                }
                if page.images.len() > 5 {
                    lines.push(format!("- ... and {} more", page.images.len() - 5));
                }
            }
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
        }
    }

    if !failures.is_empty() {
        lines.push(format!("## Failed Extractions ({})", failures.len()));
        for f in &failures {
            lines.push(format!("- {}: {}", f.url, f.error));
        }
        lines.push(String::new());
    }

    if !out.usage.0.is_empty() {
        lines.push(format!(
            "*Credits used: {}*",
            fmt_credits(out.usage.get("credits"))
        ));
    }

    lines.join("\n")
}

pub fn format_deep(report: &DeepSearchReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Deep Search: {}", report.query));
    lines.push(String::new());

    if let Some(answer) = &report.answer {
        lines.push("## Summary".to_string());
        lines.push(answer.clone());
        lines.push(String::new());
    }

    if !report.results.is_empty() {
        lines.push(format!("## Sources ({} found)", report.results.len()));
        lines.push(String::new());
        for (i, r) in report.results.iter().enumerate() {
            lines.push(format!(
                "### {}. {}",
                i + 1,
                r.title.as_deref().unwrap_or("No title")
            ));
            lines.push(format!("**URL:** {}", r.url));
            lines.push(String::new());
            if let Some(content) = &r.full_content {
                lines.push(truncated(content, DEEP_CONTENT_BUDGET));
            } else if let Some(snippet) = &r.snippet {
                lines.push(format!("*Snippet:* {snippet}"));
            }
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
        }
    }

    if !report.failed_extractions.is_empty() {
        lines.push(format!(
            "## Failed Extractions ({})",
            report.failed_extractions.len()
        ));
        for f in &report.failed_extractions {
            lines.push(format!("- {}: {}", f.url, f.error));
        }
        lines.push(String::new());
    }

    let search_credits = report.usage.get("search_credits");
    let extract_credits = report.usage.get("extract_credits");
    lines.push(format!(
        "*Credits: {} search + {} extract = {} total*",
        fmt_credits(search_credits),
        fmt_credits(extract_credits),
        fmt_credits(search_credits + extract_credits)
    ));

    lines.join("\n")
}

pub fn format_crawl(out: &CrawlOutput) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("## Crawl Results: {}", out.base_url));
    lines.push(format!("{} pages crawled", out.pages.len()));
    lines.push(String::new());

    for (i, page) in out.pages.iter().enumerate() {
        lines.push(format!("### {}. {}", i + 1, page.url));
        lines.push(String::new());
        match page.raw_content.as_deref().filter(|c| !c.is_empty()) {
            Some(content) => lines.push(truncated(content, CRAWL_CONTENT_BUDGET)),
            None => lines.push("*No content extracted*".to_string()),
        }
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
    }

    if let Some(t) = out.response_time {
        lines.push(format!("*Crawl completed in {t:.1}s*"));
    }

    lines.join("\n")
}

pub fn format_map(out: &MapOutput) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("## Site Map: {}", out.base_url));
    lines.push(format!("{} URLs found", out.urls.len()));
    lines.push(String::new());
    for (i, url) in out.urls.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, url));
    }
    if let Some(t) = out.response_time {
        lines.push(String::new());
        lines.push(format!("*Completed in {t:.1}s*"));
    }
    lines.join("\n")
}

pub fn format_research(out: &ResearchOutput) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !out.content.is_empty() {
        lines.push(out.content.clone());
        lines.push(String::new());
    }

    if !out.sources.is_empty() {
        lines.push("## Sources".to_string());
        for (i, s) in out.sources.iter().enumerate() {
            lines.push(format!(
                "{}. [{}]({})",
                i + 1,
                s.title.as_deref().unwrap_or("Untitled"),
                s.url.as_deref().unwrap_or("")
            ));
        }
        lines.push(String::new());
    }

    if let Some(t) = out.response_time {
        lines.push(format!("*Research completed in {t:.1}s*"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use webintel_core::{SearchHit, Usage};

    #[test]
    fn short_content_passes_through_without_a_marker() {
        assert_eq!(truncated("hello", 10), "hello");
        assert_eq!(truncated("hello", 5), "hello");
    }

    #[test]
    fn long_content_is_cut_with_original_char_count() {
        let content = "x".repeat(3500);
        let out = truncated(&content, 3000);
        assert!(out.starts_with(&"x".repeat(3000)));
        assert!(out.ends_with("... [truncated, 3500 chars total]"));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        // Five chars, ten bytes.
        let content = "ééééé";
        assert_eq!(truncated(content, 5), content);
        let out = truncated(content, 3);
        assert!(out.ends_with("... [truncated, 5 chars total]"));
        assert!(out.starts_with("ééé"));
    }

    #[test]
    fn deep_report_renders_snippet_fallback_and_credit_line() {
        let mut hit = SearchHit::new("https://a");
        hit.title = Some("A".to_string());
        hit.snippet = Some("just a snippet".to_string());
        let report = DeepSearchReport {
            query: "q".to_string(),
            answer: Some("the answer".to_string()),
            results: vec![hit],
            failed_extractions: Vec::new(),
            usage: Usage::combine(
                Usage::of("search_credits", 2.0),
                Some(Usage::of("extract_credits", 1.0)),
            ),
        };
        let md = format_deep(&report);
        assert!(md.contains("# Deep Search: q"));
        assert!(md.contains("## Summary"));
        assert!(md.contains("*Snippet:* just a snippet"));
        assert!(md.contains("*Credits: 2 search + 1 extract = 3 total*"));
    }

    #[test]
    fn deep_report_prefers_full_content_over_snippet() {
        let mut hit = SearchHit::new("https://a");
        hit.snippet = Some("snippet".to_string());
        hit.full_content = Some("full text".to_string());
        let report = DeepSearchReport {
            query: "q".to_string(),
            answer: None,
            results: vec![hit],
            failed_extractions: vec![ExtractFailure {
                url: "https://b".to_string(),
                error: "timeout".to_string(),
            }],
            usage: Usage::of("search_credits", 2.0),
        };
        let md = format_deep(&report);
        assert!(md.contains("full text"));
        assert!(!md.contains("*Snippet:*"));
        assert!(md.contains("## Failed Extractions (1)"));
        assert!(md.contains("- https://b: timeout"));
        assert!(md.contains("*Credits: 2 search + 0 extract = 2 total*"));
    }

    #[test]
    fn fractional_credits_are_printed_as_is() {
        assert_eq!(fmt_credits(0.2), "0.2");
        assert_eq!(fmt_credits(3.0), "3");
    }
}
