use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use webintel_client::{crawl, deep, extract, research, search, sitemap, ApiClient};

mod render;

#[derive(Parser, Debug)]
#[command(name = "webintel")]
#[command(about = "Command-line tools for a hosted web-intelligence API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Web search optimized for LLM consumption.
    Search(SearchCmd),
    /// Extract full page content from URLs.
    Extract(ExtractCmd),
    /// Search, then extract full content from the top hits in one step.
    DeepSearch(DeepSearchCmd),
    /// Crawl a website and optionally save pages as markdown files.
    Crawl(CrawlCmd),
    /// Discover URLs on a website (faster than a crawl).
    Map(MapCmd),
    /// AI-synthesized research with citations.
    Research(ResearchCmd),
}

#[derive(Args, Debug)]
struct SearchCmd {
    /// Search query.
    query: String,
    /// Search depth. Allowed: ultra-fast, fast, basic, advanced
    #[arg(long, default_value = "basic", value_parser = ["ultra-fast", "fast", "basic", "advanced"])]
    depth: String,
    /// Search topic. Allowed: general, news, finance
    #[arg(long, default_value = "general", value_parser = ["general", "news", "finance"])]
    topic: String,
    /// Max results to return.
    #[arg(long, default_value_t = 5)]
    max_results: usize,
    /// Include an AI-generated answer.
    #[arg(long)]
    include_answer: bool,
    /// Include full page content, not just snippets.
    #[arg(long)]
    include_raw_content: bool,
    /// Include image results.
    #[arg(long)]
    include_images: bool,
    /// Filter to the last N days (news/finance only).
    #[arg(long)]
    days: Option<u32>,
    /// Time filter. Allowed: day, week, month, year
    #[arg(long, value_parser = ["day", "week", "month", "year"])]
    time_range: Option<String>,
    /// Chunks per source, 1-5 (advanced/fast only).
    #[arg(long)]
    chunks_per_source: Option<u32>,
    /// Comma-separated domains to restrict the search to.
    #[arg(long)]
    include_domains: Option<String>,
    /// Comma-separated domains to exclude.
    #[arg(long)]
    exclude_domains: Option<String>,
    /// Print the raw JSON response.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ExtractCmd {
    /// URLs to extract (max 20 per request).
    #[arg(required = true)]
    urls: Vec<String>,
    /// Extraction depth. Allowed: basic, advanced
    #[arg(long, default_value = "basic", value_parser = ["basic", "advanced"])]
    depth: String,
    /// Include images found on the pages.
    #[arg(long)]
    include_images: bool,
    /// Print the raw JSON response.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DeepSearchCmd {
    /// Search query.
    query: String,
    /// Search topic. Allowed: general, news, finance
    #[arg(long, default_value = "general", value_parser = ["general", "news", "finance"])]
    topic: String,
    /// Max results to search.
    #[arg(long, default_value_t = 5)]
    max_results: usize,
    /// Extract full content from the top N results.
    #[arg(long, default_value_t = deep::DEFAULT_EXTRACT_TOP)]
    extract_top: usize,
    /// Filter to the last N days (news/finance only).
    #[arg(long)]
    days: Option<u32>,
    /// Print the raw JSON report.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CrawlCmd {
    /// Root URL to crawl.
    url: String,
    /// Crawl depth, 1-5.
    #[arg(long, default_value_t = 1)]
    max_depth: u32,
    /// Links followed per page.
    #[arg(long, default_value_t = 20)]
    max_breadth: u32,
    /// Total pages cap.
    #[arg(long, default_value_t = 50)]
    limit: u32,
    /// Natural-language focus guidance.
    #[arg(long)]
    instructions: Option<String>,
    /// Chunks per page, 1-5 (requires --instructions).
    #[arg(long)]
    chunks_per_source: Option<u32>,
    /// Extraction depth. Allowed: basic, advanced
    #[arg(long, default_value = "basic", value_parser = ["basic", "advanced"])]
    extract_depth: String,
    /// Page format. Allowed: markdown, text
    #[arg(long, default_value = "markdown", value_parser = ["markdown", "text"])]
    format: String,
    /// Comma-separated regex patterns to include.
    #[arg(long)]
    select_paths: Option<String>,
    /// Comma-separated regex patterns to exclude.
    #[arg(long)]
    exclude_paths: Option<String>,
    /// Follow links to external domains.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    allow_external: bool,
    /// Server-side wait cap, seconds.
    #[arg(long, default_value_t = 150)]
    timeout: u32,
    /// Save each crawled page as a markdown file in this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Print the raw JSON response.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct MapCmd {
    /// Root URL to map.
    url: String,
    /// Crawl depth, 1-5.
    #[arg(long, default_value_t = 1)]
    max_depth: u32,
    /// Links followed per page.
    #[arg(long, default_value_t = 20)]
    max_breadth: u32,
    /// Total URLs cap.
    #[arg(long, default_value_t = 50)]
    limit: u32,
    /// Natural-language focus guidance.
    #[arg(long)]
    instructions: Option<String>,
    /// Comma-separated regex patterns to include.
    #[arg(long)]
    select_paths: Option<String>,
    /// Comma-separated regex patterns to exclude.
    #[arg(long)]
    exclude_paths: Option<String>,
    /// Follow links to external domains.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    allow_external: bool,
    /// Print the raw JSON response.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ResearchCmd {
    /// Research topic or question.
    input: String,
    /// Research model. Allowed: mini, pro, auto
    #[arg(long, default_value = "auto", value_parser = ["mini", "pro", "auto"])]
    model: String,
    /// Citation style. Allowed: numbered, mla, apa, chicago
    #[arg(long, default_value = "numbered", value_parser = ["numbered", "mla", "apa", "chicago"])]
    citation_format: String,
    /// JSON schema string for structured output.
    #[arg(long)]
    output_schema: Option<String>,
    /// Save rendered output to this file.
    #[arg(long)]
    output_file: Option<PathBuf>,
    /// Print the raw JSON response.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::from_env(reqwest::Client::new())
        .context("WEBINTEL_API_KEY (or TAVILY_API_KEY) is not set")?;
    match cli.command {
        Commands::Search(cmd) => run_search(&api, cmd).await,
        Commands::Extract(cmd) => run_extract(&api, cmd).await,
        Commands::DeepSearch(cmd) => run_deep_search(&api, cmd).await,
        Commands::Crawl(cmd) => run_crawl(&api, cmd).await,
        Commands::Map(cmd) => run_map(&api, cmd).await,
        Commands::Research(cmd) => run_research(&api, cmd).await,
    }
}

async fn run_search(api: &ApiClient, cmd: SearchCmd) -> Result<()> {
    let show_raw = cmd.include_raw_content;
    let opts = search::SearchOptions {
        depth: cmd.depth,
        topic: cmd.topic,
        max_results: cmd.max_results,
        include_answer: cmd.include_answer,
        include_raw_content: cmd.include_raw_content,
        include_images: cmd.include_images,
        days: cmd.days,
        time_range: cmd.time_range,
        chunks_per_source: cmd.chunks_per_source,
        include_domains: split_csv(cmd.include_domains),
        exclude_domains: split_csv(cmd.exclude_domains),
    };
    let out = search::search(api, &cmd.query, &opts).await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&out.raw)?);
    } else {
        println!("{}", render::format_search(&out, show_raw));
    }
    Ok(())
}

async fn run_extract(api: &ApiClient, cmd: ExtractCmd) -> Result<()> {
    if cmd.urls.len() > extract::MAX_URLS_PER_REQUEST {
        bail!(
            "maximum {} URLs per request (got {})",
            extract::MAX_URLS_PER_REQUEST,
            cmd.urls.len()
        );
    }
    let opts = extract::ExtractOptions {
        depth: cmd.depth,
        include_images: cmd.include_images,
    };
    let out = extract::extract(api, &cmd.urls, &opts).await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&out.raw)?);
    } else {
        println!("{}", render::format_extract(&out));
    }
    Ok(())
}

async fn run_deep_search(api: &ApiClient, cmd: DeepSearchCmd) -> Result<()> {
    let opts = deep::DeepSearchOptions {
        topic: cmd.topic,
        max_results: cmd.max_results,
        extract_top: cmd.extract_top,
        days: cmd.days,
    };
    let report = deep::deep_search(api, &cmd.query, &opts).await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::format_deep(&report));
    }
    Ok(())
}

async fn run_crawl(api: &ApiClient, cmd: CrawlCmd) -> Result<()> {
    let root = url::Url::parse(&cmd.url).with_context(|| format!("invalid URL: {}", cmd.url))?;
    let opts = crawl::CrawlOptions {
        max_depth: cmd.max_depth,
        max_breadth: cmd.max_breadth,
        limit: cmd.limit,
        extract_depth: cmd.extract_depth,
        format: cmd.format,
        allow_external: cmd.allow_external,
        timeout_s: cmd.timeout,
        instructions: cmd.instructions,
        chunks_per_source: cmd.chunks_per_source,
        select_paths: split_csv(cmd.select_paths),
        exclude_paths: split_csv(cmd.exclude_paths),
    };
    eprintln!("Crawling: {root}");
    let out = crawl::crawl(api, root.as_str(), &opts).await?;

    if let Some(dir) = &cmd.output_dir {
        let saved = save_pages(&out.pages, dir)?;
        for path in &saved {
            eprintln!("Saved: {}", path.display());
        }
        eprintln!(
            "\nCrawl complete. {} files saved to: {}",
            saved.len(),
            dir.display()
        );
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&out.raw)?);
    } else {
        println!("{}", render::format_crawl(&out));
    }
    Ok(())
}

async fn run_map(api: &ApiClient, cmd: MapCmd) -> Result<()> {
    let root = url::Url::parse(&cmd.url).with_context(|| format!("invalid URL: {}", cmd.url))?;
    let opts = sitemap::MapOptions {
        max_depth: cmd.max_depth,
        max_breadth: cmd.max_breadth,
        limit: cmd.limit,
        allow_external: cmd.allow_external,
        instructions: cmd.instructions,
        select_paths: split_csv(cmd.select_paths),
        exclude_paths: split_csv(cmd.exclude_paths),
    };
    let out = sitemap::map_site(api, root.as_str(), &opts).await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&out.raw)?);
    } else {
        println!("{}", render::format_map(&out));
    }
    Ok(())
}

async fn run_research(api: &ApiClient, cmd: ResearchCmd) -> Result<()> {
    let output_schema = cmd
        .output_schema
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("invalid JSON in --output-schema")?;
    let opts = research::ResearchOptions {
        model: cmd.model,
        citation_format: cmd.citation_format,
        output_schema,
    };
    eprintln!("Researching: {} (model: {})", cmd.input, opts.model);
    eprintln!("This may take 30-120 seconds...");
    let out = research::research(api, &cmd.input, &opts).await?;

    let rendered = if cmd.json {
        serde_json::to_string_pretty(&out.raw)?
    } else {
        render::format_research(&out)
    };
    println!("{rendered}");

    if let Some(path) = &cmd.output_file {
        std::fs::write(path, &rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("\nSaved to: {}", path.display());
    }
    Ok(())
}

fn split_csv(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
}

fn save_pages(pages: &[crawl::CrawlPage], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let mut saved = Vec::new();
    for page in pages {
        let Some(content) = page.raw_content.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let path = dir.join(format!("{}.md", sanitize_filename(&page.url)));
        std::fs::write(&path, format!("# {}\n\n{}", page.url, content))
            .with_context(|| format!("failed to write {}", path.display()))?;
        saved.push(path);
    }
    Ok(saved)
}

fn sanitize_filename(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    stripped
        .chars()
        .map(|c| {
            if matches!(c, '/' | ':' | '?' | '&' | '=') {
                '_'
            } else {
                c
            }
        })
        .take(100)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_empty_entries() {
        assert_eq!(
            split_csv(Some("a.com, b.com,,".to_string())),
            Some(vec!["a.com".to_string(), "b.com".to_string()])
        );
        assert_eq!(split_csv(None), None);
    }

    #[test]
    fn sanitize_filename_strips_scheme_and_reserved_chars() {
        assert_eq!(
            sanitize_filename("https://docs.example.com/a/b?x=1"),
            "docs.example.com_a_b_x_1"
        );
    }

    #[test]
    fn sanitize_filename_caps_length() {
        let long = format!("https://example.com/{}", "a".repeat(300));
        assert_eq!(sanitize_filename(&long).chars().count(), 100);
    }

    #[test]
    fn save_pages_skips_empty_pages() {
        let tmp = tempfile::tempdir().unwrap();
        let pages = vec![
            crawl::CrawlPage {
                url: "https://example.com/a".to_string(),
                raw_content: Some("# A".to_string()),
            },
            crawl::CrawlPage {
                url: "https://example.com/b".to_string(),
                raw_content: None,
            },
        ];
        let saved = save_pages(&pages, tmp.path()).unwrap();
        assert_eq!(saved.len(), 1);
        let body = std::fs::read_to_string(&saved[0]).unwrap();
        assert!(body.starts_with("# https://example.com/a"));
    }
}
