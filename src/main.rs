use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

use feedwindow::config::Config;
use feedwindow::handler::{FeedHandler, FeedRequest, FeedResponse, HandlerError, RequestData};
use feedwindow::selection::{ContinuationArgs, SelectionQuery, NEXT_PAGE_TAG};

/// Get the default config file path (~/.config/feedwindow/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("feedwindow")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedwindow",
    about = "Fetch an RSS/Atom feed and print a date- or page-bounded slice as JSON"
)]
struct Args {
    /// Config file (defaults to ~/.config/feedwindow/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Feed URL (overrides feed_url from the config file)
    #[arg(long)]
    url: Option<String>,

    /// Read the request envelope as JSON from FILE ("-" for stdin)
    #[arg(long, value_name = "FILE", conflicts_with_all = [
        "start_date", "end_date", "page", "page_size",
        "next_page", "continue_page", "continue_page_size",
    ])]
    request: Option<PathBuf>,

    /// Keep items on or after this day (YYYYMMDD)
    #[arg(long, value_name = "YYYYMMDD")]
    start_date: Option<String>,

    /// Keep items on or before midnight of this day (YYYYMMDD)
    #[arg(long, value_name = "YYYYMMDD")]
    end_date: Option<String>,

    /// Page number for a first-page request
    #[arg(long)]
    page: Option<String>,

    /// Page size for a first-page request
    #[arg(long)]
    page_size: Option<String>,

    /// Tag the request as a next-page continuation
    #[arg(long)]
    next_page: bool,

    /// Page to serve on a continuation (replayed `_page`)
    #[arg(long, requires = "next_page")]
    continue_page: Option<String>,

    /// Page size on a continuation (replayed `_pageSize`)
    #[arg(long, requires = "next_page")]
    continue_page_size: Option<String>,

    /// Pretty-print the response JSON
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn flag_request(&self) -> FeedRequest {
        let args = self.next_page.then(|| ContinuationArgs {
            at_agent_action: Some(NEXT_PAGE_TAG.to_string()),
            page: self.continue_page.clone(),
            page_size: self.continue_page_size.clone(),
        });

        FeedRequest {
            query: SelectionQuery {
                start_date: self.start_date.clone(),
                end_date: self.end_date.clone(),
                page: self.page.clone(),
                page_size: self.page_size.clone(),
            },
            data: args.map(|args| RequestData { args: Some(args) }),
        }
    }
}

fn read_request(path: &PathBuf) -> Result<FeedRequest> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Request envelope is not valid JSON")
}

fn print_response(response: &FeedResponse, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the response
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    tracing::debug!(config = ?config, "Effective configuration");

    let feed_url = args
        .url
        .clone()
        .or_else(|| config.feed_url.clone())
        .context("No feed URL: pass --url or set feed_url in the config file")?;

    let handler =
        FeedHandler::new(config.fetch_settings()).context("Failed to build HTTP client")?;

    let request = match &args.request {
        Some(path) => read_request(path),
        None => Ok(args.flag_request()),
    };

    let response = match request {
        Ok(request) => handler.handle(&feed_url, &request).await,
        Err(e) => FeedResponse::from_error(&HandlerError::from(e)),
    };

    print_response(&response, args.pretty)?;

    if response.is_error() {
        std::process::exit(1);
    }

    Ok(())
}
