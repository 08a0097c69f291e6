mod api;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nf_core::{extract_keywords, reading_time, summarize};
use nf_store::{
    QuotaConfig, QuotaTracker, ReadingHistory, SqliteKv, SystemClock, unix_ms_to_iso8601,
};

use api::NewsFilters;

#[derive(Parser)]
#[command(name = "nf", about = "News reader with on-device summarization and quota tracking")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize text from a file or stdin
    Summarize {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Number of sentences to extract
        #[arg(long, default_value_t = 2)]
        sentences: usize,

        /// Emit summary, keywords and reading time as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract top keywords from a file or stdin
    Keywords {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Number of keywords to extract
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Fetch latest headlines (requires NEWSFLASH_API_KEY)
    Fetch {
        /// Filter by category (e.g. technology, business)
        #[arg(long)]
        category: Option<String>,

        /// Filter by two-letter country code
        #[arg(long)]
        country: Option<String>,

        /// Full-text search query
        #[arg(long)]
        query: Option<String>,

        /// Article language (default: en)
        #[arg(long)]
        language: Option<String>,

        /// Mark the fetched articles as read
        #[arg(long)]
        mark_read: bool,
    },

    /// Summarize via the remote API, falling back to local extraction
    SummarizeRemote {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Show or reset API quota usage
    Quota {
        #[command(subcommand)]
        action: Option<QuotaAction>,

        /// Emit usage stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or clear the read-article history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Subcommand)]
enum QuotaAction {
    /// Clear tracked usage for one identity, or all of them
    Reset {
        /// Identity to reset (all when omitted)
        identity: Option<String>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Forget every read article
    Clear,
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NF_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".newsflash")
}

fn load_config(dir: &std::path::Path) -> QuotaConfig {
    let path = dir.join("config.toml");
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return QuotaConfig::default(),
    };
    match QuotaConfig::from_toml_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("ignoring invalid {}: {e}", path.display());
            QuotaConfig::default()
        }
    }
}

fn open_tracker() -> Result<QuotaTracker<SqliteKv, SystemClock>> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data dir {}", dir.display()))?;
    let store = SqliteKv::open(&dir.join("newsflash.db")).context("failed to open store")?;
    Ok(QuotaTracker::new(store, load_config(&dir), SystemClock))
}

fn open_history() -> Result<ReadingHistory<SqliteKv, SystemClock>> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data dir {}", dir.display()))?;
    let store = SqliteKv::open(&dir.join("newsflash.db")).context("failed to open store")?;
    Ok(ReadingHistory::new(store, SystemClock))
}

fn read_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Summarize {
            file,
            sentences,
            json,
        } => cmd_summarize(file.as_deref(), *sentences, *json),
        Commands::Keywords { file, count } => cmd_keywords(file.as_deref(), *count),
        Commands::Fetch {
            category,
            country,
            query,
            language,
            mark_read,
        } => {
            let filters = NewsFilters {
                category: category.clone(),
                country: country.clone(),
                query: query.clone(),
                language: language.clone(),
            };
            cmd_fetch(&filters, *mark_read).await
        }
        Commands::SummarizeRemote { file } => cmd_summarize_remote(file.as_deref()).await,
        Commands::Quota { action, json } => cmd_quota(action.as_ref(), *json),
        Commands::History { action } => cmd_history(action.as_ref()),
    }
}

fn cmd_summarize(file: Option<&std::path::Path>, sentences: usize, json: bool) -> Result<()> {
    let text = read_input(file)?;
    let summary = summarize(&text, sentences);

    if json {
        let out = serde_json::json!({
            "summary": summary,
            "keywords": extract_keywords(&text, 5),
            "reading_time_min": reading_time(&text),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{summary}");
        let keywords = extract_keywords(&text, 5);
        if !keywords.is_empty() {
            println!("keywords: {}", keywords.join(", "));
        }
        println!("reading time: {} min", reading_time(&text));
    }
    Ok(())
}

fn cmd_keywords(file: Option<&std::path::Path>, count: usize) -> Result<()> {
    let text = read_input(file)?;
    let keywords = extract_keywords(&text, count);
    if keywords.is_empty() {
        println!("(no keywords found)");
    } else {
        println!("{}", keywords.join(", "));
    }
    Ok(())
}

async fn cmd_fetch(filters: &NewsFilters, mark_read: bool) -> Result<()> {
    let api_key = std::env::var("NEWSFLASH_API_KEY")
        .context("NEWSFLASH_API_KEY is not set; get a free key at newsdata.io")?;
    let mut tracker = open_tracker()?;
    let mut history = open_history()?;
    let client = reqwest::Client::new();

    let response = match api::fetch_news(&client, &mut tracker, &api_key, filters).await {
        Ok(response) => response,
        Err(e) => {
            if e.is_rate_limit() {
                eprintln!("hint: run `nf quota` to see current usage");
            }
            return Err(e.into());
        }
    };

    println!(
        "{} of {} matching articles:",
        response.results.len(),
        response.total_results
    );
    for article in &response.results {
        let marker = if history.is_read(&article.article_id) {
            " [read]"
        } else {
            ""
        };
        println!("\n  {}{marker}", article.title);
        let mut meta = Vec::new();
        if let Some(source) = &article.source_id {
            meta.push(source.as_str());
        }
        if let Some(date) = &article.pub_date {
            meta.push(date.as_str());
        }
        if !meta.is_empty() {
            println!("  {}", meta.join(", "));
        }
        if let Some(description) = &article.description {
            println!("  {description}");
        }
        if let Some(link) = &article.link {
            println!("  {link}");
        }
        if mark_read && !history.mark_read(&article.article_id) {
            tracing::warn!(
                "read status for {} recorded in memory only",
                article.article_id
            );
        }
    }

    let stats = tracker.usage_stats(api::NEWS_IDENTITY)?;
    eprintln!(
        "--- news quota: {}/{} used ({}%) ---",
        stats.used, stats.total, stats.percentage
    );
    Ok(())
}

async fn cmd_summarize_remote(file: Option<&std::path::Path>) -> Result<()> {
    let text = read_input(file)?;
    let mut tracker = open_tracker()?;
    let client = reqwest::Client::new();

    let summary = api::summarize_article(&client, &mut tracker, &text).await;
    println!("{summary}");
    Ok(())
}

fn cmd_quota(action: Option<&QuotaAction>, json: bool) -> Result<()> {
    let mut tracker = open_tracker()?;

    if let Some(QuotaAction::Reset { identity }) = action {
        let persisted = tracker.reset_limits(identity.as_deref())?;
        if !persisted {
            tracing::warn!("reset applied in memory only");
        }
        match identity {
            Some(id) => println!("reset quota for '{id}'"),
            None => println!("reset all quotas"),
        }
        return Ok(());
    }

    if json {
        let mut out = serde_json::Map::new();
        for identity in tracker.config().identities() {
            let stats = tracker.usage_stats(identity)?;
            out.insert(identity.to_string(), serde_json::to_value(stats)?);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(out))?
        );
        return Ok(());
    }

    for identity in tracker.config().identities() {
        let stats = tracker.usage_stats(identity)?;
        let stale = if tracker.is_data_stale(identity)? {
            " (stale)"
        } else {
            ""
        };
        println!(
            "{identity}: {}/{} used ({}%), resets {}{stale}",
            stats.used,
            stats.total,
            stats.percentage,
            unix_ms_to_iso8601(stats.reset_at_ms)
        );
    }
    Ok(())
}

fn cmd_history(action: Option<&HistoryAction>) -> Result<()> {
    let mut history = open_history()?;

    match action {
        Some(HistoryAction::Clear) => {
            if !history.clear() {
                tracing::warn!("history cleared in memory only");
            }
            println!("cleared reading history");
        }
        None => {
            let articles = history.read_articles();
            if articles.is_empty() {
                println!("(no articles read)");
            } else {
                for article in articles {
                    println!(
                        "{}  {}",
                        unix_ms_to_iso8601(article.read_at_ms),
                        article.article_id
                    );
                }
            }
        }
    }
    Ok(())
}
