mod http;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use stash::collect::{collect, collect_items, ScrapeOutcome, ScrapeRequest};
use stash::page;
use stash::query::{self, FilterSpec, FilteredView};
use stash::record::{NormalizedRecord, RawItem};
use stash::store::CollectionStore;

use crate::http::HttpFetcher;

#[derive(Parser)]
#[command(name = "collector")]
#[command(about = "Collect movie records from search pages into a CSV store and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one live search page and merge its records into the store
    Collect {
        /// Search URL (must be an imdb.com /search/ page)
        #[arg(long)]
        url: String,
        /// Genre label stamped on every record from this page
        #[arg(long)]
        genre: String,
        /// Collection CSV path
        #[arg(long, default_value = "./data/movies.csv")]
        store: String,
        /// Request timeout seconds
        #[arg(long, default_value_t = 12)]
        timeout_secs: u64,
        /// User-Agent string for the page request
        #[arg(long, default_value = "movie-stash-bot/0.1 (+https://example.com/bot)")]
        user_agent: String,
    },
    /// Ingest saved pages (.html) or item batches (.jsonl), file or directory
    Ingest {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        #[arg(long)]
        genre: String,
        #[arg(long, default_value = "./data/movies.csv")]
        store: String,
    },
    /// List the filtered records, top-N by a chosen metric
    Query {
        #[arg(long, default_value = "./data/movies.csv")]
        store: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// How many records to list
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Metric to rank by
        #[arg(long, value_enum, default_value = "rating")]
        by: Metric,
    },
    /// Per-genre aggregate table plus shortest/longest over the filtered set
    Summary {
        #[arg(long, default_value = "./data/movies.csv")]
        store: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Comma-separated genres to keep (default: every genre in the store)
    #[arg(long, value_delimiter = ',')]
    genres: Vec<String>,
    #[arg(long, default_value_t = 0.0)]
    min_rating: f32,
    #[arg(long, default_value_t = 0)]
    min_votes: u64,
    /// Minimum duration in minutes
    #[arg(long, default_value_t = 0)]
    min_duration: u32,
    /// Maximum duration in minutes
    #[arg(long, default_value_t = u32::MAX)]
    max_duration: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Metric {
    Rating,
    Votes,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { url, genre, store, timeout_secs, user_agent } => {
            let store = open_store(&store)?;
            let mut fetcher = HttpFetcher::new(&user_agent, timeout_secs)?;
            let request = ScrapeRequest { url, genre };
            let outcome = collect(&store, &mut fetcher, &request)?;
            tracing::info!(
                url = %request.url,
                scraped = outcome.scraped,
                added = outcome.added,
                "live collect complete"
            );
            println!("collected: scraped={} added={} total={}", outcome.scraped, outcome.added, store.len());
            Ok(())
        }
        Commands::Ingest { input, genre, store } => {
            let store = open_store(&store)?;
            ingest(&store, Path::new(&input), &genre)
        }
        Commands::Query { store, filter, top, by } => {
            let store = open_store(&store)?;
            let view = build_view(&store, &filter);
            let ranked = match by {
                Metric::Rating => view.top_by_rating(top),
                Metric::Votes => view.top_by_votes(top),
            };
            if ranked.is_empty() {
                println!("no records match the filter");
                return Ok(());
            }
            for (i, record) in ranked.iter().enumerate() {
                println!("{:>3}. {}", i + 1, format_record(record));
            }
            Ok(())
        }
        Commands::Summary { store, filter } => {
            let store = open_store(&store)?;
            let view = build_view(&store, &filter);
            print_summary(&view);
            Ok(())
        }
    }
}

fn open_store(path: &str) -> Result<CollectionStore> {
    if let Some(dir) = Path::new(path).parent() {
        fs::create_dir_all(dir).ok();
    }
    CollectionStore::open(path).with_context(|| format!("opening store {path}"))
}

fn ingest(store: &CollectionStore, input: &Path, genre: &str) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "html" | "htm" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    if files.is_empty() {
        bail!("no ingestable files under {}", input.display());
    }
    tracing::info!(files = files.len(), genre, "ingesting saved input");

    let mut total = ScrapeOutcome { scraped: 0, added: 0 };
    for file in files {
        let items = load_items(&file)?;
        let outcome = collect_items(store, &items, genre)?;
        println!(
            "ingested {}: scraped={} added={}",
            file.display(),
            outcome.scraped,
            outcome.added
        );
        total.scraped += outcome.scraped;
        total.added += outcome.added;
    }
    tracing::info!(scraped = total.scraped, added = total.added, "ingest complete");
    println!("done: scraped={} added={} total={}", total.scraped, total.added, store.len());
    Ok(())
}

fn load_items(file: &Path) -> Result<Vec<RawItem>> {
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let f = fs::File::open(file)?;
        let mut items = Vec::new();
        for line in BufReader::new(f).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item: RawItem = serde_json::from_str(&line)
                .with_context(|| format!("bad item line in {}", file.display()))?;
            items.push(item);
        }
        Ok(items)
    } else {
        let html = fs::read_to_string(file)?;
        Ok(page::parse_search_page(&html))
    }
}

fn build_view(store: &CollectionStore, args: &FilterArgs) -> FilteredView {
    let snapshot = store.snapshot();
    let genres: Vec<String> = if args.genres.is_empty() {
        snapshot.iter().map(|r| r.genre.clone()).collect()
    } else {
        args.genres.clone()
    };
    let mut spec = FilterSpec::for_genres(genres);
    spec.min_rating = args.min_rating;
    spec.min_votes = args.min_votes;
    spec.min_duration = args.min_duration;
    spec.max_duration = args.max_duration;
    query::run(&snapshot, &spec)
}

fn format_record(record: &NormalizedRecord) -> String {
    format!(
        "{} ({}) rating={} votes={} duration={}m genre={}",
        record.title.as_deref().unwrap_or("?"),
        record.year.unwrap_or_default(),
        record.rating.unwrap_or_default(),
        record.vote_count.unwrap_or_default(),
        record.duration_min.unwrap_or_default(),
        record.genre,
    )
}

fn print_summary(view: &FilteredView) {
    if view.is_empty() {
        println!("no records match the filter");
        return;
    }
    let counts = view.count_per_genre();
    let votes = view.votes_per_genre();
    let mean_rating = view.mean_rating_per_genre();
    let mean_duration = view.mean_duration_per_genre();
    let best = view.top_rated_per_genre();
    for (genre, count) in &counts {
        println!(
            "{genre}: count={count} mean_rating={:.2} mean_duration={:.0}m votes={}",
            mean_rating.get(genre).copied().unwrap_or_default(),
            mean_duration.get(genre).copied().unwrap_or_default(),
            votes.get(genre).copied().unwrap_or_default(),
        );
        if let Some(record) = best.get(genre) {
            println!("  top rated: {}", format_record(record));
        }
    }
    match (view.shortest(), view.longest()) {
        (Some(shortest), Some(longest)) => {
            println!("shortest: {}", format_record(shortest));
            println!("longest:  {}", format_record(longest));
        }
        _ => println!("shortest/longest: no data"),
    }
}
