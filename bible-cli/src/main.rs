use anyhow::{Context, Result};
use bible_core::{
    classify, format, ApiConfig, BibleClient, BookFilter, RandomQuery, RetryPolicy, SearchQuery,
    Testament, Translation,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufReader};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod reader;

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nBuilt: ",
        env!("BUILD_DATE"),
        "\nCommit: ",
        env!("GIT_HASH")
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "bible-cli",
    about = "Bible verse lookup, search and reading from the command line",
    version = env!("CARGO_PKG_VERSION"),
    long_version = long_version()
)]
struct Cli {
    /// Override the API base URL (default: $BIBLE_API_BASE or the public endpoint)
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a verse, verse range or chapter by reference (e.g. John 3:16, Psalm 23)
    Verse {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
        /// web (default) or kjv
        #[arg(long)]
        translation: Option<Translation>,
        /// Print the raw API payload
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch a whole chapter
    Chapter {
        book: String,
        chapter: u32,
        #[arg(long)]
        translation: Option<Translation>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Full-text search
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Book code filter (e.g. ROM)
        #[arg(long)]
        book: Option<String>,
        /// OT, NT or AP
        #[arg(long)]
        testament: Option<Testament>,
        /// 1..=50
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List books, optionally for one testament (OT, NT, AP, all)
    Books {
        #[arg(long, default_value = "all")]
        testament: BookFilter,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List available translations
    Translations {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Random verse
    Random {
        #[arg(long)]
        translation: Option<Translation>,
        #[arg(long)]
        book: Option<String>,
        #[arg(long)]
        testament: Option<Testament>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show how a reference is routed (chapter or verse endpoint); no network
    Classify {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Read chapter by chapter in the terminal
    Read {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
        #[arg(long)]
        translation: Option<Translation>,
        /// Delay before the single automatic retry on network failure
        #[arg(long, default_value_t = 1500)]
        retry_delay_ms: u64,
    },
}

fn init_tracing() {
    let default = if std::env::var("BIBLE_MCP_DEBUG").ok().as_deref() == Some("1") { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn emit<R: Serialize>(result: bible_core::Result<R>, json: bool, text: impl FnOnce(&R) -> String) -> Result<()> {
    let v = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("{}", text(&v));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ApiConfig::from_env();
    if let Some(base) = cli.api_base.as_deref() {
        config = config.with_base_url(base);
    }
    if let Commands::Read { retry_delay_ms, .. } = &cli.command {
        config = config.with_retry(RetryPolicy::single_retry(Duration::from_millis(*retry_delay_ms)));
    }
    let client = || BibleClient::from_config(&config).context("building HTTP client");

    match cli.command {
        Commands::Verse { reference, translation, json } => {
            let reference = reference.join(" ");
            emit(client()?.lookup(&reference, translation), json, format::passage)
        }
        Commands::Chapter { book, chapter, translation, json } => {
            emit(client()?.chapter(&book, chapter, translation), json, format::chapter)
        }
        Commands::Search { query, book, testament, limit, json } => {
            let q = SearchQuery { query: query.join(" "), book, testament, limit };
            emit(client()?.search(&q), json, |r| format::search(&q.query, r))
        }
        Commands::Books { testament, json } => emit(client()?.books(testament), json, |b| format::books(b)),
        Commands::Translations { json } => emit(client()?.translations(), json, |t| format::translations(t)),
        Commands::Random { translation, book, testament, json } => {
            let q = RandomQuery { translation, book, testament };
            emit(client()?.random(&q), json, format::random_verse)
        }
        Commands::Classify { reference, json } => {
            let r = classify(&reference.join(" "));
            if json {
                println!("{}", serde_json::to_string(&r.classification())?);
            } else {
                match (r.book(), r.chapter()) {
                    (Some(book), Some(chapter)) => println!("chapter: book={} chapter={}", book, chapter),
                    _ => println!("verse query: {}", reference.join(" ")),
                }
            }
            Ok(())
        }
        Commands::Read { reference, translation, .. } => {
            let client = client()?;
            let stdin = io::stdin();
            let mut input = BufReader::new(stdin.lock());
            let mut out = io::stdout();
            reader::Reader::new(&client, translation).run(&reference.join(" "), &mut input, &mut out)
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
