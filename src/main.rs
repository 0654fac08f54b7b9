//! Webbrief CLI - web research and summarization service.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webbrief::{
    server, BatchFetcher, Config, ExtractiveSummarizer, GeminiSummarizer, GoogleSearch,
    HttpFetcher, Pipeline, Summarizer,
};

/// Webbrief - research a query on the web and condense what it finds
#[derive(Parser)]
#[command(name = "webbrief")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Summarize a query once and print the result
    Query(QueryArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address (host:port), overriding the configured one
    #[arg(short, long)]
    addr: Option<String>,
}

#[derive(Parser)]
struct QueryArgs {
    /// Search query
    query: String,

    /// Target summary length in words
    #[arg(short, long, default_value = "100")]
    length: u32,

    /// Summarize locally instead of calling the Gemini API
    #[arg(long)]
    local: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Query(args) => run_query(args).await,
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,webbrief=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_pipeline(config: &Config, force_local: bool) -> Pipeline {
    let provider = GoogleSearch::new(config.api_key.clone(), config.engine_id.clone());

    let mut batch = BatchFetcher::new(Arc::new(HttpFetcher::new()))
        .with_policy(config.fetch_policy())
        .with_fetch_timeout(config.fetch_timeout())
        .with_discard_on_abort(config.discard_on_abort);
    if let Some(limit) = config.concurrency {
        batch = batch.with_concurrency(limit);
    }

    let summarizer: Arc<dyn Summarizer> = match (&config.gemini_api_key, force_local) {
        (Some(key), false) => {
            Arc::new(GeminiSummarizer::new(key.clone()).with_model(config.gemini_model.clone()))
        }
        _ => Arc::new(ExtractiveSummarizer::new()),
    };

    let mut pipeline = Pipeline::new(Arc::new(provider), batch, summarizer)
        .with_max_links(config.max_links)
        .with_image_count(config.image_count)
        .with_global_timeout(config.global_timeout());
    if let Some(path) = &config.summary_file {
        pipeline = pipeline.with_summary_file(path.clone());
    }
    pipeline
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = Config::from_env()?;
    let addr = args.addr.unwrap_or_else(|| config.listen_addr.clone());

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set, using the extractive summarizer");
    }

    let pipeline = Arc::new(build_pipeline(&config, false));
    let app = server::router(pipeline);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_query(args: QueryArgs) -> Result<()> {
    let config = Config::from_env()?;
    if args.local && config.gemini_api_key.is_some() {
        info!("Summarizing locally as requested");
    }
    let pipeline = build_pipeline(&config, args.local);

    let brief = pipeline.run(&args.query, args.length).await?;

    match args.format {
        OutputFormat::Text => {
            println!("{}", brief.summary);
            if !brief.image_urls.is_empty() {
                println!();
                println!("Images:");
                for url in &brief.image_urls {
                    println!("  {}", url);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&brief)?);
        }
    }

    Ok(())
}
