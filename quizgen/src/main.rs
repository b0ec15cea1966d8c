//! The quizgen binary: extract quiz questions from a text file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use quizgen::output::{render_json, render_text};
use quizgen::prelude::*;
use quizgen_engine::config::DEFAULT_MAX_ATTEMPTS_PER_MODEL;
use quizgen_engine::{TracingReporter, DEFAULT_MODELS};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract questions from a UTF-8 text file
    Extract(ExtractArgs),
    /// Print the default model roster, most preferred first
    Models,
}

#[derive(Args)]
struct ExtractArgs {
    /// Text file to read, or `-` for stdin
    file: PathBuf,

    /// Comma-separated model roster, most preferred first
    #[arg(long, env = "QUIZGEN_MODELS")]
    models: Option<String>,

    /// Attempts per model before falling back to the next one
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS_PER_MODEL)]
    max_attempts: usize,

    /// Number of questions to ask for
    #[arg(long)]
    questions: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract(args) => run_extract(args).await,
        Commands::Models => {
            for model in DEFAULT_MODELS {
                println!("{model}");
            }
            Ok(())
        }
    }
}

async fn run_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let document = read_input(&args.file).await?;

    let api_key = args.api_key.ok_or(quizgen::Error::MissingApiKey)?;
    let client = Client::with_config(api_key, GeminiConfig::from_env())?;

    let roster = match args.models.as_deref() {
        Some(list) => ModelRoster::parse_list(list).map_err(quizgen::Error::from)?,
        None => ModelRoster::default(),
    };
    let mut config = ExtractionConfig::default().with_max_attempts_per_model(args.max_attempts);
    if let Some(count) = args.questions {
        config = config.with_question_count(count);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling extraction");
            on_interrupt.cancel();
        }
    });

    let options = ExtractionOptions::default()
        .with_roster(roster)
        .with_config(config)
        .with_reporter(TracingReporter)
        .with_cancellation(cancel);

    let result = client.extract_with(&document, &options).await?;

    if args.json {
        println!("{}", render_json(&result)?);
    } else {
        println!("{}", render_text(&result));
    }
    Ok(())
}

async fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
