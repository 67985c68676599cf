use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncReadExt, BufReader};

use client::BackendClient;
use console::{App, AppConfig, Command, LogFormat, logging};

#[derive(Parser)]
#[command(name = "graphrag-console")]
#[command(about = "Ask a GraphRAG backend questions and upload documents to it")]
struct Args {
    /// Backend base URL (default from GRAPHRAG_API_URL, then http://localhost:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log output on stderr: pretty or json (default from GRAPHRAG_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Column at which source excerpts wrap (default from GRAPHRAG_WRAP_WIDTH)
    #[arg(long, global = true)]
    wrap_width: Option<usize>,

    /// Runs the interactive console when omitted
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Ask one question and print the answer
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Upload one document from a file, or from stdin when no file is given
    Upload { file: Option<PathBuf> },
    /// Upload several files in one request
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check backend health
    Health {
        /// Ask the query service instead, with per-store details
        #[arg(long)]
        query: bool,
    },
    /// Show document and entity counts
    Stats,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    if let Some(width) = args.wrap_width {
        config.wrap_width = width.max(20);
    }

    logging::init(config.log_format);
    tracing::info!(api_url = %config.api_url, "Using backend");

    let client = BackendClient::new(config.api_url.clone());
    let (mut app, mut events) = App::new(client, config.wrap_width);
    let mut stdout = std::io::stdout();

    let command = match args.mode {
        None => {
            println!("GraphRAG console, backend {}", config.api_url);
            println!("Type `help` for commands.");
            let input = BufReader::new(tokio::io::stdin());
            app.run(&mut events, input, &mut stdout).await?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Mode::Ask { question }) => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                bail!("The question is empty");
            }
            Command::Ask(question)
        }
        Some(Mode::Upload { file: Some(path) }) => Command::UploadFile(path),
        Some(Mode::Upload { file: None }) => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read document from stdin")?;
            if text.trim().is_empty() {
                bail!("No document content on stdin");
            }
            app.load_draft(text);
            Command::Upload
        }
        Some(Mode::Batch { files }) => Command::Batch(files),
        Some(Mode::Health { query: false }) => Command::Health,
        Some(Mode::Health { query: true }) => Command::QueryHealth,
        Some(Mode::Stats) => Command::Stats,
    };

    if app.run_once(&mut events, command, &mut stdout).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
