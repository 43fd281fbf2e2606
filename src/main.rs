//! linkr is a CLI tool that resolves a pasted list of mentions against a
//! personal link directory and formats them, e.g. as a Markdown list.
//!
//! The tool has five commands:
//! 1. `match` - Resolves mentions from a file, asking for unknown links
//! 2. `links` - Lists and edits the link directory
//! 3. `suggest` - Shows web search suggestions for a name
//! 4. `extract` - Extracts mentions from a transcript using an LLM model
//! 5. `settings` - Shows or changes the output format

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use llm::builder::{LLMBackend, LLMBuilder};
use log::{LevelFilter, info};
use std::str::FromStr;
use url::Url;

use linkr::{
    NewLink, Session, StoreBackend,
    constants::{
        DEFAULT_CHUNK_SIZE, DEFAULT_SETTINGS_PATH, DEFAULT_STORE, JSONBIN_KEY_ENV_NAME,
        MODEL_API_KEY_ENV_NAME, SEARCH_API_KEY_ENV_NAME, SETTINGS_PATH_ENV_NAME,
    },
    extract::extract,
    interactive::run_match,
    parse_mentions,
    settings::Settings,
    store::DirectoryStore,
    suggest::{BraveSearch, NoSuggestions, SuggestionProvider},
    template::FormatTemplate,
};

/// Resolve pasted mentions to links from a personal directory
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    /// Link directory: "sqlite:<path>", "json:<path>" or "jsonbin:<bin id>"
    #[arg(long, short, global = true, default_value = DEFAULT_STORE)]
    store: StoreBackend,

    /// Path to the settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve mentions (one per line) and print the formatted output
    Match {
        /// Path to the file with mentions
        file: String,
    },
    /// List and edit the link directory
    Links {
        #[command(subcommand)]
        action: LinksCommand,
    },
    /// Show web search suggestions for a name
    Suggest {
        /// Free-text query
        query: String,
    },
    /// Extract mentions from a transcript using an LLM model
    Extract {
        /// URL of the LLM model to use for processing
        model: String,
        /// Path to the transcript file
        transcript: String,
        /// Path to the file with a prompt template
        #[arg(long, short = 'p')]
        prompt_file: Option<String>,
        /// Maximum chunk size in characters, 0 disables chunking
        #[arg(long, short = 'c', default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Rate limit: requests per minute (default: no limit)
        #[arg(long, short = 'r')]
        rpm: Option<u32>,
    },
    /// Show or change the output format
    Settings {
        /// New output format using {name} and {url} placeholders
        #[arg(long, short)]
        format: Option<FormatTemplate>,
    },
}

#[derive(Subcommand)]
enum LinksCommand {
    /// Print all links
    List,
    /// Add a link
    Add { name: String, url: String },
    /// Change the name and url of a link
    Update { id: String, name: String, url: String },
    /// Remove a link
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let settings_path = cli
        .settings
        .or_else(|| std::env::var(SETTINGS_PATH_ENV_NAME).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));

    match cli.command {
        Command::Match { file } => handle_match_command(&cli.store, &settings_path, &file).await,
        Command::Links { action } => handle_links_command(&cli.store, action).await,
        Command::Suggest { query } => handle_suggest_command(&query).await,
        Command::Extract {
            model,
            transcript,
            prompt_file,
            chunk_size,
            rpm,
        } => handle_extract_command(model, transcript, prompt_file, chunk_size, rpm).await,
        Command::Settings { format } => handle_settings_command(&settings_path, format),
    }
}

fn open_store(backend: &StoreBackend) -> Result<std::sync::Arc<dyn DirectoryStore>> {
    backend.open(std::env::var(JSONBIN_KEY_ENV_NAME).ok())
}

fn suggestion_provider() -> Result<Box<dyn SuggestionProvider>> {
    Ok(match std::env::var(SEARCH_API_KEY_ENV_NAME) {
        Ok(api_key) => Box::new(BraveSearch::new(api_key)?),
        Err(err) => {
            info!("{err} while providing search api key, suggestions disabled");
            Box::new(NoSuggestions)
        }
    })
}

async fn handle_match_command(
    backend: &StoreBackend,
    settings_path: &std::path::Path,
    file: &str,
) -> Result<()> {
    let settings = Settings::load(settings_path)?;
    let block =
        fs::read_to_string(file).context(format!("Failed to read mentions file: {file}"))?;
    let mentions = parse_mentions(&block);
    if mentions.is_empty() {
        info!("No mentions in {file}");
        return Ok(());
    }

    let store = open_store(backend)?;
    let suggester = suggestion_provider()?;
    let mut session = Session::open(store, settings.format).await?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_match(
        &mut session,
        suggester.as_ref(),
        mentions,
        &mut input,
        &mut output,
    )
    .await?;

    Ok(())
}

async fn handle_links_command(backend: &StoreBackend, action: LinksCommand) -> Result<()> {
    let store = open_store(backend)?;

    match action {
        LinksCommand::List => {
            for entry in store.list().await? {
                println!(
                    "{}\t{}\t{}",
                    entry.id.as_deref().unwrap_or("-"),
                    entry.name,
                    entry.url
                );
            }
        }
        LinksCommand::Add { name, url } => {
            let entry = store.create(NewLink::new(&name, &url)?).await?;
            info!("Added {} as {}", entry.name, entry.id.as_deref().unwrap_or("-"));
        }
        LinksCommand::Update { id, name, url } => {
            let entry = store.update(&id, NewLink::new(&name, &url)?).await?;
            info!("Updated {} to {} <{}>", id, entry.name, entry.url);
        }
        LinksCommand::Remove { id } => {
            store.delete(&id).await?;
            info!("Removed {id}");
        }
    }

    Ok(())
}

async fn handle_suggest_command(query: &str) -> Result<()> {
    let suggester = suggestion_provider()?;
    for suggestion in suggester.suggest(query).await {
        println!("{}\t{}", suggestion.title, suggestion.url);
    }

    Ok(())
}

async fn handle_extract_command(
    model: String,
    transcript_file: String,
    prompt_file: Option<String>,
    chunk_size: usize,
    rpm: Option<u32>,
) -> Result<()> {
    let model_url = Url::parse(&model).map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(
            [
                model_url
                    .host_str()
                    .context("Specify model name as host URL.")?,
                model_url.username(),
            ]
            .iter()
            .filter(|x| !x.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":"),
        );

    let llm_builder = match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(model_key) => {
            info!("API key is provided");
            llm_builder.api_key(model_key)
        }
        Err(err) => {
            info!("{err} while providing api key");
            llm_builder
        }
    };

    let prompt_template = match prompt_file {
        Some(file) => {
            let content =
                fs::read_to_string(&file).context(format!("Failed to read prompt file: {file}"))?;
            Some(content)
        }
        None => None,
    };

    let transcript = fs::read_to_string(&transcript_file)
        .context(format!("Failed to read transcript file: {transcript_file}"))?;

    let mentions = extract(
        llm_builder,
        &transcript,
        prompt_template.as_deref(),
        chunk_size,
        rpm,
    )
    .await?;
    println!("{mentions}");

    Ok(())
}

fn handle_settings_command(
    settings_path: &std::path::Path,
    format: Option<FormatTemplate>,
) -> Result<()> {
    let mut settings = Settings::load(settings_path)?;
    if let Some(format) = format {
        settings.format = format;
        settings.save(settings_path)?;
        info!("Saved format to {}", settings_path.display());
    }
    println!("{}", settings.format);

    Ok(())
}
