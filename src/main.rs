use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use eventsmith::config;
use eventsmith::enrich;
use eventsmith::ideas::{self, IdeaFilters};
use eventsmith::llm::LlmClient;
use eventsmith::memory::ThemeMemory;
use eventsmith::models::{CandidateIdea, EventRecord, IdeaInput};
use eventsmith::orchestrator::{self, BatchOptions};

/// Eventsmith - content pipeline for AI-generated historical event challenges
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (overrides ES_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Group the events collection into the (theme, era) memory index
    BuildMemory {
        /// Events collection JSON (array of event records)
        #[arg(long, default_value = "data/events.json")]
        events: PathBuf,

        /// Where to write the memory index
        #[arg(long, default_value = "data/theme_memory.json")]
        out: PathBuf,
    },

    /// Classify candidate ideas against the memory index
    Dedupe {
        /// Ideas JSON: array of bare titles and/or full records
        #[arg(long)]
        ideas: PathBuf,

        /// Memory index produced by build-memory
        #[arg(long, default_value = "data/theme_memory.json")]
        memory: PathBuf,

        /// Also write the verdict report to this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// Concurrent collaborator calls (1 = sequential)
        #[arg(long, default_value_t = 1)]
        parallelism: usize,
    },

    /// Generate fresh event-idea titles
    Generate {
        /// Restrict to one or more themes
        #[arg(long = "theme")]
        themes: Vec<String>,

        /// Restrict to one or more broad eras
        #[arg(long = "broad-era")]
        broad_eras: Vec<String>,

        /// Restrict to one or more regions
        #[arg(long = "region")]
        regions: Vec<String>,

        /// Number of ideas to generate
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Events collection used for the avoid-list
        #[arg(long, default_value = "data/events.json")]
        events: PathBuf,

        /// Where to write the generated ideas
        #[arg(long, default_value = "data/generated_ideas.json")]
        out: PathBuf,
    },

    /// Expand idea titles into full structured event records
    Enrich {
        /// Ideas JSON (array of titles)
        #[arg(long)]
        ideas: PathBuf,

        /// Pending-events file to append to
        #[arg(long, default_value = "data/pending_events.json")]
        out: PathBuf,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Decoding JSON {}", path.display()))
}

fn make_client(config_override: Option<&Path>) -> Result<LlmClient> {
    let cfg_path = config::resolve_config_path(config_override);
    let cfg = config::load_config(&cfg_path)?;
    Ok(LlmClient::new(cfg)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting eventsmith");
    let args = Args::parse();

    match args.command {
        Command::BuildMemory { events, out } => {
            let records: Vec<EventRecord> = read_json(&events)?;
            info!("Loaded {} events", records.len());
            let memory = ThemeMemory::build(&records);
            memory.save(&out)?;
        }

        Command::Dedupe { ideas, memory, save, parallelism } => {
            let client = make_client(args.config.as_deref())?;
            let memory = ThemeMemory::load(&memory)?;
            let inputs: Vec<IdeaInput> = read_json(&ideas)?;
            let candidates: Vec<CandidateIdea> = inputs.into_iter().map(Into::into).collect();

            let opts = BatchOptions { parallelism, save_to: save };
            let report = orchestrator::run_batch(&client, &memory, candidates, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Generate { themes, broad_eras, regions, count, events, out } => {
            let client = make_client(args.config.as_deref())?;
            let existing_titles: Vec<String> = match read_json::<Vec<EventRecord>>(&events) {
                Ok(records) => records.into_iter().map(|e| e.title).collect(),
                Err(e) => {
                    warn!("No events collection for the avoid-list ({}), proceeding without", e);
                    Vec::new()
                }
            };

            let filters = IdeaFilters { themes, broad_eras, regions };
            let titles = ideas::generate_ideas(&client, &filters, &existing_titles, count).await?;
            ideas::save_with_archive(&titles, &out)?;
        }

        Command::Enrich { ideas, out } => {
            let client = make_client(args.config.as_deref())?;
            let titles: Vec<String> = read_json(&ideas)?;
            enrich::enrich_batch(&client, &titles, &out).await?;
        }
    }

    Ok(())
}
