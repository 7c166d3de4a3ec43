//! Expansion of bare idea titles into full structured event records.
//!
//! One collaborator call per idea produces the raw metadata; everything
//! derivable is then recomputed deterministically on this side: slug,
//! normalized coordinates, validated theme, broad era, stable id.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::eras::BroadEra;
use crate::llm::{ChatMessage, ChatModel};
use crate::prompts;
use crate::reply::extract_json_block;
use crate::themes::Theme;

const ENRICH_TEMPERATURE: f32 = 0.2;
const DEFAULT_DIFFICULTY: u8 = 3;

/// Wire shape of the collaborator's metadata reply. Optional fields default
/// rather than fail; the required ones make the record unusable if absent.
#[derive(Debug, Deserialize)]
struct WireMetadata {
    title: String,
    year: i32,
    coords: serde_json::Value,
    theme: String,
    region: String,
    prompt: String,
    #[serde(default)]
    notable_figures: String,
    #[serde(default)]
    visuals: Vec<String>,
    #[serde(default)]
    difficulty: Option<u8>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    notable_location: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    wiki_url: Option<String>,
}

/// Full structured record, ready for upsert by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub year: i32,
    pub coords: [f64; 2],
    pub theme: Theme,
    pub broad_era: BroadEra,
    pub region: String,
    pub notable_figures: String,
    pub visuals: Vec<String>,
    pub prompt: String,
    pub image_url: String,
    pub difficulty: u8,
    pub source: String,
    pub country: String,
    pub city: String,
    pub notable_location: String,
    pub caption: String,
    pub wiki_url: String,
}

/// Lower-case, collapse non-alphanumeric runs to `-`, trim the ends.
pub fn slugify(text: &str) -> String {
    let re = Regex::new(r"[^a-z0-9]+").unwrap();
    re.replace_all(&text.trim().to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Coords arrive as either a `"lat, lon"` string or a two-element array of
/// numbers (or numeric strings). Anything else is rejected.
pub fn normalize_coords(value: &serde_json::Value) -> Result<[f64; 2]> {
    match value {
        serde_json::Value::String(s) => {
            let parts: Vec<&str> = s.split(',').collect();
            if parts.len() != 2 {
                bail!("Invalid coords format: {}", s);
            }
            Ok([
                parts[0].trim().parse().context("Parsing latitude")?,
                parts[1].trim().parse().context("Parsing longitude")?,
            ])
        }
        serde_json::Value::Array(items) if items.len() == 2 => {
            Ok([coord_component(&items[0])?, coord_component(&items[1])?])
        }
        other => bail!("Invalid coords format: {}", other),
    }
}

fn coord_component(value: &serde_json::Value) -> Result<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().context("Coords component out of range"),
        serde_json::Value::String(s) => s.trim().parse().context("Parsing coords component"),
        other => bail!("Invalid coords component: {}", other),
    }
}

/// Stable record id for events that do not have one yet.
fn event_id(slug: &str, year: i32) -> String {
    format!("{:016x}", xxh3_64(format!("{}|{}", slug, year).as_bytes()))
}

pub async fn enrich_event<C: ChatModel>(model: &C, idea: &str) -> Result<EnrichedEvent> {
    let prompt = prompts::event_metadata(idea);
    let messages = [ChatMessage::user(prompt)];
    let raw = model.complete(&messages, ENRICH_TEMPERATURE).await?;

    let wire: WireMetadata = serde_json::from_str(extract_json_block(&raw))
        .with_context(|| format!("Invalid metadata JSON for '{}'", idea))?;

    let slug = slugify(&wire.title);
    let coords = normalize_coords(&wire.coords)?;
    let theme = Theme::from_label_or_fallback(&wire.theme);
    let broad_era = BroadEra::classify(wire.year);
    let id = event_id(&slug, wire.year);
    let image_url = format!("/images/{}.jpg", slug);

    Ok(EnrichedEvent {
        id,
        title: wire.title,
        slug,
        year: wire.year,
        coords,
        theme,
        broad_era,
        region: wire.region,
        notable_figures: wire.notable_figures,
        visuals: wire.visuals,
        prompt: wire.prompt,
        image_url,
        difficulty: wire.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
        source: "AI-generated based on historical records".to_string(),
        country: wire.country.unwrap_or_else(|| "Unknown".to_string()),
        city: wire.city.unwrap_or_default(),
        notable_location: wire.notable_location.unwrap_or_default(),
        caption: wire.caption.unwrap_or_default(),
        wiki_url: wire.wiki_url.unwrap_or_default(),
    })
}

/// Enrich a list of ideas, appending each success to the pending-events
/// file as it lands. A failed idea is logged and skipped, never fatal.
pub async fn enrich_batch<C: ChatModel>(
    model: &C,
    ideas: &[String],
    out_path: &Path,
) -> Result<usize> {
    let mut events = load_pending(out_path)?;
    let mut succeeded = 0usize;

    for idea in ideas {
        match enrich_event(model, idea).await {
            Ok(event) => {
                info!("Success: {}", event.title);
                events.push(event);
                succeeded += 1;
                save_pending(&events, out_path)?;
            }
            Err(e) => {
                warn!("Error processing '{}': {}", idea, e);
            }
        }
    }

    info!(
        "Enrichment completed - succeeded={}, failed={}",
        succeeded,
        ideas.len() - succeeded
    );
    Ok(succeeded)
}

fn load_pending(path: &Path) -> Result<Vec<EnrichedEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading pending events {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Decoding pending events {}", path.display()))
}

fn save_pending(events: &[EnrichedEvent], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(events)?)
        .with_context(|| format!("Writing pending events {}", path.display()))
}
