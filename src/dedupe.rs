//! Duplicate detection for candidate event ideas.
//!
//! A candidate is enriched with theme and broad era if it arrives without
//! them, compared against the memory slice sharing its (theme, era) key,
//! and judged by the text-generation collaborator. Every recoverable
//! failure is absorbed into an `error` verdict; the caller decides whether
//! to retry or queue the idea for manual review.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::eras::BroadEra;
use crate::llm::{ChatMessage, ChatModel};
use crate::memory::{memory_key, ThemeMemory};
use crate::models::{CandidateIdea, DuplicateVerdict, VerdictStatus};
use crate::prompts;
use crate::reply::strip_code_fences;
use crate::themes::Theme;

/// Canonical reason for a reply the classifier could not make sense of.
pub const PARSE_FAILURE_REASON: &str = "Failed to parse model response";

const DEDUPE_TEMPERATURE: f32 = 0.2;

/// Fill `broad_era` (from the year) and `theme` (inferred from title plus
/// description) when absent. Idempotent: present fields are never touched.
pub fn fill_classification(idea: &mut CandidateIdea) {
    if idea.broad_era.is_none() {
        if let Some(year) = idea.year {
            idea.broad_era = Some(BroadEra::classify(year));
        }
    }
    if idea.theme.is_none() {
        let combined = format!(
            "{} {}",
            idea.title,
            idea.description.as_deref().unwrap_or("")
        );
        idea.theme = Some(Theme::infer(&combined));
    }
}

#[derive(Debug, Error)]
pub enum VerdictParseError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognized status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Deserialize)]
struct WireVerdict {
    status: String,
    #[serde(default)]
    match_title: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse the collaborator's reply, tolerating a wrapping code fence. The
/// accepted status vocabulary is exactly {duplicate, variant, new};
/// anything else is a parse error.
pub fn parse_verdict(raw: &str) -> Result<DuplicateVerdict, VerdictParseError> {
    let wire: WireVerdict = serde_json::from_str(strip_code_fences(raw))?;
    let status = match wire.status.as_str() {
        "duplicate" => VerdictStatus::Duplicate,
        "variant" => VerdictStatus::Variant,
        "new" => VerdictStatus::New,
        other => return Err(VerdictParseError::UnknownStatus(other.to_string())),
    };
    Ok(DuplicateVerdict {
        status,
        match_title: wire.match_title,
        reason: wire.reason.unwrap_or_default(),
    })
}

pub struct DuplicateClassifier<'a, C: ChatModel> {
    model: &'a C,
    memory: &'a ThemeMemory,
}

impl<'a, C: ChatModel> DuplicateClassifier<'a, C> {
    pub fn new(model: &'a C, memory: &'a ThemeMemory) -> Self {
        DuplicateClassifier { model, memory }
    }

    /// Classify one candidate against its memory slice.
    ///
    /// Never returns an error: collaborator failures (after the client's
    /// retries) and unparsable replies both degrade to an `error` verdict,
    /// distinguishable by their reason text.
    pub async fn classify(&self, idea: &mut CandidateIdea) -> DuplicateVerdict {
        fill_classification(idea);

        let theme = idea.theme.map(|t| t.label());
        let broad_era = idea.broad_era.map(|e| e.label());
        let key = memory_key(theme, broad_era);
        let memory_slice = self.memory.lookup(theme, broad_era);

        debug!("Checking: {} -> {}", idea.title, key);
        if memory_slice.is_empty() {
            warn!("No memory found for theme+era: {}", key);
        }

        let prompt = prompts::duplicate_check(idea, memory_slice);
        let messages = [ChatMessage::user(prompt)];

        let raw = match self.model.complete(&messages, DEDUPE_TEMPERATURE).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Collaborator call failed for '{}': {}", idea.title, e);
                return DuplicateVerdict::error(format!("Collaborator call failed: {}", e));
            }
        };

        match parse_verdict(&raw) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    "Failed to parse model response for '{}': {} - raw output: {}",
                    idea.title, e, raw
                );
                DuplicateVerdict::error(PARSE_FAILURE_REASON)
            }
        }
    }
}
