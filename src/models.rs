use serde::{Deserialize, Serialize};

use crate::eras::BroadEra;
use crate::themes::Theme;

/// An unverified, possibly incomplete proposed historical event awaiting
/// classification. `theme` and `broad_era` are filled in during enrichment
/// if absent; nothing else is ever mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateIdea {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub broad_era: Option<BroadEra>,
}

impl CandidateIdea {
    pub fn from_title(title: impl Into<String>) -> Self {
        CandidateIdea {
            title: title.into(),
            year: None,
            description: None,
            theme: None,
            broad_era: None,
        }
    }
}

/// On-disk candidate forms: idea files hold either bare title strings
/// (generator output) or full records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdeaInput {
    Title(String),
    Record(CandidateIdea),
}

impl From<IdeaInput> for CandidateIdea {
    fn from(input: IdeaInput) -> Self {
        match input {
            IdeaInput::Title(title) => CandidateIdea::from_title(title),
            IdeaInput::Record(idea) => idea,
        }
    }
}

/// A row of the external events collection the memory index is built from.
/// The collection carries many more fields; only these matter here, and
/// theme/era are kept as loose strings since the data predates the closed
/// vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub broad_era: Option<String>,
}

/// Trimmed summary of an accepted event, the unit of comparison context
/// handed to the duplicate classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Duplicate,
    Variant,
    New,
    Error,
}

impl VerdictStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerdictStatus::Duplicate => "duplicate",
            VerdictStatus::Variant => "variant",
            VerdictStatus::New => "new",
            VerdictStatus::Error => "error",
        }
    }
}

/// The classifier's judgment on one candidate against its memory slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateVerdict {
    pub status: VerdictStatus,
    pub match_title: Option<String>,
    pub reason: String,
}

impl DuplicateVerdict {
    /// Degraded verdict for any failure the classifier absorbs rather than
    /// propagates.
    pub fn error(reason: impl Into<String>) -> Self {
        DuplicateVerdict {
            status: VerdictStatus::Error,
            match_title: None,
            reason: reason.into(),
        }
    }
}

/// One line of the batch report, parallel to the input ideas list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub title: String,
    pub status: VerdictStatus,
    pub match_title: Option<String>,
    pub reason: String,
}

impl ReportRow {
    pub fn new(title: impl Into<String>, verdict: DuplicateVerdict) -> Self {
        ReportRow {
            title: title.into(),
            status: verdict.status,
            match_title: verdict.match_title,
            reason: verdict.reason,
        }
    }
}
