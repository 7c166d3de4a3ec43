//! Scoped generation of fresh event-idea titles.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::llm::{ChatMessage, ChatModel};
use crate::prompts;
use crate::reply::strip_code_fences;

const IDEA_TEMPERATURE: f32 = 0.7;

/// Scoping constraints for idea generation. Empty means unconstrained.
#[derive(Debug, Clone, Default)]
pub struct IdeaFilters {
    pub themes: Vec<String>,
    pub broad_eras: Vec<String>,
    pub regions: Vec<String>,
}

impl IdeaFilters {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty() && self.broad_eras.is_empty() && self.regions.is_empty()
    }

    /// Human-readable scope block for the instruction text.
    pub fn scope_description(&self) -> String {
        let mut lines = Vec::new();
        if !self.themes.is_empty() {
            lines.push(format!("- Theme: {}", self.themes.join(", ")));
        }
        if !self.broad_eras.is_empty() {
            lines.push(format!("- Broad era: {}", self.broad_eras.join(", ")));
        }
        if !self.regions.is_empty() {
            lines.push(format!("- Region: {}", self.regions.join(", ")));
        }
        if lines.is_empty() {
            "No constraints (any theme, era, or region)".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Ask the collaborator for `count` fresh idea titles within the given
/// scope, steering clear of the existing collection. The reply must be a
/// JSON array of strings (fence-wrapped is tolerated); anything else is a
/// hard error, there is no per-item verdict to degrade to at this stage.
pub async fn generate_ideas<C: ChatModel>(
    model: &C,
    filters: &IdeaFilters,
    existing_titles: &[String],
    count: usize,
) -> Result<Vec<String>> {
    info!(
        "Generating ideas - count={}, scope=[{}]",
        count,
        filters.scope_description().replace('\n', "; ")
    );

    let prompt = prompts::idea_generation(filters, existing_titles, count);
    let messages = [ChatMessage::user(prompt)];
    let raw = model.complete(&messages, IDEA_TEMPERATURE).await?;
    debug!("Raw model response: {}", raw);

    let ideas: Vec<String> = serde_json::from_str(strip_code_fences(&raw))
        .context("Parsing model response as a JSON array of titles")?;
    info!("Generated {} new event ideas", ideas.len());
    Ok(ideas)
}

/// Write the ideas file, plus a timestamped copy under `archive/` next to
/// it. Returns the archive path.
pub fn save_with_archive(ideas: &[String], out_path: &Path) -> Result<PathBuf> {
    let raw = serde_json::to_vec_pretty(ideas)?;
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating {}", parent.display()))?;
    }
    std::fs::write(out_path, &raw)
        .with_context(|| format!("Writing ideas file {}", out_path.display()))?;

    let archive_dir = out_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .join("archive");
    std::fs::create_dir_all(&archive_dir)
        .with_context(|| format!("Creating {}", archive_dir.display()))?;
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let archive_path = archive_dir.join(format!("generated_ideas_{}.json", timestamp));
    std::fs::write(&archive_path, &raw)
        .with_context(|| format!("Writing archive copy {}", archive_path.display()))?;

    info!(
        "Ideas saved to {} (archived to {})",
        out_path.display(),
        archive_path.display()
    );
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;

    #[test]
    fn scope_description_lists_active_filters() {
        let filters = IdeaFilters {
            themes: vec!["wars & battles".to_string()],
            broad_eras: vec!["5. Middle Ages".to_string(), "6. Early Modern Era".to_string()],
            regions: vec![],
        };
        let scope = filters.scope_description();
        assert!(scope.contains("- Theme: wars & battles"));
        assert!(scope.contains("- Broad era: 5. Middle Ages, 6. Early Modern Era"));
        assert!(!scope.contains("- Region:"));
    }

    #[test]
    fn empty_filters_mean_no_constraints() {
        assert_eq!(
            IdeaFilters::default().scope_description(),
            "No constraints (any theme, era, or region)"
        );
    }

    #[tokio::test]
    async fn parses_fenced_title_array() {
        let model = ScriptedModel::single(
            "```json\n[\"The Rise of the Khmer Empire\", \"The Building of the Panama Canal\"]\n```",
        );
        let ideas = generate_ideas(&model, &IdeaFilters::default(), &[], 2)
            .await
            .unwrap();
        assert_eq!(
            ideas,
            vec![
                "The Rise of the Khmer Empire".to_string(),
                "The Building of the Panama Canal".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn non_array_reply_is_a_hard_error() {
        let model = ScriptedModel::single("Sorry, I can't help with that.");
        let result = generate_ideas(&model, &IdeaFilters::default(), &[], 2).await;
        assert!(result.is_err());
    }

    #[test]
    fn save_writes_file_and_archive_copy() {
        let dir = std::env::temp_dir().join(format!("eventsmith-ideas-{}", std::process::id()));
        let out = dir.join("generated_ideas.json");
        let ideas = vec!["A".to_string(), "B".to_string()];

        let archive_path = save_with_archive(&ideas, &out).unwrap();
        let reread: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(reread, ideas);
        assert!(archive_path.exists());
        assert!(archive_path.starts_with(dir.join("archive")));

        std::fs::remove_dir_all(&dir).ok();
    }
}
