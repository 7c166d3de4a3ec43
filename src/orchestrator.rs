//! Batch duplicate classification.

use anyhow::{Context, Result};
use futures::future::join_all;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::dedupe::DuplicateClassifier;
use crate::llm::ChatModel;
use crate::memory::ThemeMemory;
use crate::models::{CandidateIdea, ReportRow};

pub struct BatchOptions {
    /// Concurrent in-flight collaborator calls; 1 = strictly sequential
    /// (the reference behavior).
    pub parallelism: usize,
    /// When set, the report is also persisted here as pretty JSON.
    pub save_to: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions { parallelism: 1, save_to: None }
    }
}

/// Classify every idea and assemble the verdict report.
///
/// Report order is input order, in both the sequential and the chunked
/// concurrent mode. Individual `error` verdicts never short-circuit the
/// batch. The memory index is read-only for the whole run, so two
/// submissions of the same new idea in one batch will both come back
/// `new` - intra-batch cross-referencing is a non-goal.
pub async fn run_batch<C: ChatModel>(
    model: &C,
    memory: &ThemeMemory,
    mut ideas: Vec<CandidateIdea>,
    opts: &BatchOptions,
) -> Result<Vec<ReportRow>> {
    let start = Instant::now();
    let total = ideas.len();
    let parallelism = opts.parallelism.max(1);
    info!(
        "Batch classification starting - ideas={}, parallelism={}, memory_groups={}",
        total,
        parallelism,
        memory.group_count()
    );

    let classifier = DuplicateClassifier::new(model, memory);
    let mut report: Vec<ReportRow> = Vec::with_capacity(total);

    // Fixed-size chunks keep the report in input order: each chunk's
    // verdicts are collected in index order, not append-on-completion.
    for chunk in ideas.chunks_mut(parallelism) {
        let chunk_start = Instant::now();
        let verdicts = join_all(chunk.iter_mut().map(|idea| classifier.classify(idea))).await;
        for (idea, verdict) in chunk.iter().zip(verdicts) {
            report.push(ReportRow::new(idea.title.clone(), verdict));
        }

        let done = report.len();
        let pct = done * 100 / total.max(1);
        debug!(
            "Batch progress - {}/{} ({}%), chunk_duration={:.2}s",
            done,
            total,
            pct,
            chunk_start.elapsed().as_secs_f32()
        );
    }

    let tally: BTreeMap<&str, usize> = report
        .iter()
        .map(|r| r.status.as_str())
        .counts()
        .into_iter()
        .collect();
    info!(
        "Batch classification completed - duration={:.2}s, ideas={}, verdicts={:?}",
        start.elapsed().as_secs_f32(),
        total,
        tally
    );

    if let Some(path) = &opts.save_to {
        save_report(&report, path)?;
    }
    Ok(report)
}

pub fn save_report(report: &[ReportRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(report)?)
        .with_context(|| format!("Writing report {}", path.display()))?;
    info!("Deduplication results saved to: {}", path.display());
    Ok(())
}
