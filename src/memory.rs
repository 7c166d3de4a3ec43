use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::models::{EventRecord, MemoryEntry};

/// Composite grouping key, `"{theme} | {broad_era}"`. Trimmed, NFC-normalized
/// and lower-cased; a missing part becomes the literal `"unknown"`. Both the
/// build and lookup paths go through here, so the two can never disagree on
/// key shape.
pub fn memory_key(theme: Option<&str>, broad_era: Option<&str>) -> String {
    format!("{} | {}", normalize_part(theme), normalize_part(broad_era))
}

fn normalize_part(part: Option<&str>) -> String {
    match part {
        Some(s) => s.trim().nfc().collect::<String>().to_lowercase(),
        None => "unknown".to_string(),
    }
}

/// Read-only comparison memory: previously accepted events grouped by
/// (theme, broad era). Built offline from the full events collection and
/// loaded once at startup; the deduplication flow never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeMemory {
    groups: BTreeMap<String, Vec<MemoryEntry>>,
}

impl ThemeMemory {
    /// Group the events collection by composite key. Entries within a group
    /// keep input order (append-only, not sorted).
    pub fn build(events: &[EventRecord]) -> Self {
        let mut groups: BTreeMap<String, Vec<MemoryEntry>> = BTreeMap::new();
        for event in events {
            let key = memory_key(event.theme.as_deref(), event.broad_era.as_deref());
            // caption is the curated short text when present; fall back to
            // the long description.
            let description = event
                .caption
                .clone()
                .filter(|c| !c.trim().is_empty())
                .or_else(|| event.description.clone())
                .unwrap_or_default();
            groups.entry(key).or_default().push(MemoryEntry {
                title: event.title.clone(),
                year: event.year,
                description,
                slug: event.slug.clone(),
            });
        }
        let memory = ThemeMemory { groups };
        info!(
            "Memory built - events={}, groups={}",
            events.len(),
            memory.group_count()
        );
        memory
    }

    /// The comparison slice for a (theme, era) pair. An absent group is not
    /// an error, just "no comparison data": an empty slice.
    pub fn lookup(&self, theme: Option<&str>, broad_era: Option<&str>) -> &[MemoryEntry] {
        self.groups
            .get(&memory_key(theme, broad_era))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading memory file {}", path.display()))?;
        let memory: ThemeMemory = serde_json::from_str(&raw)
            .with_context(|| format!("Decoding memory JSON {}", path.display()))?;
        debug!(
            "Memory loaded - path={}, groups={}, entries={}",
            path.display(),
            memory.group_count(),
            memory.entry_count()
        );
        Ok(memory)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating {}", parent.display()))?;
        }
        let raw = serde_json::to_vec_pretty(&self.groups)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Writing memory file {}", path.display()))?;
        info!(
            "Memory written - path={}, groups={}",
            path.display(),
            self.group_count()
        );
        Ok(())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, theme: Option<&str>, era: Option<&str>) -> EventRecord {
        EventRecord {
            title: title.to_string(),
            year: Some(1900),
            description: Some("long description".to_string()),
            caption: None,
            slug: Some("slug".to_string()),
            theme: theme.map(str::to_string),
            broad_era: era.map(str::to_string),
        }
    }

    #[test]
    fn key_is_lowercased_with_exact_separator() {
        assert_eq!(
            memory_key(Some("Wars & Battles"), Some("7. Industrial Age")),
            "wars & battles | 7. industrial age"
        );
    }

    #[test]
    fn key_defaults_missing_parts_to_unknown() {
        assert_eq!(memory_key(None, None), "unknown | unknown");
        assert_eq!(
            memory_key(Some("law & justice"), None),
            "law & justice | unknown"
        );
    }

    #[test]
    fn key_trims_and_normalizes() {
        assert_eq!(
            memory_key(Some("  Art & Culture "), Some(" 5. Middle Ages")),
            "art & culture | 5. middle ages"
        );
    }

    #[test]
    fn build_groups_by_key_in_input_order() {
        let events = vec![
            event("First", Some("Wars & Battles"), Some("7. Industrial Age")),
            event("Other", Some("law & justice"), Some("4. Ancient World")),
            event("Second", Some("wars & battles"), Some("7. industrial age")),
        ];
        let memory = ThemeMemory::build(&events);
        assert_eq!(memory.group_count(), 2);

        let slice = memory.lookup(Some("wars & battles"), Some("7. Industrial Age"));
        let titles: Vec<&str> = slice.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn caption_wins_over_description() {
        let mut with_caption = event("Captioned", Some("art & culture"), None);
        with_caption.caption = Some("short caption".to_string());
        let memory = ThemeMemory::build(&[with_caption]);
        let slice = memory.lookup(Some("art & culture"), None);
        assert_eq!(slice[0].description, "short caption");
    }

    #[test]
    fn lookup_missing_group_is_empty_not_error() {
        let memory = ThemeMemory::default();
        assert!(memory.lookup(Some("wars & battles"), Some("4. Ancient World")).is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let events = vec![event("Kept", Some("religious history"), Some("5. Middle Ages"))];
        let memory = ThemeMemory::build(&events);

        let path = std::env::temp_dir()
            .join(format!("eventsmith-memory-{}.json", std::process::id()));
        memory.save(&path).unwrap();
        let loaded = ThemeMemory::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.group_count(), 1);
        let slice = loaded.lookup(Some("religious history"), Some("5. Middle Ages"));
        assert_eq!(slice[0].title, "Kept");
        assert_eq!(slice[0].year, Some(1900));
    }
}
