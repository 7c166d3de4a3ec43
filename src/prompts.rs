use crate::ideas::IdeaFilters;
use crate::models::{CandidateIdea, MemoryEntry};

/// Comparison instruction for one candidate against its memory slice.
pub fn duplicate_check(idea: &CandidateIdea, memory_slice: &[MemoryEntry]) -> String {
    let summaries = memory_slice
        .iter()
        .map(|e| {
            let year = e.year.map_or_else(|| "?".to_string(), |y| y.to_string());
            format!("- {} ({}): {}", e.title, year, e.description)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let year = idea.year.map_or_else(|| "unknown".to_string(), |y| y.to_string());
    let theme = idea.theme.map_or("unknown", |t| t.label());
    let broad_era = idea.broad_era.map_or("unknown", |e| e.label());
    let description = idea.description.as_deref().unwrap_or("");

    format!(
        r#"You are an assistant tasked with detecting duplicates in a historical events database.

Here is a new proposed event:
Title: {title}
Year: {year}
Theme: {theme}
Broad Era: {broad_era}
Description: {description}

Here are existing events in the same theme and era:
{summaries}

Please assess:
- Is this a duplicate of any listed event (same meaning)?
- Is it a variant (different title, but highly overlapping)?
- Or is it entirely new?

Return a JSON object with:
- "status": one of ["duplicate", "variant", "new"]
- "match_title": title it overlaps with, or null
- "reason": short explanation"#,
        title = idea.title,
        year = year,
        theme = theme,
        broad_era = broad_era,
        description = description,
        summaries = summaries,
    )
}

/// Scoped request for fresh event-idea titles, steering away from what the
/// collection already holds. Only the first 200 existing titles are sent.
pub fn idea_generation(filters: &IdeaFilters, existing_titles: &[String], count: usize) -> String {
    let scope = filters.scope_description();
    let avoid: Vec<&String> = existing_titles.iter().take(200).collect();
    let avoid_json = serde_json::to_string(&avoid).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are helping design new AI-generated historical event challenges for a game.

Each event must be unique and not redundant with existing entries.

Only generate events that match ALL of the following criteria:
{scope}

Here are existing titles to avoid repeating:
{avoid}

Now propose {count} new plausible historical events (real, famous or niche), each formatted as a single string title.
Only return a raw JSON array like:
[
"The Rise of the Khmer Empire in Southeast Asia",
"The Building of the Panama Canal"
]"#,
        scope = scope,
        avoid = avoid_json,
        count = count,
    )
}

/// Full structured-metadata request for a single event idea.
pub fn event_metadata(idea: &str) -> String {
    format!(
        r#"You are tasked with generating structured metadata for a historical event: "{idea}".

Respond in pure JSON format, without any commentary.

Required fields:
- title
- year (integer)
- coords (array [latitude, longitude])
- theme (pick from: wars & battles, foundational political moments, diplomacy & international relations, law & justice, social movements & protests, scientific & technological breakthroughs, natural disasters, architecture & engineering, exploration & discovery, art & culture, royalty & coronations, religious history, economic & industrial history, migration & demographic change)
- region (Africa, Americas, Asia, Europe, Oceania)
- notable_figures (comma-separated)
- visuals (array of 3-5 short visual elements)
- prompt (full image-generation prompt description)
- country
- city (if any)
- notable_location (if any)
- caption (1-2 sentence clue or contextual enrichment that hints at or deepens the event, for display after the game round)
- wiki_url (URL to the best matching Wikipedia article)

Special instructions:
- When generating the `prompt` field for the image, always follow this structure:
"A highly detailed, photo-realistic image of [title] as it might have appeared at the time.
The scene includes [visual elements], depicted with authentic clothing, environment, and technology from the historical era.
Captured as if by a high-resolution camera. No text or modern artifacts. Realistic proportions, cinematic style."
- Prioritize scenes that include recognizable city features, landscapes, important buildings, or architecture when relevant to the event.
- Human activity (e.g., battles, ceremonies, education) should still be central, but framed within authentic settings when possible.
- If the event takes place indoors, consider showing elements of the architecture or view of the surrounding location if appropriate.
- Ensure that clothing, crowns, tools, furniture, artifacts, and architecture match the specific time period (avoid anachronisms).
Respond only with valid JSON. No text around it."#,
        idea = idea,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eras::BroadEra;
    use crate::themes::Theme;

    #[test]
    fn duplicate_check_lists_memory_entries() {
        let idea = CandidateIdea {
            title: "The Crowning of Charlemagne".to_string(),
            year: Some(800),
            description: Some("Crowned Emperor of the Romans by Pope Leo III.".to_string()),
            theme: Some(Theme::RoyaltyCoronations),
            broad_era: Some(BroadEra::MiddleAges),
        };
        let slice = vec![MemoryEntry {
            title: "Coronation of Charlemagne".to_string(),
            year: Some(800),
            description: "Pope Leo III crowns Charlemagne.".to_string(),
            slug: Some("coronation-of-charlemagne".to_string()),
        }];
        let prompt = duplicate_check(&idea, &slice);
        assert!(prompt.contains("Title: The Crowning of Charlemagne"));
        assert!(prompt.contains("Theme: royalty & coronations"));
        assert!(prompt.contains("Broad Era: 5. Middle Ages"));
        assert!(prompt.contains("- Coronation of Charlemagne (800): Pope Leo III crowns Charlemagne."));
    }

    #[test]
    fn idea_generation_caps_existing_titles() {
        let existing: Vec<String> = (0..300).map(|i| format!("Event {}", i)).collect();
        let prompt = idea_generation(&IdeaFilters::default(), &existing, 10);
        assert!(prompt.contains("Event 199"));
        assert!(!prompt.contains("Event 200"));
    }
}
