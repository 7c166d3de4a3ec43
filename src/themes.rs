use serde::{Deserialize, Serialize};
use tracing::warn;

/// Closed vocabulary of topical categories. Every event carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "wars & battles")]
    WarsBattles,
    #[serde(rename = "foundational political moments")]
    FoundationalPoliticalMoments,
    #[serde(rename = "diplomacy & international relations")]
    DiplomacyInternationalRelations,
    #[serde(rename = "law & justice")]
    LawJustice,
    #[serde(rename = "social movements & protests")]
    SocialMovementsProtests,
    #[serde(rename = "scientific & technological breakthroughs")]
    ScientificTechnologicalBreakthroughs,
    #[serde(rename = "natural disasters")]
    NaturalDisasters,
    #[serde(rename = "architecture & engineering")]
    ArchitectureEngineering,
    #[serde(rename = "exploration & discovery")]
    ExplorationDiscovery,
    #[serde(rename = "art & culture")]
    ArtCulture,
    #[serde(rename = "royalty & coronations")]
    RoyaltyCoronations,
    #[serde(rename = "religious history")]
    ReligiousHistory,
    #[serde(rename = "economic & industrial history")]
    EconomicIndustrialHistory,
    #[serde(rename = "migration & demographic change")]
    MigrationDemographicChange,
}

impl Theme {
    /// Declared order doubles as the containment-matching order in
    /// [`Theme::infer`]; keep it stable.
    pub const ALL: [Theme; 14] = [
        Theme::WarsBattles,
        Theme::FoundationalPoliticalMoments,
        Theme::DiplomacyInternationalRelations,
        Theme::LawJustice,
        Theme::SocialMovementsProtests,
        Theme::ScientificTechnologicalBreakthroughs,
        Theme::NaturalDisasters,
        Theme::ArchitectureEngineering,
        Theme::ExplorationDiscovery,
        Theme::ArtCulture,
        Theme::RoyaltyCoronations,
        Theme::ReligiousHistory,
        Theme::EconomicIndustrialHistory,
        Theme::MigrationDemographicChange,
    ];

    pub const FALLBACK: Theme = Theme::ArtCulture;

    pub fn label(self) -> &'static str {
        match self {
            Theme::WarsBattles => "wars & battles",
            Theme::FoundationalPoliticalMoments => "foundational political moments",
            Theme::DiplomacyInternationalRelations => "diplomacy & international relations",
            Theme::LawJustice => "law & justice",
            Theme::SocialMovementsProtests => "social movements & protests",
            Theme::ScientificTechnologicalBreakthroughs => "scientific & technological breakthroughs",
            Theme::NaturalDisasters => "natural disasters",
            Theme::ArchitectureEngineering => "architecture & engineering",
            Theme::ExplorationDiscovery => "exploration & discovery",
            Theme::ArtCulture => "art & culture",
            Theme::RoyaltyCoronations => "royalty & coronations",
            Theme::ReligiousHistory => "religious history",
            Theme::EconomicIndustrialHistory => "economic & industrial history",
            Theme::MigrationDemographicChange => "migration & demographic change",
        }
    }

    /// Crude containment heuristic over free text, not NLP: lower-case the
    /// input and return the first label (declared order) that appears in it
    /// verbatim. Falls back to `art & culture`, so the function is total.
    pub fn infer(text: &str) -> Theme {
        let text = text.to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| text.contains(t.label()))
            .unwrap_or(Theme::FALLBACK)
    }

    /// Exact label lookup (trimmed, case-insensitive). `None` for anything
    /// outside the vocabulary.
    pub fn from_label(label: &str) -> Option<Theme> {
        let wanted = label.trim().to_lowercase();
        Theme::ALL.into_iter().find(|t| t.label() == wanted)
    }

    /// Label lookup that never fails: unknown labels are logged and mapped
    /// to the fallback theme.
    pub fn from_label_or_fallback(label: &str) -> Theme {
        Theme::from_label(label).unwrap_or_else(|| {
            warn!("Unknown theme '{}', defaulting to '{}'", label, Theme::FALLBACK.label());
            Theme::FALLBACK
        })
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_is_total_with_fallback() {
        assert_eq!(Theme::infer(""), Theme::ArtCulture);
        assert_eq!(Theme::infer("an unremarkable afternoon"), Theme::ArtCulture);
    }

    #[test]
    fn infer_matches_contained_label() {
        assert_eq!(
            Theme::infer("a story about wars & battles in the east"),
            Theme::WarsBattles
        );
        assert_eq!(
            Theme::infer("The great natural disasters of Lisbon"),
            Theme::NaturalDisasters
        );
    }

    #[test]
    fn infer_is_case_insensitive() {
        assert_eq!(Theme::infer("LAW & JUSTICE prevails"), Theme::LawJustice);
    }

    #[test]
    fn infer_ties_break_by_declared_order() {
        // Both labels appear; "wars & battles" is declared before
        // "art & culture" so it wins.
        let text = "art & culture during wars & battles";
        assert_eq!(Theme::infer(text), Theme::WarsBattles);
    }

    #[test]
    fn from_label_round_trips_all() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_label(theme.label()), Some(theme));
        }
        assert_eq!(Theme::from_label("  Wars & Battles  "), Some(Theme::WarsBattles));
        assert_eq!(Theme::from_label("cooking"), None);
    }

    #[test]
    fn unknown_label_falls_back() {
        assert_eq!(Theme::from_label_or_fallback("cooking"), Theme::ArtCulture);
    }

    #[test]
    fn serializes_as_lowercase_label() {
        let json = serde_json::to_string(&Theme::WarsBattles).unwrap();
        assert_eq!(json, "\"wars & battles\"");
        let back: Theme = serde_json::from_str("\"religious history\"").unwrap();
        assert_eq!(back, Theme::ReligiousHistory);
    }
}
