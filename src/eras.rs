use serde::{Deserialize, Serialize};

/// Coarse chronological buckets for grouping and filtering events.
///
/// Labels carry an ordinal prefix ("7. Industrial Age") so that sorting by
/// label string equals sorting chronologically. Anything that sorts eras by
/// their label relies on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BroadEra {
    #[serde(rename = "1. Deep Prehistory")]
    DeepPrehistory,
    #[serde(rename = "2. Early Prehistory")]
    EarlyPrehistory,
    #[serde(rename = "3. Late Prehistory")]
    LatePrehistory,
    #[serde(rename = "4. Ancient World")]
    AncientWorld,
    #[serde(rename = "5. Middle Ages")]
    MiddleAges,
    #[serde(rename = "6. Early Modern Era")]
    EarlyModernEra,
    #[serde(rename = "7. Industrial Age")]
    IndustrialAge,
    #[serde(rename = "8. 20th Century")]
    TwentiethCentury,
    #[serde(rename = "9. 21st Century")]
    TwentyFirstCentury,
}

impl BroadEra {
    pub const ALL: [BroadEra; 9] = [
        BroadEra::DeepPrehistory,
        BroadEra::EarlyPrehistory,
        BroadEra::LatePrehistory,
        BroadEra::AncientWorld,
        BroadEra::MiddleAges,
        BroadEra::EarlyModernEra,
        BroadEra::IndustrialAge,
        BroadEra::TwentiethCentury,
        BroadEra::TwentyFirstCentury,
    ];

    /// Bucket a (possibly negative, BCE) year into its broad era.
    ///
    /// Total over all of `i32`: upper bounds are inclusive and the ranges
    /// tile the whole year axis.
    pub fn classify(year: i32) -> Self {
        if year <= -300_000 {
            BroadEra::DeepPrehistory
        } else if year <= -100_000 {
            BroadEra::EarlyPrehistory
        } else if year <= -3_000 {
            BroadEra::LatePrehistory
        } else if year <= 500 {
            BroadEra::AncientWorld
        } else if year <= 1_500 {
            BroadEra::MiddleAges
        } else if year <= 1_800 {
            BroadEra::EarlyModernEra
        } else if year <= 1_945 {
            BroadEra::IndustrialAge
        } else if year <= 2_000 {
            BroadEra::TwentiethCentury
        } else {
            BroadEra::TwentyFirstCentury
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BroadEra::DeepPrehistory => "1. Deep Prehistory",
            BroadEra::EarlyPrehistory => "2. Early Prehistory",
            BroadEra::LatePrehistory => "3. Late Prehistory",
            BroadEra::AncientWorld => "4. Ancient World",
            BroadEra::MiddleAges => "5. Middle Ages",
            BroadEra::EarlyModernEra => "6. Early Modern Era",
            BroadEra::IndustrialAge => "7. Industrial Age",
            BroadEra::TwentiethCentury => "8. 20th Century",
            BroadEra::TwentyFirstCentury => "9. 21st Century",
        }
    }

    /// 1-based position on the timeline, same as the label prefix.
    pub fn ordinal(self) -> u8 {
        self as u8 + 1
    }
}

impl std::fmt::Display for BroadEra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_exactness() {
        assert_eq!(BroadEra::classify(-300_000), BroadEra::DeepPrehistory);
        assert_eq!(BroadEra::classify(-299_999), BroadEra::EarlyPrehistory);
        assert_eq!(BroadEra::classify(-100_000), BroadEra::EarlyPrehistory);
        assert_eq!(BroadEra::classify(-3_000), BroadEra::LatePrehistory);
        assert_eq!(BroadEra::classify(-2_999), BroadEra::AncientWorld);
        assert_eq!(BroadEra::classify(500), BroadEra::AncientWorld);
        assert_eq!(BroadEra::classify(501), BroadEra::MiddleAges);
        assert_eq!(BroadEra::classify(1_500), BroadEra::MiddleAges);
        assert_eq!(BroadEra::classify(1_800), BroadEra::EarlyModernEra);
        assert_eq!(BroadEra::classify(1_945), BroadEra::IndustrialAge);
        assert_eq!(BroadEra::classify(2_000), BroadEra::TwentiethCentury);
        assert_eq!(BroadEra::classify(2_001), BroadEra::TwentyFirstCentury);
    }

    #[test]
    fn total_and_monotonic_over_wide_range() {
        let mut prev = BroadEra::classify(-1_000_000);
        for year in (-1_000_000..=3_000).step_by(7) {
            let era = BroadEra::classify(year);
            assert!(BroadEra::ALL.contains(&era));
            assert!(era >= prev, "era went backwards at year {}", year);
            prev = era;
        }
        assert_eq!(prev, BroadEra::TwentyFirstCentury);
    }

    #[test]
    fn label_sort_is_chronological_sort() {
        let mut labels: Vec<&str> = BroadEra::ALL.iter().map(|e| e.label()).collect();
        labels.sort();
        let chronological: Vec<&str> = BroadEra::ALL.iter().map(|e| e.label()).collect();
        assert_eq!(labels, chronological);
    }

    #[test]
    fn ordinal_matches_label_prefix() {
        for era in BroadEra::ALL {
            assert!(era.label().starts_with(&format!("{}.", era.ordinal())));
        }
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&BroadEra::IndustrialAge).unwrap();
        assert_eq!(json, "\"7. Industrial Age\"");
        let back: BroadEra = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BroadEra::IndustrialAge);
    }
}
