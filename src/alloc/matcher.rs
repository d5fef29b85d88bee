use crate::inventory::ContactRecord;
use crate::types::FastHashSet;
use smol_str::SmolStr;

/// Pluggable similarity between a normalized topic and a normalized
/// category label. Scores are ratios in `[0, 1]`, higher is closer.
pub trait SimilarityScore: Send + Sync {
    fn score(&self, topic: &str, category: &str) -> f64;
}

/// Normalized Levenshtein ratio over Unicode scalar values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl SimilarityScore for NormalizedLevenshtein {
    fn score(&self, topic: &str, category: &str) -> f64 {
        strsim::normalized_levenshtein(topic, category)
    }
}

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Resolves a free-text topic to one of the known category labels.
///
/// Containment wins over similarity: if the normalized topic occurs inside a
/// normalized label, the first such label is returned. Otherwise the label
/// with the highest score is returned when it reaches `threshold`. Ties in
/// either stage go to the label enumerated first.
pub struct CategoryMatcher {
    threshold: f64,
    scorer: Box<dyn SimilarityScore>,
}

impl Default for CategoryMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl std::fmt::Debug for CategoryMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryMatcher")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl CategoryMatcher {
    pub fn new(threshold: f64) -> Self {
        Self::with_scorer(threshold, NormalizedLevenshtein)
    }

    pub fn with_scorer(threshold: f64, scorer: impl SimilarityScore + 'static) -> Self {
        Self {
            threshold,
            scorer: Box::new(scorer),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the trimmed original label, or `None` when nothing qualifies.
    pub fn match_category(&self, topic: &str, categories: &[SmolStr]) -> Option<SmolStr> {
        let needle = normalize(topic);
        if needle.is_empty() {
            return None;
        }

        let candidates: Vec<(&str, String)> = categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| (c, normalize(c)))
            .collect();

        if let Some((label, _)) = candidates.iter().find(|(_, norm)| norm.contains(&needle)) {
            return Some(SmolStr::new(label));
        }

        let mut best: Option<(&str, f64)> = None;
        for (label, norm) in &candidates {
            let score = self.scorer.score(&needle, norm);
            // Strict comparison keeps the earliest label on equal scores.
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((*label, score));
            }
        }

        best.filter(|(_, score)| *score >= self.threshold)
            .map(|(label, _)| SmolStr::new(label))
    }
}

pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Distinct non-empty trimmed category labels, in order of first appearance.
/// `records` must already be ordered by position.
pub fn distinct_categories(records: &[ContactRecord]) -> Vec<SmolStr> {
    let mut seen = FastHashSet::default();
    let mut out = Vec::new();
    for record in records {
        let label = record.category.trim();
        if !label.is_empty() && seen.insert(label) {
            out.push(SmolStr::new(label));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::RecordDraft;

    fn labels(items: &[&str]) -> Vec<SmolStr> {
        items.iter().map(|s| SmolStr::new(s)).collect()
    }

    #[test]
    fn containment_beats_similarity() {
        let m = CategoryMatcher::default();
        let cats = labels(&["Cafes", "Restaurants", "Restaurant Supplies"]);
        assert_eq!(m.match_category("restaurant", &cats).as_deref(), Some("Restaurants"));
    }

    #[test]
    fn match_is_case_insensitive_and_trimmed() {
        let m = CategoryMatcher::default();
        let cats = labels(&["  Рестораны  ", "Кафе"]);
        assert_eq!(m.match_category("  РЕСТОРАН ", &cats).as_deref(), Some("Рестораны"));
    }

    #[test]
    fn similarity_fallback_with_threshold() {
        let m = CategoryMatcher::default();
        let cats = labels(&["Bakeries", "Florists"]);
        // Misspelled, so only the similarity stage can resolve it.
        assert_eq!(m.match_category("florest", &cats).as_deref(), Some("Florists"));
        assert_eq!(m.match_category("quantum physics", &cats), None);
    }

    #[test]
    fn blank_inputs_never_match() {
        let m = CategoryMatcher::default();
        assert_eq!(m.match_category("   ", &labels(&["Cafes"])), None);
        assert_eq!(m.match_category("cafes", &labels(&["", "  "])), None);
        assert_eq!(m.match_category("cafes", &[]), None);
    }

    #[test]
    fn ties_go_to_first_enumerated_label() {
        struct Flat;
        impl SimilarityScore for Flat {
            fn score(&self, _: &str, _: &str) -> f64 {
                0.9
            }
        }
        let m = CategoryMatcher::with_scorer(0.5, Flat);
        let cats = labels(&["Zoo", "Aquarium"]);
        assert_eq!(m.match_category("museum", &cats).as_deref(), Some("Zoo"));

        let both = labels(&["Pet shops", "Shops"]);
        assert_eq!(
            CategoryMatcher::default().match_category("shop", &both).as_deref(),
            Some("Pet shops")
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        struct Half;
        impl SimilarityScore for Half {
            fn score(&self, _: &str, _: &str) -> f64 {
                0.5
            }
        }
        let cats = labels(&["Cafes"]);
        assert!(CategoryMatcher::with_scorer(0.5, Half).match_category("x", &cats).is_some());
        assert!(CategoryMatcher::with_scorer(0.51, Half).match_category("x", &cats).is_none());
    }

    #[test]
    fn distinct_categories_first_seen_order() {
        let records: Vec<_> = ["Cafes", " Bakeries", "Cafes", "", "Bakeries ", "Zoo"]
            .into_iter()
            .enumerate()
            .map(|(i, c)| RecordDraft::new(c).into_record(i as u64))
            .collect();
        assert_eq!(
            distinct_categories(&records),
            labels(&["Cafes", "Bakeries", "Zoo"])
        );
    }
}
