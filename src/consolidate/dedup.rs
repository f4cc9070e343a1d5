// Accept/reject policy for candidate sections plus the per-run registry of
// what has already been accepted.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};

use anyhow::Result;
use tracing::debug;

use super::normalize::Normalizer;

/// Which accepted forms the approximate-similarity check consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplePolicy {
    /// Keep only the earliest accepted forms, up to the cap. Similarity
    /// detection silently degrades for duplicates arriving after the cap
    /// fills; retained as the default for output stability across runs.
    #[default]
    Front,
    /// Sliding window over the most recently accepted forms.
    Recent,
}

/// Tunables for duplicate detection.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Jaccard similarity above which a candidate is a near-duplicate.
    pub similarity_threshold: f64,
    /// Normalized forms shorter than this are rejected outright.
    pub min_meaningful_chars: usize,
    /// Maximum number of registered forms consulted per candidate.
    pub sample_cap: usize,
    pub sample_policy: SamplePolicy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            min_meaningful_chars: 50,
            sample_cap: 100,
            sample_policy: SamplePolicy::Front,
        }
    }
}

/// Outcome of evaluating one candidate section body.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    /// Normalized form below the meaningful-content floor. Also absorbs
    /// bodies that normalize to nothing at all.
    TooShort,
    ExactDuplicate,
    /// Normalized form had no whitespace-delimited tokens.
    NoTokens,
    NearDuplicate { similarity: f64 },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// One run's worth of accepted content: exact-match keys plus the bounded
/// sample used for approximate comparison. Never outlives the detector.
#[derive(Debug, Default)]
struct SeenRegistry {
    hashes: HashSet<u64>,
    sample: VecDeque<String>,
}

/// Decides whether a section is redundant given previously accepted ones.
#[derive(Debug)]
pub struct DuplicateDetector {
    config: DedupConfig,
    normalizer: Normalizer,
    registry: SeenRegistry,
    buffer: String,
}

impl DuplicateDetector {
    pub fn new(normalizer: Normalizer, config: DedupConfig) -> Self {
        Self {
            config,
            normalizer,
            registry: SeenRegistry::default(),
            buffer: String::new(),
        }
    }

    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Normalizer::with_default_cap()?, DedupConfig::default()))
    }

    /// Evaluate a raw section body. On acceptance the normalized form is
    /// registered before the next candidate is seen.
    pub fn evaluate(&mut self, raw_body: &str) -> Verdict {
        let mut buffer = std::mem::take(&mut self.buffer);
        self.normalizer.normalize_into(raw_body, &mut buffer);
        let verdict = self.evaluate_normalized(&buffer);
        self.buffer = buffer;
        verdict
    }

    fn evaluate_normalized(&mut self, normalized: &str) -> Verdict {
        if normalized.chars().count() < self.config.min_meaningful_chars {
            return Verdict::TooShort;
        }

        let key = content_key(normalized);
        if self.registry.hashes.contains(&key) {
            return Verdict::ExactDuplicate;
        }

        let words: HashSet<&str> = normalized.split_whitespace().collect();
        if words.is_empty() {
            return Verdict::NoTokens;
        }

        for seen in self.registry.sample.iter().take(self.config.sample_cap) {
            let seen_words: HashSet<&str> = seen.split_whitespace().collect();
            if seen_words.is_empty() {
                continue;
            }
            let similarity = jaccard(&words, &seen_words);
            if similarity > self.config.similarity_threshold {
                debug!(similarity, "rejecting near-duplicate section");
                return Verdict::NearDuplicate { similarity };
            }
        }

        self.registry.hashes.insert(key);
        self.register_sample(normalized);
        Verdict::Accepted
    }

    fn register_sample(&mut self, normalized: &str) {
        match self.config.sample_policy {
            SamplePolicy::Front => {
                if self.registry.sample.len() < self.config.sample_cap {
                    self.registry.sample.push_back(normalized.to_string());
                }
            }
            SamplePolicy::Recent => {
                if self.registry.sample.len() == self.config.sample_cap {
                    self.registry.sample.pop_front();
                }
                self.registry.sample.push_back(normalized.to_string());
            }
        }
    }

    /// Number of distinct accepted forms so far.
    pub fn accepted_count(&self) -> usize {
        self.registry.hashes.len()
    }
}

/// Jaccard index of two word sets: |intersection| / |union|.
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn content_key(normalized: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    normalized.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Long enough to clear the 50-char floor once normalized.
    const BODY_A: &str =
        "The guardian daemon validates every incoming request before processing begins.";
    const BODY_B: &str =
        "Completely different content about teaching students the foundations of wisdom.";

    fn detector() -> DuplicateDetector {
        DuplicateDetector::with_defaults().unwrap()
    }

    #[test]
    fn test_short_body_rejected() {
        let mut d = detector();
        assert_eq!(d.evaluate("ok"), Verdict::TooShort);
        assert_eq!(d.evaluate(""), Verdict::TooShort);
    }

    #[test]
    fn test_exact_duplicate_rejected_second_time() {
        let mut d = detector();
        assert!(d.evaluate(BODY_A).is_accepted());
        assert_eq!(d.evaluate(BODY_A), Verdict::ExactDuplicate);
    }

    #[test]
    fn test_duplicate_detected_across_formatting_differences() {
        let mut d = detector();
        assert!(d.evaluate(BODY_A).is_accepted());
        // Same words, different whitespace and case: identical normalized form.
        let reflowed = BODY_A.to_uppercase().replace(' ', "\n");
        assert_eq!(d.evaluate(&reflowed), Verdict::ExactDuplicate);
    }

    #[test]
    fn test_near_duplicate_rejected() {
        let mut d = detector();
        assert!(d.evaluate(BODY_A).is_accepted());
        // One word substituted out of twelve: Jaccard well above 0.8.
        let near = BODY_A.replace("incoming", "inbound");
        match d.evaluate(&near) {
            Verdict::NearDuplicate { similarity } => assert!(similarity > 0.8),
            other => panic!("expected near-duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_distinct_content_accepted() {
        let mut d = detector();
        assert!(d.evaluate(BODY_A).is_accepted());
        assert!(d.evaluate(BODY_B).is_accepted());
        assert_eq!(d.accepted_count(), 2);
    }

    #[test]
    fn test_front_policy_stops_sampling_at_cap() {
        let config = DedupConfig {
            sample_cap: 2,
            min_meaningful_chars: 10,
            ..DedupConfig::default()
        };
        let mut d = DuplicateDetector::new(Normalizer::with_default_cap().unwrap(), config);

        assert!(d.evaluate("alpha beta gamma delta epsilon zeta").is_accepted());
        assert!(d.evaluate("one two three four five six seven").is_accepted());
        // Third accept falls outside the front sample.
        assert!(d
            .evaluate("red orange yellow green blue indigo violet crimson amber teal")
            .is_accepted());
        // Nine of ten words shared with the third: escapes the similarity
        // check because the front-bounded sample no longer grows.
        assert!(d
            .evaluate("red orange yellow green blue indigo violet crimson amber jade")
            .is_accepted());
    }

    #[test]
    fn test_recent_policy_slides_window() {
        let config = DedupConfig {
            sample_cap: 2,
            min_meaningful_chars: 10,
            sample_policy: SamplePolicy::Recent,
            ..DedupConfig::default()
        };
        let mut d = DuplicateDetector::new(Normalizer::with_default_cap().unwrap(), config);

        assert!(d.evaluate("alpha beta gamma delta epsilon zeta").is_accepted());
        assert!(d.evaluate("one two three four five six seven").is_accepted());
        assert!(d
            .evaluate("red orange yellow green blue indigo violet crimson amber teal")
            .is_accepted());
        // Same near-duplicate now falls inside the sliding window.
        match d.evaluate("red orange yellow green blue indigo violet crimson amber jade") {
            Verdict::NearDuplicate { .. } => {}
            other => panic!("expected near-duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        let a: HashSet<&str> = ["x", "y", "z"].into_iter().collect();
        let b: HashSet<&str> = ["x", "y", "z"].into_iter().collect();
        let c: HashSet<&str> = ["p", "q"].into_iter().collect();

        assert!((jaccard(&a, &b) - 1.0).abs() < f64::EPSILON);
        assert!((jaccard(&a, &c)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metadata_markers_do_not_defeat_dedup() {
        let mut d = detector();
        let tagged_a = format!("{BODY_A} # Lines 10-20 from source");
        let tagged_b = format!("{BODY_A} # Lines 90-95 from source");
        assert!(d.evaluate(&tagged_a).is_accepted());
        assert_eq!(d.evaluate(&tagged_b), Verdict::ExactDuplicate);
    }
}
