// Consolidation engine: splitting, normalization, duplicate suppression,
// categorization, and final assembly, driven strictly in pipeline order.

use anyhow::Result;
use tracing::debug;

pub mod assemble;
pub mod categorize;
pub mod dedup;
pub mod normalize;
pub mod splitter;

// Re-export core types
pub use assemble::{render_merged_document, DocumentStat, MergeSummary};
pub use categorize::{categorize, group_by_category, Category};
pub use dedup::{DedupConfig, DuplicateDetector, SamplePolicy, Verdict};
pub use normalize::Normalizer;
pub use splitter::SectionSplitter;

/// A single input text blob identified by its display name. Immutable once
/// ingested; retained only long enough to compute size statistics.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub text: String,
}

/// A titled, contiguous run of lines from one document, the atomic unit of
/// deduplication and categorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
    /// Display name of the originating document.
    pub source: String,
}

/// Tunables for one consolidation run. All defaults mirror the constants
/// the tool has always shipped with.
#[derive(Debug, Clone)]
pub struct ConsolidateConfig {
    pub similarity_threshold: f64,
    pub min_meaningful_chars: usize,
    pub truncate_chars: usize,
    pub sample_cap: usize,
    pub sample_policy: SamplePolicy,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            min_meaningful_chars: 50,
            truncate_chars: normalize::DEFAULT_TRUNCATE_CHARS,
            sample_cap: 100,
            sample_policy: SamplePolicy::Front,
        }
    }
}

impl ConsolidateConfig {
    fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            similarity_threshold: self.similarity_threshold,
            min_meaningful_chars: self.min_meaningful_chars,
            sample_cap: self.sample_cap,
            sample_policy: self.sample_policy,
        }
    }
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    pub sections_found: usize,
    pub sections_accepted: usize,
    pub rejected_short: usize,
    pub rejected_exact: usize,
    pub rejected_near: usize,
    pub rejected_empty: usize,
}

/// Owns the per-run pipeline state. Documents must be fed in a fixed order
/// (callers sort by identifier) so the duplicate registry fills
/// deterministically; the detector is the only mutable state here.
pub struct Consolidator {
    splitter: SectionSplitter,
    detector: DuplicateDetector,
    accepted: Vec<Section>,
    considered: usize,
}

impl Consolidator {
    pub fn new(config: &ConsolidateConfig) -> Result<Self> {
        let normalizer = Normalizer::new(config.truncate_chars)?;
        Ok(Self {
            splitter: SectionSplitter::new()?,
            detector: DuplicateDetector::new(normalizer, config.dedup_config()),
            accepted: Vec::new(),
            considered: 0,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(&ConsolidateConfig::default())
    }

    /// Split one document into sections and run each through the duplicate
    /// detector, retaining the survivors.
    pub fn ingest_document(&mut self, document: &Document) -> IngestStats {
        let sections = self.splitter.split(&document.text, &document.name);
        let mut stats = IngestStats {
            sections_found: sections.len(),
            ..IngestStats::default()
        };

        for section in sections {
            self.considered += 1;
            match self.detector.evaluate(&section.body) {
                Verdict::Accepted => {
                    stats.sections_accepted += 1;
                    self.accepted.push(section);
                }
                Verdict::TooShort => stats.rejected_short += 1,
                Verdict::ExactDuplicate => stats.rejected_exact += 1,
                Verdict::NoTokens => stats.rejected_empty += 1,
                Verdict::NearDuplicate { similarity } => {
                    debug!(
                        source = %document.name,
                        title = %section.title,
                        similarity,
                        "dropped near-duplicate section"
                    );
                    stats.rejected_near += 1;
                }
            }
        }

        debug!(
            source = %document.name,
            found = stats.sections_found,
            accepted = stats.sections_accepted,
            "ingested document"
        );
        stats
    }

    /// Sections evaluated so far, across all documents.
    pub fn sections_considered(&self) -> usize {
        self.considered
    }

    /// Sections accepted so far, across all documents.
    pub fn sections_accepted(&self) -> usize {
        self.accepted.len()
    }

    /// Consume the run and hand the surviving sections to the categorizer.
    pub fn finish(self) -> Vec<(Category, Vec<Section>)> {
        group_by_category(self.accepted)
    }
}
