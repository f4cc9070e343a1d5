// Final document rendering. Pure formatting: every filtering and ordering
// decision has already happened upstream.

use super::categorize::Category;
use super::Section;

/// Per-document size entry for the closing statistics block.
#[derive(Debug, Clone)]
pub struct DocumentStat {
    pub name: String,
    pub chars: usize,
}

/// Everything the assembler needs besides the sections themselves.
#[derive(Debug, Clone)]
pub struct MergeSummary {
    /// Human-readable description of where the corpus came from.
    pub source_label: String,
    pub documents: Vec<DocumentStat>,
    pub sections_considered: usize,
    pub sections_accepted: usize,
}

impl MergeSummary {
    pub fn duplicates_removed(&self) -> usize {
        self.sections_considered.saturating_sub(self.sections_accepted)
    }
}

/// Render the merged document: header, table of contents, categorized
/// sections in declaration order, closing statistics.
pub fn render_merged_document(
    groups: &[(Category, Vec<Section>)],
    summary: &MergeSummary,
) -> String {
    let mut out = String::new();

    out.push_str("# CONSOLIDATED REFERENCE: Merged Text Corpus\n");
    out.push_str(&format!("## Generated from: {}\n", summary.source_label));
    out.push_str(&format!(
        "## Total files processed: {}\n\n",
        summary.documents.len()
    ));
    out.push_str("---\n\n");

    out.push_str("## TABLE OF CONTENTS\n\n");
    for (category, sections) in groups {
        out.push_str(&format!(
            "- **{}** ({} sections)\n",
            category.name(),
            sections.len()
        ));
    }
    out.push_str("\n---\n\n");

    for (category, sections) in groups {
        out.push_str(&format!("# {}\n\n", category.name().to_uppercase()));

        for (i, section) in sections.iter().enumerate() {
            out.push_str(&format!(
                "## {} Section {}: {}\n",
                category.name(),
                i + 1,
                section.title
            ));
            out.push_str(&format!("*Source: {}*\n\n", section.source));
            out.push_str(&section.body);
            out.push_str("\n\n---\n\n");
        }
    }

    out.push_str("# PROCESSING STATISTICS\n\n");
    out.push_str("## File Statistics:\n");
    for doc in &summary.documents {
        out.push_str(&format!("- {}: {} characters\n", doc.name, doc.chars));
    }
    out.push_str(&format!(
        "\n## Total unique content sections: {}\n",
        summary.sections_accepted
    ));
    out.push_str(&format!(
        "## Duplicate sections removed: {}\n",
        summary.duplicates_removed()
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_groups() -> Vec<(Category, Vec<Section>)> {
        vec![
            (
                Category::CorePrinciples,
                vec![Section {
                    title: "## Core Principles".to_string(),
                    body: "## Core Principles\nAlways act with integrity.".to_string(),
                    source: "a.md".to_string(),
                }],
            ),
            (
                Category::Dialogues,
                vec![
                    Section {
                        title: "Teacher: one".to_string(),
                        body: "Teacher: one\nfirst reply".to_string(),
                        source: "b.txt".to_string(),
                    },
                    Section {
                        title: "Teacher: two".to_string(),
                        body: "Teacher: two\nsecond reply".to_string(),
                        source: "b.txt".to_string(),
                    },
                ],
            ),
        ]
    }

    fn sample_summary() -> MergeSummary {
        MergeSummary {
            source_label: "/corpus".to_string(),
            documents: vec![
                DocumentStat {
                    name: "a.md".to_string(),
                    chars: 120,
                },
                DocumentStat {
                    name: "b.txt".to_string(),
                    chars: 340,
                },
            ],
            sections_considered: 5,
            sections_accepted: 3,
        }
    }

    #[test]
    fn test_header_and_toc() {
        let rendered = render_merged_document(&sample_groups(), &sample_summary());

        assert!(rendered.starts_with("# CONSOLIDATED REFERENCE"));
        assert!(rendered.contains("## Generated from: /corpus"));
        assert!(rendered.contains("## Total files processed: 2"));
        assert!(rendered.contains("- **Core Principles** (1 sections)"));
        assert!(rendered.contains("- **Dialogues** (2 sections)"));
        // Empty categories never appear.
        assert!(!rendered.contains("**Miscellaneous**"));
    }

    #[test]
    fn test_sections_numbered_from_one_with_provenance() {
        let rendered = render_merged_document(&sample_groups(), &sample_summary());

        assert!(rendered.contains("# CORE PRINCIPLES\n"));
        assert!(rendered.contains("## Core Principles Section 1: ## Core Principles"));
        assert!(rendered.contains("## Dialogues Section 1: Teacher: one"));
        assert!(rendered.contains("## Dialogues Section 2: Teacher: two"));
        assert!(rendered.contains("*Source: a.md*"));
        assert!(rendered.contains("*Source: b.txt*"));
        assert!(rendered.contains("Always act with integrity."));
    }

    #[test]
    fn test_statistics_block() {
        let rendered = render_merged_document(&sample_groups(), &sample_summary());

        assert!(rendered.contains("# PROCESSING STATISTICS"));
        assert!(rendered.contains("- a.md: 120 characters"));
        assert!(rendered.contains("- b.txt: 340 characters"));
        assert!(rendered.contains("## Total unique content sections: 3"));
        assert!(rendered.contains("## Duplicate sections removed: 2"));
    }

    #[test]
    fn test_category_order_follows_declaration_order() {
        let rendered = render_merged_document(&sample_groups(), &sample_summary());
        let core = rendered.find("# CORE PRINCIPLES").unwrap();
        let dialogues = rendered.find("# DIALOGUES").unwrap();
        assert!(core < dialogues);
    }

    #[test]
    fn test_rendering_with_no_sections() {
        let summary = MergeSummary {
            source_label: "/empty".to_string(),
            documents: Vec::new(),
            sections_considered: 0,
            sections_accepted: 0,
        };
        let rendered = render_merged_document(&[], &summary);

        assert!(rendered.contains("## Total files processed: 0"));
        assert!(rendered.contains("## Total unique content sections: 0"));
        assert!(rendered.contains("## Duplicate sections removed: 0"));
    }
}
