// Line-oriented section boundary detection. Every input line lands in
// exactly one section: no gaps, no overlaps.

use anyhow::Result;
use regex_automata::meta::Regex;

use super::Section;

/// Boundary patterns in priority order. A line matching any of them (matched
/// anywhere in the line, case-insensitively) closes the open section and
/// becomes both the title and the first body line of the next one.
const BOUNDARY_PATTERNS: [&str; 5] = [
    // delimiter-bracketed structural headers, e.g. "# ==== TITLE ===="
    r"(?i)# ={20,}.*?={20,}",
    // markdown headings up to level three
    r"(?i)#{1,3}\s+[A-Z][^#\n]*",
    // bold inline labels followed by a colon, e.g. "**Definition**:"
    r"(?i)\*\*[^*]+\*\*:",
    // literal dialogue label marker
    r"(?i)Label:",
    // recognized speaker-turn prefixes
    r"(?i)Teacher:|Student:|AI:|Human:|Assistant:",
];

/// Partitions document text into titled sections at boundary lines.
#[derive(Debug)]
pub struct SectionSplitter {
    boundaries: Regex,
}

impl SectionSplitter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            boundaries: Regex::new_many(&BOUNDARY_PATTERNS)?,
        })
    }

    /// Synthetic title used until the first boundary line is seen.
    pub fn default_title(source_name: &str) -> String {
        format!("Content from {source_name}")
    }

    /// Split `text` into ordered sections. A document with no boundary
    /// matches yields exactly one section under the default title. Sections
    /// are emitted even when their trimmed body is empty so that ordering
    /// stays a straight partition of the input lines.
    pub fn split(&self, text: &str, source_name: &str) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut title = Self::default_title(source_name);
        let mut open_lines: Vec<&str> = Vec::new();

        for line in text.lines() {
            if self.boundaries.is_match(line) {
                let previous_title = std::mem::replace(&mut title, line.trim().to_string());
                sections.push(Section {
                    title: previous_title,
                    body: join_trimmed(&open_lines),
                    source: source_name.to_string(),
                });
                open_lines.clear();
            }
            open_lines.push(line);
        }

        sections.push(Section {
            title,
            body: join_trimmed(&open_lines),
            source: source_name.to_string(),
        });

        sections
    }
}

fn join_trimmed(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter() -> SectionSplitter {
        SectionSplitter::new().unwrap()
    }

    #[test]
    fn test_no_boundaries_yields_single_default_section() {
        let text = "just some prose\nspread over lines\nwith no headings";
        let sections = splitter().split(text, "notes.txt");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Content from notes.txt");
        assert_eq!(sections[0].body, text);
        assert_eq!(sections[0].source, "notes.txt");
    }

    #[test]
    fn test_markdown_heading_opens_new_section() {
        let text = "intro line\n## Core Principles\nbody line one\nbody line two";
        let sections = splitter().split(text, "doc.md");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Content from doc.md");
        assert_eq!(sections[0].body, "intro line");
        assert_eq!(sections[1].title, "## Core Principles");
        assert_eq!(
            sections[1].body,
            "## Core Principles\nbody line one\nbody line two"
        );
    }

    #[test]
    fn test_boundary_on_first_line_emits_leading_empty_section() {
        let text = "## Heading\ncontent";
        let sections = splitter().split(text, "doc.md");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Content from doc.md");
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[1].title, "## Heading");
    }

    #[test]
    fn test_split_is_total_partition() {
        // No blank lines at section edges, so per-section trimming is a
        // no-op and line concatenation must reproduce the input exactly.
        let text = "alpha\n## First\nbeta\ngamma\nTeacher: a question\ndelta";
        let sections = splitter().split(text, "doc.md");

        let rejoined: Vec<&str> = sections
            .iter()
            .filter(|s| !s.body.is_empty())
            .flat_map(|s| s.body.lines())
            .collect();
        let original: Vec<&str> = text.lines().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_speaker_prefix_is_boundary() {
        let text = "preamble\nTeacher: what is recursion?\nStudent: a function calling itself";
        let sections = splitter().split(text, "dialogue.txt");

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].title, "Teacher: what is recursion?");
        assert_eq!(sections[2].title, "Student: a function calling itself");
    }

    #[test]
    fn test_bold_label_and_literal_label_are_boundaries() {
        let text = "x\n**Definition**: a term\ny\nLabel: something\nz";
        let sections = splitter().split(text, "doc.md");

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Content from doc.md",
                "**Definition**: a term",
                "Label: something"
            ]
        );
    }

    #[test]
    fn test_structural_delimiter_header() {
        let text = format!("# {} CHAPTER ONE {}\nbody", "=".repeat(20), "=".repeat(20));
        let sections = splitter().split(&text, "doc.txt");

        assert_eq!(sections.len(), 2);
        assert!(sections[1].title.contains("CHAPTER ONE"));
    }

    #[test]
    fn test_boundary_line_included_in_new_body() {
        let text = "## Title Line\nfollows";
        let sections = splitter().split(text, "doc.md");
        let body = &sections[1].body;
        assert!(body.starts_with("## Title Line"));
        assert!(body.ends_with("follows"));
    }

    #[test]
    fn test_empty_document_yields_one_empty_section() {
        let sections = splitter().split("", "empty.txt");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[0].title, "Content from empty.txt");
    }

    #[test]
    fn test_body_trimmed_at_edges() {
        let text = "intro\n\n\n## Next\nbody";
        let sections = splitter().split(text, "doc.md");
        assert_eq!(sections[0].body, "intro");
    }
}
