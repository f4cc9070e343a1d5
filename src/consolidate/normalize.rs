// Canonical comparison form for section bodies. The output is only ever fed
// to the duplicate detector; it is never rendered.

use anyhow::Result;
use regex_automata::meta::Regex;

/// Provenance markers that must not influence duplicate comparison.
/// Matched case-sensitively against the whitespace-collapsed text.
const METADATA_PATTERNS: [&str; 2] = [
    r"# Lines [0-9]+-[0-9]+ from source",
    r"## Dialogue Segment [0-9]+",
];

/// Default cap on normalized length, in characters.
pub const DEFAULT_TRUNCATE_CHARS: usize = 10_000;

/// Maps a section body to its normalized form: whitespace-collapsed,
/// metadata-stripped, length-capped, case-folded. Idempotent.
#[derive(Debug)]
pub struct Normalizer {
    metadata: Regex,
    truncate_chars: usize,
}

impl Normalizer {
    pub fn new(truncate_chars: usize) -> Result<Self> {
        Ok(Self {
            metadata: Regex::new_many(&METADATA_PATTERNS)?,
            truncate_chars,
        })
    }

    pub fn with_default_cap() -> Result<Self> {
        Self::new(DEFAULT_TRUNCATE_CHARS)
    }

    /// Normalize with a fresh allocation.
    pub fn normalize(&self, text: &str) -> String {
        let mut buffer = String::new();
        self.normalize_into(text, &mut buffer);
        buffer
    }

    /// Normalize into a supplied buffer for reuse across many sections.
    pub fn normalize_into(&self, text: &str, buffer: &mut String) {
        collapse_whitespace_into(text, buffer);

        // Stripping a marker can leave two adjacent spaces where it stood;
        // collapse again so normalize(normalize(x)) == normalize(x) holds.
        if self.metadata.is_match(buffer.as_str()) {
            let stripped = self.strip_metadata(buffer);
            collapse_whitespace_into(&stripped, buffer);
        }

        truncate_to_chars(buffer, self.truncate_chars);

        if buffer.chars().any(char::is_uppercase) {
            let lowered = buffer.to_lowercase();
            buffer.clear();
            buffer.push_str(&lowered);
        }
    }

    fn strip_metadata(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.metadata.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

/// Collapse every whitespace run (including newlines) to a single space and
/// drop leading/trailing whitespace entirely.
fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            // A space is only owed once the next non-space char arrives,
            // which also trims the tail for free.
            pending_space = !buffer.is_empty();
        } else {
            if pending_space {
                buffer.push(' ');
                pending_space = false;
            }
            buffer.push(ch);
        }
    }
}

/// Truncate on a char boundary so multi-byte content cannot split.
fn truncate_to_chars(buffer: &mut String, max_chars: usize) {
    if let Some((idx, _)) = buffer.char_indices().nth(max_chars) {
        buffer.truncate(idx);
    }
}
