use anyhow::Result;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::consolidate::Document;

/// Configuration for document reading behavior
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

/// Statistics for one document read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub chars_decoded: u64,
    /// True when undecodable byte sequences were dropped during decoding.
    pub had_invalid_utf8: bool,
    pub read_error: Option<String>,
}

/// Reads documents whole, tolerating undecodable bytes by dropping them so
/// that one mangled file never takes down a corpus run.
pub struct DocumentReader {
    config: ReaderConfig,
}

impl DocumentReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read one document. Returns `None` for the document (with the error
    /// recorded on the stats) when the file cannot be read and the
    /// configuration says to keep going.
    pub async fn read_document(&self, path: &Path) -> Result<(Option<Document>, ReadStats)> {
        debug!("Reading document: {}", path.display());

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let error_msg = format!("Failed to read {}: {}", path.display(), e);
                warn!("{}", error_msg);

                let stats = ReadStats {
                    file_path: path.display().to_string(),
                    bytes_read: 0,
                    chars_decoded: 0,
                    had_invalid_utf8: false,
                    read_error: Some(error_msg.clone()),
                };

                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                } else {
                    return Ok((None, stats));
                }
            }
        };

        let bytes_read = bytes.len() as u64;
        let (text, had_invalid_utf8) = decode_dropping_invalid(bytes);
        let chars_decoded = text.chars().count() as u64;

        if had_invalid_utf8 {
            warn!(
                "Dropped undecodable bytes while reading {}",
                path.display()
            );
        }

        let name = display_name(path);
        info!(
            "Read {}: {} bytes, {} chars",
            path.display(),
            bytes_read,
            chars_decoded
        );

        let stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read,
            chars_decoded,
            had_invalid_utf8,
            read_error: None,
        };

        Ok((Some(Document { name, text }), stats))
    }
}

/// File name used as the document's display identifier.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Decode bytes as UTF-8, silently dropping undecodable sequences.
fn decode_dropping_invalid(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(e) => {
            let lossy = String::from_utf8_lossy(e.as_bytes());
            (lossy.replace('\u{FFFD}', ""), true)
        }
    }
}

/// Convenience function for reading a single document with default
/// configuration; errors instead of recording when the file is unreadable.
pub async fn read_document_async<P: AsRef<Path>>(path: P) -> Result<Document> {
    let reader = DocumentReader::new(ReaderConfig { fail_fast: true });
    let (document, _stats) = reader.read_document(path.as_ref()).await?;
    document.ok_or_else(|| anyhow::anyhow!("No document produced for {}", path.as_ref().display()))
}
