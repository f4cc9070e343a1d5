use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Configuration for document discovery behavior
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// File name of the merged output artifact; never re-ingested.
    pub output_file_name: Option<String>,
}

/// Result of document discovery validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// Extensions recognized as input documents.
const DOCUMENT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Discovers all `*.txt` and `*.md` documents recursively under the given
/// root directory, skipping merge artifacts left behind by earlier runs.
/// Returns an async stream of validated file paths.
pub fn discover_documents(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();

    futures::stream::unfold(
        DiscoveryState::new(root_path, config),
        |mut state| async move { state.next_file().await.map(|result| (result, state)) },
    )
}

/// Internal state for document discovery iteration
struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<std::iter::Chain<glob::Paths, glob::Paths>>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        // Initialize glob iterators on first call
        if self.glob_iter.is_none() {
            let txt_pattern =
                format!("{}/**/*.{}", self.root_dir.display(), DOCUMENT_EXTENSIONS[0]);
            let md_pattern =
                format!("{}/**/*.{}", self.root_dir.display(), DOCUMENT_EXTENSIONS[1]);
            debug!("Starting document discovery with patterns: {txt_pattern}, {md_pattern}");

            let txt_paths = match glob(&txt_pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            };
            let md_paths = match glob(&md_pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            };

            self.glob_iter = Some(txt_paths.chain(md_paths));
            info!(
                "Document discovery initialized for root: {}",
                self.root_dir.display()
            );
        }

        if let Some(ref mut glob_iter) = self.glob_iter {
            match glob_iter.next() {
                Some(glob_result) => match glob_result {
                    Ok(path) => {
                        if self.is_merge_artifact(&path) {
                            debug!("Skipping merge artifact: {}", path.display());
                            return Box::pin(self.next_file()).await;
                        }
                        debug!("Found document: {}", path.display());
                        Some(self.validate_file(path).await)
                    }
                    Err(e) => {
                        let error_msg = format!("Glob iteration error: {e}");
                        warn!("{}", error_msg);

                        if self.config.fail_fast {
                            Some(Err(anyhow::anyhow!(error_msg)))
                        } else {
                            // Continue to next file on non-fatal glob errors
                            Box::pin(self.next_file()).await
                        }
                    }
                },
                None => {
                    info!("Document discovery completed");
                    None
                }
            }
        } else {
            None
        }
    }

    /// Prior merge outputs must never feed back into a later run.
    fn is_merge_artifact(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if file_name.starts_with("MERGED_") {
            return true;
        }
        self.config
            .output_file_name
            .as_deref()
            .is_some_and(|output| file_name == output)
    }

    async fn validate_file(&self, path: PathBuf) -> Result<FileValidation> {
        debug!("Validating document: {}", path.display());

        match fs::metadata(&path).await {
            Ok(metadata) => {
                if !metadata.is_file() {
                    let error = format!("Path is not a file: {}", path.display());
                    warn!("{}", error);
                    return Ok(FileValidation {
                        path,
                        error: Some(error),
                    });
                }
            }
            Err(e) => {
                let error = format!("Cannot access file {}: {}", path.display(), e);
                warn!("{}", error);

                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error));
                } else {
                    return Ok(FileValidation {
                        path,
                        error: Some(error),
                    });
                }
            }
        }

        Ok(FileValidation { path, error: None })
    }
}

/// Collect all discovered documents into a Vec, sorted by path so every run
/// processes the corpus in the same order.
pub async fn collect_documents(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_documents(root_dir, config));

    while let Some(result) = stream.next().await {
        match result {
            Ok(validation) => {
                files.push(validation);
            }
            Err(e) => {
                return Err(e);
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!("Discovered {} documents total", files.len());
    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;

    if invalid_count > 0 {
        warn!("Found {} documents with validation issues", invalid_count);
    }

    info!(
        "Document discovery summary: {} valid, {} invalid",
        valid_count, invalid_count
    );

    Ok(files)
}

/// Convenience function returning only valid document paths, sorted.
pub async fn find_documents<P: AsRef<Path>>(root_dir: P) -> Result<Vec<PathBuf>> {
    let config = DiscoveryConfig::default();
    let validations = collect_documents(root_dir, config).await?;

    let valid_files: Vec<PathBuf> = validations
        .into_iter()
        .filter(|v| v.error.is_none())
        .map(|v| v.path)
        .collect();

    Ok(valid_files)
}
