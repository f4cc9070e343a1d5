use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

use coalesce::consolidate::{ConsolidateConfig, Consolidator, DocumentStat, MergeSummary, SamplePolicy};
use coalesce::discovery;
use coalesce::reader;
use coalesce::report::{FileReport, RunReport};

/// Documents with less trimmed content than this are recorded but not split.
const MIN_DOCUMENT_CHARS: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "coalesce")]
#[command(about = "Consolidates text corpora into one deduplicated, categorized reference document")]
#[command(version)]
struct Args {
    /// Root directory to scan for *.txt and *.md documents
    root_dir: PathBuf,

    /// Merged document output path
    #[arg(long, default_value = "MERGED_REFERENCE.md")]
    output: PathBuf,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Jaccard similarity above which a section counts as a near-duplicate
    #[arg(long, default_value_t = 0.8)]
    similarity_threshold: f64,

    /// Minimum normalized length for a section to be kept
    #[arg(long, default_value_t = 50)]
    min_section_chars: usize,

    /// Number of registered sections consulted by the similarity check
    #[arg(long, default_value_t = 100)]
    sample_cap: usize,

    /// Compare against the most recently accepted sections instead of the earliest
    #[arg(long)]
    recent_window: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting coalesce");
    info!(?args, "Parsed CLI arguments");

    if !args.root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", args.root_dir.display());
    }

    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let run_start = std::time::Instant::now();

    // Discover and validate documents
    let discovery_config = discovery::DiscoveryConfig {
        fail_fast: args.fail_fast,
        output_file_name: args
            .output
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string),
    };

    info!("Starting document discovery in: {}", args.root_dir.display());
    let discovered = discovery::collect_documents(&args.root_dir, discovery_config).await?;

    let valid_files: Vec<_> = discovered.iter().filter(|f| f.error.is_none()).collect();
    let invalid_files: Vec<_> = discovered.iter().filter(|f| f.error.is_some()).collect();

    info!(
        "Document discovery completed: {} total, {} valid",
        discovered.len(),
        valid_files.len()
    );
    for file in &invalid_files {
        if let Some(ref error) = file.error {
            info!("Issue with {}: {}", file.path.display(), error);
        }
    }

    println!(
        "coalesce v{} - Found {} documents ({} valid, {} with issues)",
        env!("CARGO_PKG_VERSION"),
        discovered.len(),
        valid_files.len(),
        invalid_files.len()
    );

    let consolidate_config = ConsolidateConfig {
        similarity_threshold: args.similarity_threshold,
        min_meaningful_chars: args.min_section_chars,
        sample_cap: args.sample_cap,
        sample_policy: if args.recent_window {
            SamplePolicy::Recent
        } else {
            SamplePolicy::Front
        },
        ..ConsolidateConfig::default()
    };

    let mut consolidator = Consolidator::new(&consolidate_config)?;
    let document_reader = reader::DocumentReader::new(reader::ReaderConfig {
        fail_fast: args.fail_fast,
    });

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(valid_files.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} {msg}",
        )?);
        bar
    };

    let mut file_reports: Vec<FileReport> = invalid_files
        .iter()
        .map(|f| {
            FileReport::failed(
                &f.path.display().to_string(),
                f.error.clone().unwrap_or_else(|| "validation failed".to_string()),
            )
        })
        .collect();
    let mut document_stats: Vec<DocumentStat> = Vec::new();

    // Documents are ingested strictly in sorted order so the duplicate
    // registry fills the same way on every run over the same corpus.
    for file in &valid_files {
        progress.set_message(reader::display_name(&file.path));

        let (document, read_stats) = document_reader.read_document(&file.path).await?;
        let Some(document) = document else {
            file_reports.push(FileReport::failed(
                &read_stats.file_path,
                read_stats
                    .read_error
                    .unwrap_or_else(|| "unreadable".to_string()),
            ));
            progress.inc(1);
            continue;
        };

        let chars = read_stats.chars_decoded;
        document_stats.push(DocumentStat {
            name: document.name.clone(),
            chars: chars as usize,
        });

        if document.text.trim().chars().count() < MIN_DOCUMENT_CHARS {
            info!("Skipped (too short): {}", document.name);
            file_reports.push(FileReport::skipped(&read_stats.file_path, chars));
            progress.inc(1);
            continue;
        }

        let ingest_stats = consolidator.ingest_document(&document);
        info!(
            "Processed {}: {} sections, {} unique",
            document.name, ingest_stats.sections_found, ingest_stats.sections_accepted
        );
        file_reports.push(FileReport::processed(&read_stats.file_path, chars, &ingest_stats));
        progress.inc(1);
    }

    progress.finish_and_clear();

    let sections_considered = consolidator.sections_considered();
    let sections_accepted = consolidator.sections_accepted();
    let groups = consolidator.finish();

    let summary = MergeSummary {
        source_label: args.root_dir.display().to_string(),
        documents: document_stats,
        sections_considered,
        sections_accepted,
    };

    info!(
        "Consolidation complete: {} sections considered, {} accepted",
        sections_considered, sections_accepted
    );

    let rendered = coalesce::render_merged_document(&groups, &summary);
    tokio::fs::write(&args.output, &rendered).await?;
    info!("Wrote merged document: {}", args.output.display());

    let run_report = RunReport {
        total_files: file_reports.len() as u64,
        files: file_reports,
        sections_considered: sections_considered as u64,
        sections_accepted: sections_accepted as u64,
        duplicates_removed: summary.duplicates_removed() as u64,
        output_path: args.output.display().to_string(),
        elapsed_ms: run_start.elapsed().as_millis() as u64,
    };
    run_report.save(&args.stats_out).await?;

    println!("Consolidation complete:");
    println!("  Documents processed: {}", summary.documents.len());
    println!("  Sections considered: {sections_considered}");
    println!("  Unique sections kept: {sections_accepted}");
    println!("  Duplicates removed: {}", summary.duplicates_removed());
    println!("  Merged document: {}", args.output.display());
    println!("  Run stats: {}", args.stats_out.display());

    Ok(())
}
