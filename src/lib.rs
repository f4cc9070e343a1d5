pub mod consolidate;
pub mod discovery;
pub mod reader;
pub mod report;

// Re-export main types for convenient access
pub use consolidate::{
    render_merged_document, Category, ConsolidateConfig, Consolidator, Document, DocumentStat,
    IngestStats, MergeSummary, SamplePolicy, Section,
};

// Re-export ingestion utilities
pub use discovery::{collect_documents, find_documents, DiscoveryConfig};
pub use reader::{read_document_async, DocumentReader, ReaderConfig};
pub use report::{FileReport, RunReport};
