//! Core data models for the ingestion pipeline.
//!
//! These types represent the documents and chunks that flow from extraction
//! through chunking to storage. A [`ProcessedDocument`] itself is never
//! persisted; callers persist its chunks (paired with vectors) as table
//! records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested file: extracted text plus its chunks and metadata.
///
/// Created once per file by the document processor and immutable afterwards.
/// `content` holds the full normalized text; every chunk's span indexes into
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Unique per ingestion: `<filename>-<ingestion unix-millis>`.
    pub id: String,
    pub filename: String,
    /// Lowercase extension without the dot (`"pdf"`, `"txt"`, ...).
    pub file_type: String,
    /// Full extracted text, whitespace-normalized.
    pub content: String,
    /// Chunks in ascending `chunk_index` order.
    pub chunks: Vec<DocumentChunk>,
    pub metadata: DocumentMetadata,
}

/// One contiguous slice of a document's normalized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique within the process: `<filename>-<index>-<uuid>`.
    pub id: String,
    /// Trimmed slice content, never empty.
    pub text: String,
    /// 0-based position among the parent document's chunks.
    pub chunk_index: usize,
    /// Name of the originating document (lookup only).
    pub filename: String,
    /// Character offset of the untrimmed window into the parent's `content`.
    pub start_position: usize,
    /// Exclusive end character offset; always > `start_position`.
    pub end_position: usize,
}

/// Source-file facts captured at processing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Size of the source file in bytes.
    pub size_bytes: u64,
    /// Last-modified time of the source file.
    pub modified_at: DateTime<Utc>,
    /// Whitespace-split token count of the normalized content.
    pub word_count: usize,
    pub chunk_count: usize,
}
