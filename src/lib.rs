//! # ragstore
//!
//! A local, file-backed document ingestion and similarity-search engine.
//!
//! ragstore extracts text from heterogeneous documents, splits it into
//! overlapping boundary-aware chunks, embeds each chunk with a
//! deterministic lexical-hash embedding, persists chunk records in
//! JSON-file-backed tables, and answers ranked cosine-similarity queries
//! against them.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────┐   ┌──────────┐   ┌─────────────┐
//! │ Extractor │──▶│ Chunker │──▶│ Embedder │──▶│ Table files │
//! │ txt/pdf/… │   │ windows │   │ hash-tf  │   │ <name>.json │
//! └───────────┘   └─────────┘   └──────────┘   └──────┬──────┘
//!                                                     │
//!                                              ┌──────▼───────┐
//!                                              │ VectorSearch │
//!                                              │ cosine rank  │
//!                                              └──────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use ragstore::config::ChunkingConfig;
//! use ragstore::embedding::{Embedder, HashEmbedder};
//! use ragstore::processor::DocumentProcessor;
//! use ragstore::store::{chunk_record, Connection};
//!
//! # fn main() -> ragstore::Result<()> {
//! let processor = DocumentProcessor::new(ChunkingConfig::default());
//! let embedder = HashEmbedder::new();
//!
//! let doc = processor.process_document("notes.md".as_ref())?;
//! let records = doc
//!     .chunks
//!     .iter()
//!     .map(|c| chunk_record(c, &embedder.embed(&c.text)))
//!     .collect();
//!
//! let conn = Connection::connect("./data")?;
//! let table = conn.open_table("notes");
//! table.add(records)?;
//!
//! let hits = table.search(embedder.embed("what were my notes about?"))
//!     .limit(5)
//!     .to_array()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Documents, chunks, metadata |
//! | [`extract`] | Per-format text extraction |
//! | [`chunk`] | Normalization and sliding-window chunking |
//! | [`embedding`] | Embedder trait, hash embedder, cosine similarity |
//! | [`processor`] | File and folder orchestration |
//! | [`store`] | Connection, tables, records, filters |
//! | [`search`] | Similarity-query builder |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod models;
pub mod processor;
pub mod search;
pub mod store;

pub use error::{Error, Result};
pub use models::{DocumentChunk, DocumentMetadata, ProcessedDocument};
