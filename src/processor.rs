//! Document and folder processing orchestration.
//!
//! [`DocumentProcessor`] ties extraction and chunking together: a file goes
//! in, a [`ProcessedDocument`] comes out. Folder processing isolates
//! per-file failures; a bad file is logged and skipped, never aborting the
//! rest of the folder.

use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

use crate::chunk::chunk_text;
use crate::config::ChunkingConfig;
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::extract;
use crate::models::{DocumentMetadata, ProcessedDocument};

pub struct DocumentProcessor {
    chunking: ChunkingConfig,
}

impl DocumentProcessor {
    pub fn new(chunking: ChunkingConfig) -> Self {
        Self { chunking }
    }

    /// Extract, normalize, and chunk a single file.
    ///
    /// Fails with [`Error::NotFound`] when the path does not exist and
    /// [`Error::UnsupportedType`] for extensions outside the supported
    /// set; extraction failures propagate unchanged.
    pub fn process_document(&self, path: &Path) -> Result<ProcessedDocument> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let file_type = extract::file_type(path)
            .ok_or_else(|| Error::UnsupportedType("(no extension)".to_string()))?;
        if !extract::SUPPORTED_EXTENSIONS.contains(&file_type.as_str()) {
            return Err(Error::UnsupportedType(file_type));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let raw = extract::extract_text(path, &file_type)?;
        let content = crate::chunk::normalize(&raw);
        let chunks = chunk_text(
            &content,
            &filename,
            self.chunking.chunk_size,
            self.chunking.overlap,
        );

        let fs_meta = std::fs::metadata(path)?;
        let modified_at: DateTime<Utc> = fs_meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());

        let metadata = DocumentMetadata {
            size_bytes: fs_meta.len(),
            modified_at,
            word_count: content.split_whitespace().count(),
            chunk_count: chunks.len(),
        };

        Ok(ProcessedDocument {
            id: format!("{}-{}", filename, Utc::now().timestamp_millis()),
            filename,
            file_type,
            content,
            chunks,
            metadata,
        })
    }

    /// Process every supported file directly inside `folder`.
    ///
    /// Subdirectories and unsupported files are skipped. A failing file is
    /// logged and skipped; only a missing folder is fatal. Results are
    /// ordered by file name.
    pub fn process_folder(&self, folder: &Path) -> Result<Vec<ProcessedDocument>> {
        if !folder.is_dir() {
            return Err(Error::NotFound(folder.to_path_buf()));
        }

        let mut documents = Vec::new();
        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("skipping unreadable entry in {}: {}", folder.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !extract::is_supported(entry.path()) {
                continue;
            }
            match self.process_document(entry.path()) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    log::warn!("skipping {}: {}", entry.path().display(), e);
                }
            }
        }

        Ok(documents)
    }

    /// Embed every chunk of `doc`, in chunk order.
    pub fn embed_chunks(&self, embedder: &dyn Embedder, doc: &ProcessedDocument) -> Vec<Vec<f32>> {
        doc.chunks
            .iter()
            .map(|chunk| embedder.embed(&chunk.text))
            .collect()
    }
}
