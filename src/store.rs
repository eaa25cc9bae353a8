//! JSON-file-backed record storage.
//!
//! A [`Connection`] owns a storage directory; each [`Table`] persists its
//! records as one `<name>.json` file holding a single JSON array of record
//! objects. Records are open-ended maps; callers conventionally include
//! `id`, `vector`, and `text` fields, but the store imposes no schema and
//! does not enforce `id` uniqueness.
//!
//! Every mutation re-reads the whole backing file, applies the change, and
//! rewrites it through a temp-file-then-rename so a crash mid-write never
//! leaves a table truncated or mixing old and new content. Concurrent
//! writers are not serialized here; callers needing that must synchronize
//! externally.

use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::DocumentChunk;
use crate::search::VectorSearch;

/// A persisted row: an open-ended JSON object.
pub type Record = serde_json::Map<String, Value>;

/// Predicate over records, used by [`Table::delete`] and
/// [`VectorSearch::filter`](crate::search::VectorSearch::filter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches records whose string-valued `field` equals `value`.
    Equals { field: String, value: String },
    /// Matches every record.
    All,
}

impl Filter {
    /// Equality filter on the conventional `id` field.
    pub fn id_equals(value: impl Into<String>) -> Self {
        Filter::Equals {
            field: "id".to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Equals { field, value } => record
                .get(field)
                .and_then(Value::as_str)
                .map(|v| v == value)
                .unwrap_or(false),
            Filter::All => true,
        }
    }
}

/// Build the conventional record for a chunk and its vector.
pub fn chunk_record(chunk: &DocumentChunk, vector: &[f32]) -> Record {
    let mut record = Record::new();
    record.insert("id".to_string(), Value::from(chunk.id.as_str()));
    record.insert("text".to_string(), Value::from(chunk.text.as_str()));
    record.insert(
        "vector".to_string(),
        Value::from(vector.iter().map(|&v| f64::from(v)).collect::<Vec<f64>>()),
    );
    record.insert("filename".to_string(), Value::from(chunk.filename.as_str()));
    record.insert("chunk_index".to_string(), Value::from(chunk.chunk_index));
    record
}

/// A named, durable collection of records backed by one JSON file.
///
/// Handles are cheap: opening a table performs no I/O; the backing file
/// appears on the first write.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    path: PathBuf,
}

impl Table {
    fn new(root: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: root.join(format!("{}.json", name)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append records, rewriting the backing file.
    pub fn add(&self, records: Vec<Record>) -> Result<()> {
        let mut all = self.load()?;
        let added = records.len();
        all.extend(records);
        self.write_atomic(&all)?;
        log::debug!("table '{}': added {} records", self.name, added);
        Ok(())
    }

    /// Remove every record matching `filter`; returns how many were removed.
    pub fn delete(&self, filter: &Filter) -> Result<usize> {
        let all = self.load()?;
        let before = all.len();
        let kept: Vec<Record> = all.into_iter().filter(|r| !filter.matches(r)).collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.write_atomic(&kept)?;
            log::debug!("table '{}': deleted {} records", self.name, removed);
        }
        Ok(removed)
    }

    /// Number of persisted records; 0 when the backing file is absent.
    pub fn count_rows(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Start a similarity query against this table.
    pub fn search(&self, query: Vec<f32>) -> VectorSearch<'_> {
        VectorSearch::new(self, query)
    }

    /// Read all records. A missing file is an empty table; a present but
    /// unparseable file surfaces as [`Error::StorageCorruption`].
    pub(crate) fn load(&self) -> Result<Vec<Record>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let corrupt = |reason: String| Error::StorageCorruption {
            table: self.name.clone(),
            reason,
        };

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;
        let array = match value {
            Value::Array(items) => items,
            other => {
                return Err(corrupt(format!(
                    "expected a JSON array, found {}",
                    json_type_name(&other)
                )))
            }
        };

        array
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(corrupt(format!(
                    "expected record objects, found {}",
                    json_type_name(&other)
                ))),
            })
            .collect()
    }

    /// Serialize `records` to a temp file in the table's directory, then
    /// rename it over the backing file.
    fn write_atomic(&self, records: &[Record]) -> Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        let body = serde_json::to_vec_pretty(records).map_err(|e| Error::StorageCorruption {
            table: self.name.clone(),
            reason: e.to_string(),
        })?;
        tmp.write_all(&body)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub(crate) fn write_initial(&self, records: &[Record]) -> Result<()> {
        self.write_atomic(records)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Namespace of tables under one storage directory.
pub struct Connection {
    root: PathBuf,
}

impl Connection {
    /// Open (creating if needed) the storage directory.
    pub fn connect(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create (or replace) a table, writing `initial` immediately when
    /// non-empty. With no initial records the backing file appears lazily
    /// on the first `add`.
    pub fn create_table(&self, name: &str, initial: Vec<Record>) -> Result<Table> {
        let table = Table::new(&self.root, name);
        match std::fs::remove_file(&table.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if !initial.is_empty() {
            table.write_initial(&initial)?;
        }
        Ok(table)
    }

    /// Handle to a named table; no file I/O happens until first use.
    pub fn open_table(&self, name: &str) -> Table {
        Table::new(&self.root, name)
    }

    /// Delete a table's backing file. Absent tables are not an error.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let table = Table::new(&self.root, name);
        match std::fs::remove_file(&table.path) {
            Ok(()) => {
                log::debug!("dropped table '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Base names of all `*.json` backing files currently on disk, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
