//! Per-format text extraction.
//!
//! Converts a raw file (dispatched on its declared extension) into plain
//! text. Plain formats are read verbatim; PDF goes through `pdf-extract`;
//! DOCX is unzipped and its `word/document.xml` text runs are streamed out
//! with `quick-xml`; legacy DOC falls back to salvaging UTF-16LE character
//! runs from the compound-file stream. Binary formats that decode to
//! nothing are an error, not an empty document.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Extensions accepted for extraction, lowercase, without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "doc", "docx"];

/// Magic prefix of an OLE compound file (legacy `.doc`).
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Decompressed-size ceiling for a single ZIP entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Lowercase extension of `path` without the dot, if any.
pub fn file_type(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Whether `path` has one of the supported document extensions.
pub fn is_supported(path: &Path) -> bool {
    file_type(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Extract plain text from the file at `path`, dispatching on `file_type`
/// (a lowercase extension as produced by [`file_type`]).
pub fn extract_text(path: &Path, file_type: &str) -> Result<String> {
    match file_type {
        "txt" | "md" => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        "pdf" => {
            let bytes = std::fs::read(path)?;
            extract_pdf(&bytes, &display_name(path))
        }
        "docx" => {
            let bytes = std::fs::read(path)?;
            extract_docx(&bytes, &display_name(path))
        }
        "doc" => {
            let bytes = std::fs::read(path)?;
            extract_doc(&bytes, &display_name(path))
        }
        other => Err(Error::UnsupportedType(other.to_string())),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn require_content(text: String, file: &str) -> Result<String> {
    if text.trim().is_empty() {
        Err(Error::EmptyContent(file.to_string()))
    } else {
        Ok(text)
    }
}

fn extract_pdf(bytes: &[u8], file: &str) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::DecodeFailure {
        file: file.to_string(),
        reason: e.to_string(),
    })?;
    require_content(text, file)
}

/// Pull the `<w:t>` text runs out of `word/document.xml`.
fn extract_docx(bytes: &[u8], file: &str) -> Result<String> {
    let decode_err = |reason: String| Error::DecodeFailure {
        file: file.to_string(),
        reason,
    };

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| decode_err(e.to_string()))?;
    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| decode_err("word/document.xml not found".to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| decode_err(e.to_string()))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(decode_err("word/document.xml exceeds size limit".to_string()));
        }
    }

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(doc_xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_text_run = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                in_text_run = e.local_name().as_ref() == b"t";
            }
            Ok(quick_xml::events::Event::Text(t)) if in_text_run => {
                let run = t.unescape().unwrap_or_default();
                if !run.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(run.as_ref());
                }
            }
            Ok(quick_xml::events::Event::End(_)) => {
                in_text_run = false;
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(decode_err(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    require_content(out, file)
}

/// Salvage readable text from a legacy Word binary.
///
/// Word 97-2003 stores body text as UTF-16LE inside the compound-file
/// stream. Without a full OLE parser, runs of printable UTF-16LE code
/// units recover the body text from typical files.
fn extract_doc(bytes: &[u8], file: &str) -> Result<String> {
    if bytes.len() < OLE_MAGIC.len() || bytes[..OLE_MAGIC.len()] != OLE_MAGIC {
        return Err(Error::DecodeFailure {
            file: file.to_string(),
            reason: "not an OLE compound file".to_string(),
        });
    }

    // The compound-file header occupies the first 512-byte sector.
    let body = &bytes[bytes.len().min(512)..];

    let mut out = String::new();
    let mut run = String::new();
    for pair in body.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        let ch = char::from_u32(unit as u32).filter(|c| is_doc_text_char(*c));
        match ch {
            Some(c) => run.push(c),
            None => {
                flush_doc_run(&mut out, &mut run);
            }
        }
    }
    flush_doc_run(&mut out, &mut run);
    require_content(out, file)
}

fn is_doc_text_char(c: char) -> bool {
    !c.is_control() || c == '\n' || c == '\t'
}

/// Runs shorter than a few characters are stream structure, not text.
fn flush_doc_run(out: &mut String, run: &mut String) {
    if run.trim().chars().count() >= 4 {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(run.trim());
    }
    run.clear();
}
