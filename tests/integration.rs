//! End-to-end pipeline tests: extraction through storage and search.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use ragstore::config::ChunkingConfig;
use ragstore::embedding::{cosine_similarity, Embedder, HashEmbedder, EMBEDDING_DIMS};
use ragstore::processor::DocumentProcessor;
use ragstore::store::{chunk_record, Connection, Filter, Record};
use ragstore::Error;

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A 12,000-character single-space text built from 50-char sentences, so
/// normalization leaves it untouched and every 51st character is a period.
fn twelve_thousand_chars() -> String {
    let sentence = "lorem ipsum dolor sit amet consectetur adipiscing.";
    assert_eq!(sentence.len(), 50);
    let mut text = String::new();
    while text.len() < 12_000 {
        text.push_str(sentence);
        text.push(' ');
    }
    text.truncate(12_000);
    assert!(!text.ends_with(' '));
    text
}

/// Minimal DOCX: a ZIP holding only `word/document.xml`.
fn minimal_docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut body = String::from(
        r#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for p in paragraphs {
        body.push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p));
    }
    body.push_str("</w:body></w:document>");

    let cursor = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(cursor);
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(body.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn large_text_file_chunks_by_the_sliding_window_rule() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "large.txt", twelve_thousand_chars().as_bytes());

    let processor = DocumentProcessor::new(ChunkingConfig {
        chunk_size: 5000,
        overlap: 500,
    });
    let doc = processor.process_document(&path).unwrap();

    assert_eq!(doc.content.len(), 12_000);
    assert_eq!(doc.chunks.len(), 3);
    assert_eq!(doc.metadata.chunk_count, 3);

    let [first, second, third] = [&doc.chunks[0], &doc.chunks[1], &doc.chunks[2]];
    assert_eq!(first.start_position, 0);
    // Snapped ends stay within the backward search window of the tentative
    // end, and each next window starts `overlap` before the previous end.
    assert!(first.end_position > 4800 && first.end_position <= 5000);
    assert_eq!(second.start_position, first.end_position - 500);
    assert!(second.end_position <= second.start_position + 5000);
    assert_eq!(third.start_position, second.end_position - 500);
    assert_eq!(third.end_position, 12_000);

    for (i, chunk) in doc.chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.filename, "large.txt");
        assert!(!chunk.text.trim().is_empty());
    }
}

#[test]
fn folder_with_a_corrupt_pdf_still_yields_the_good_document() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "good.txt", b"a perfectly ordinary text file");
    write_file(&dir, "corrupt.pdf", b"this is not a pdf at all");

    let processor = DocumentProcessor::new(ChunkingConfig::default());
    let docs = processor.process_folder(dir.path()).unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].filename, "good.txt");
}

#[test]
fn corrupt_pdf_alone_surfaces_a_decode_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "corrupt.pdf", b"this is not a pdf at all");

    let processor = DocumentProcessor::new(ChunkingConfig::default());
    let err = processor.process_document(&path).unwrap_err();
    assert!(matches!(err, Error::DecodeFailure { .. }));
}

#[test]
fn identity_query_returns_the_matching_record_with_unit_score() {
    let dir = TempDir::new().unwrap();
    let conn = Connection::connect(dir.path().join("db")).unwrap();
    let table = conn.open_table("basis");

    // Five distinct one-hot 384-dimensional vectors.
    let records: Vec<Record> = (0..5)
        .map(|i| {
            let mut vector = vec![0.0f32; EMBEDDING_DIMS];
            vector[i * 7] = 1.0;
            let mut r = Record::new();
            r.insert("id".to_string(), format!("r{}", i).into());
            r.insert(
                "vector".to_string(),
                serde_json::Value::from(vector.iter().map(|&v| f64::from(v)).collect::<Vec<f64>>()),
            );
            r
        })
        .collect();
    table.add(records).unwrap();
    assert_eq!(table.count_rows().unwrap(), 5);

    let mut query = vec![0.0f32; EMBEDDING_DIMS];
    query[3 * 7] = 1.0;
    let hits = table.search(query).limit(1).to_array().unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record["id"], "r3");
    assert!((hits[0].score - 1.0).abs() < 1e-6);
}

#[test]
fn table_arithmetic_matches_the_contract() {
    let dir = TempDir::new().unwrap();
    let conn = Connection::connect(dir.path().join("db")).unwrap();
    let table = conn.open_table("rows");

    let mut r1 = Record::new();
    r1.insert("id".to_string(), "r1".into());
    let mut r2 = Record::new();
    r2.insert("id".to_string(), "r2".into());

    table.add(vec![r1, r2]).unwrap();
    assert_eq!(table.count_rows().unwrap(), 2);

    table.delete(&Filter::id_equals("r1")).unwrap();
    assert_eq!(table.count_rows().unwrap(), 1);

    conn.drop_table("rows").unwrap();
    assert!(!conn.table_names().unwrap().contains(&"rows".to_string()));
}

#[test]
fn docx_flows_through_the_whole_pipeline() {
    let dir = TempDir::new().unwrap();
    let docx = minimal_docx(&[
        "The deployment pipeline builds a container image.",
        "Search indexes are refreshed nightly by a scheduled job.",
        "Authentication tokens expire after twelve hours.",
    ]);
    let path = write_file(&dir, "handbook.docx", &docx);

    let processor = DocumentProcessor::new(ChunkingConfig {
        chunk_size: 120,
        overlap: 20,
    });
    let embedder = HashEmbedder::new();

    let doc = processor.process_document(&path).unwrap();
    assert_eq!(doc.file_type, "docx");
    assert!(doc.content.contains("deployment pipeline"));
    assert!(doc.chunks.len() > 1);

    let conn = Connection::connect(dir.path().join("db")).unwrap();
    let table = conn.create_table("handbook", Vec::new()).unwrap();
    let vectors = processor.embed_chunks(&embedder, &doc);
    let records = doc
        .chunks
        .iter()
        .zip(vectors.iter())
        .map(|(chunk, vector)| chunk_record(chunk, vector))
        .collect();
    table.add(records).unwrap();
    assert_eq!(table.count_rows().unwrap(), doc.chunks.len());

    let hits = table
        .search(embedder.embed("when do authentication tokens expire"))
        .limit(3)
        .to_array()
        .unwrap();
    assert!(!hits.is_empty());
    let top = hits[0].record["text"].as_str().unwrap();
    assert!(
        top.contains("tokens") || top.contains("Authentication"),
        "unexpected top hit: {}",
        top
    );
}

#[test]
fn reingesting_replaces_a_documents_records_via_delete_and_add() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", b"original body of the note file");

    let processor = DocumentProcessor::new(ChunkingConfig::default());
    let embedder = HashEmbedder::new();
    let conn = Connection::connect(dir.path().join("db")).unwrap();
    let table = conn.open_table("notes");

    for _ in 0..2 {
        let doc = processor.process_document(&path).unwrap();
        table
            .delete(&Filter::Equals {
                field: "filename".to_string(),
                value: doc.filename.clone(),
            })
            .unwrap();
        let vectors = processor.embed_chunks(&embedder, &doc);
        let records = doc
            .chunks
            .iter()
            .zip(vectors.iter())
            .map(|(chunk, vector)| chunk_record(chunk, vector))
            .collect();
        table.add(records).unwrap();
    }

    // Two ingestions of the same one-chunk file leave exactly one record.
    assert_eq!(table.count_rows().unwrap(), 1);
}

#[test]
fn stored_vectors_round_trip_through_json_with_usable_precision() {
    let dir = TempDir::new().unwrap();
    let conn = Connection::connect(dir.path().join("db")).unwrap();
    let table = conn.open_table("precision");

    let embedder = HashEmbedder::new();
    let vector = embedder.embed("precision survives serialization");
    let mut r = Record::new();
    r.insert("id".to_string(), "p1".into());
    r.insert(
        "vector".to_string(),
        serde_json::Value::from(vector.iter().map(|&v| f64::from(v)).collect::<Vec<f64>>()),
    );
    table.add(vec![r]).unwrap();

    let hits = table.search(vector.clone()).to_array().unwrap();
    assert!((hits[0].score - 1.0).abs() < 1e-5);
    assert!((cosine_similarity(&vector, &vector) - 1.0).abs() < 1e-6);
}
