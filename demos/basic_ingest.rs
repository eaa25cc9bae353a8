//! Ingest a folder of documents and run a similarity query against them.
//!
//! ```bash
//! cargo run --example basic_ingest -- ./docs "how do I deploy"
//! ```

use anyhow::{bail, Result};

use ragstore::config::ChunkingConfig;
use ragstore::embedding::{Embedder, HashEmbedder};
use ragstore::processor::DocumentProcessor;
use ragstore::store::{chunk_record, Connection};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (folder, query) = match (args.next(), args.next()) {
        (Some(folder), Some(query)) => (folder, query),
        _ => bail!("usage: basic_ingest <folder> <query>"),
    };

    let processor = DocumentProcessor::new(ChunkingConfig::default());
    let embedder = HashEmbedder::new();

    let documents = processor.process_folder(folder.as_ref())?;
    println!("processed {} documents", documents.len());

    let conn = Connection::connect("./ragstore-data")?;
    let table = conn.create_table("chunks", Vec::new())?;
    for doc in &documents {
        let vectors = processor.embed_chunks(&embedder, doc);
        let records = doc
            .chunks
            .iter()
            .zip(vectors.iter())
            .map(|(chunk, vector)| chunk_record(chunk, vector))
            .collect();
        table.add(records)?;
        println!(
            "  {} -> {} chunks ({} words)",
            doc.filename, doc.metadata.chunk_count, doc.metadata.word_count
        );
    }

    let hits = table.search(embedder.embed(&query)).limit(5).to_array()?;
    println!("top matches for {:?}:", query);
    for hit in hits {
        let text = hit.record["text"].as_str().unwrap_or("");
        let preview: String = text.chars().take(80).collect();
        println!("  {:.3}  {}", hit.score, preview);
    }

    Ok(())
}
