//! Brute-force similarity ranking over a table.
//!
//! [`VectorSearch`] is a builder returned by
//! [`Table::search`](crate::store::Table::search): configure an optional
//! [`Filter`] and a result limit, then call
//! [`to_array`](VectorSearch::to_array) to load all records, score each one
//! by cosine similarity against its stored `vector` field, and return the
//! top matches. Records with a missing, malformed, or wrong-dimensionality
//! vector score `0.0` rather than failing the query. Ranking is a full
//! scan, which is acceptable for the small corpora one table file holds.

use serde::Serialize;

use crate::embedding::cosine_similarity;
use crate::error::Result;
use crate::store::{Filter, Record, Table};

/// Results returned when [`VectorSearch::limit`] is never called.
pub const DEFAULT_LIMIT: usize = 10;

/// A ranked record with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub score: f32,
    pub record: Record,
}

/// Builder for a similarity query against one [`Table`].
#[must_use = "call .to_array() to run the search"]
pub struct VectorSearch<'a> {
    table: &'a Table,
    query: Vec<f32>,
    limit: usize,
    filter: Option<Filter>,
}

impl<'a> VectorSearch<'a> {
    pub(crate) fn new(table: &'a Table, query: Vec<f32>) -> Self {
        Self {
            table,
            query,
            limit: DEFAULT_LIMIT,
            filter: None,
        }
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict candidates before they are scored and truncated.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Load, score, rank, and truncate.
    ///
    /// Results are sorted by descending score; ties break on ascending
    /// `id` so repeated queries return a stable order.
    pub fn to_array(self) -> Result<Vec<SearchHit>> {
        let records = self.table.load()?;

        let mut hits: Vec<SearchHit> = records
            .into_iter()
            .filter(|r| match &self.filter {
                Some(f) => f.matches(r),
                None => true,
            })
            .map(|record| {
                let score = record_vector(&record)
                    .map(|v| cosine_similarity(&self.query, &v))
                    .unwrap_or(0.0);
                SearchHit { score, record }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| record_id(&a.record).cmp(record_id(&b.record)))
        });
        hits.truncate(self.limit);

        Ok(hits)
    }
}

/// Decode a record's `vector` field; `None` when absent or malformed.
fn record_vector(record: &Record) -> Option<Vec<f32>> {
    record
        .get("vector")?
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

fn record_id(record: &Record) -> &str {
    record.get("id").and_then(|v| v.as_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Connection;
    use serde_json::Value;

    fn record(id: &str, vector: &[f32]) -> Record {
        let mut r = Record::new();
        r.insert("id".to_string(), Value::from(id));
        r.insert(
            "vector".to_string(),
            Value::from(vector.iter().map(|&v| f64::from(v)).collect::<Vec<f64>>()),
        );
        r
    }

    fn seeded_table(conn: &Connection) -> Table {
        let table = conn.open_table("vectors");
        table
            .add(vec![
                record("r1", &[1.0, 0.0, 0.0]),
                record("r2", &[0.0, 1.0, 0.0]),
                record("r3", &[0.0, 0.0, 1.0]),
                record("r4", &[0.7, 0.7, 0.0]),
            ])
            .unwrap();
        table
    }

    #[test]
    fn results_are_sorted_descending_and_limited() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let table = seeded_table(&conn);

        let hits = table.search(vec![1.0, 0.0, 0.0]).limit(2).to_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].record["id"], "r1");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn default_limit_is_ten() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let table = conn.open_table("many");
        let records: Vec<Record> = (0..25)
            .map(|i| record(&format!("r{:02}", i), &[i as f32, 1.0]))
            .collect();
        table.add(records).unwrap();

        let hits = table.search(vec![1.0, 0.0]).to_array().unwrap();
        assert_eq!(hits.len(), DEFAULT_LIMIT);
    }

    #[test]
    fn filter_applies_before_ranking_and_truncation() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let table = seeded_table(&conn);

        // r1 would win unfiltered; restricting to r2 must yield r2 even
        // with limit 1.
        let hits = table
            .search(vec![1.0, 0.0, 0.0])
            .filter(Filter::id_equals("r2"))
            .limit(1)
            .to_array()
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record["id"], "r2");
    }

    #[test]
    fn dimension_mismatch_scores_zero_instead_of_failing() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let table = conn.open_table("mixed");
        table
            .add(vec![record("good", &[1.0, 0.0]), record("short", &[1.0])])
            .unwrap();

        let hits = table.search(vec![1.0, 0.0]).to_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record["id"], "good");
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn missing_or_malformed_vectors_score_zero() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let table = conn.open_table("odd");
        let mut no_vector = Record::new();
        no_vector.insert("id".to_string(), Value::from("no-vector"));
        let mut bad_vector = Record::new();
        bad_vector.insert("id".to_string(), Value::from("bad-vector"));
        bad_vector.insert("vector".to_string(), Value::from("not an array"));
        table.add(vec![no_vector, bad_vector]).unwrap();

        let hits = table.search(vec![1.0]).to_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.score == 0.0));
    }

    #[test]
    fn empty_table_returns_no_hits() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let hits = conn.open_table("nothing").search(vec![1.0]).to_array().unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn tied_scores_break_on_ascending_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = Connection::connect(dir.path()).unwrap();
        let table = conn.open_table("ties");
        table
            .add(vec![
                record("b", &[1.0, 0.0]),
                record("a", &[1.0, 0.0]),
                record("c", &[2.0, 0.0]),
            ])
            .unwrap();

        let hits = table.search(vec![1.0, 0.0]).to_array().unwrap();
        let ids: Vec<&str> = hits
            .iter()
            .map(|h| h.record["id"].as_str().unwrap())
            .collect();
        // All three are colinear with the query (score 1.0); order falls
        // back to id.
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
