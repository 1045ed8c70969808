mod embedder;

pub use embedder::{Embedder, GeminiEmbedder};

use crate::error::{store_error, AppResult, Error};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Similarity index file inside the store directory
const INDEX_FILE: &str = "records.json";

/// Flat table mirror of the index, columns `ids,description`
const TABLE_FILE: &str = "df_db.csv";

lazy_static! {
    static ref CALENDAR_ID_RE: Regex =
        Regex::new(r"Calendar_ID=([A-Za-z0-9_-]+)").expect("valid calendar id pattern");
}

/// Extract the embedded `Calendar_ID=<id>` token from a record's text
pub fn extract_calendar_id(text: &str) -> Option<String> {
    CALENDAR_ID_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// One persisted event record
///
/// `calendar_id` is the structural key to the remote event, filled from the
/// embedded token at write time so resolution does not have to rely on text
/// matching alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Sequential record id, `id1`, `id2`, ...
    pub id: String,
    /// Free-text description, embeds a `Calendar_ID=<id>` token
    pub description: String,
    /// Calendar event id this record refers to
    pub calendar_id: Option<String>,
    /// Embedding of the description
    pub embedding: Vec<f32>,
}

/// A record returned from a similarity query
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: EventRecord,
    pub score: f32,
}

/// Embedding-indexed store of event records
///
/// Records live in `records.json` (the similarity index) with a `df_db.csv`
/// flat-table mirror. Both files are rewritten from the same in-memory state
/// on every mutation, which keeps their id sets identical.
pub struct EventStore {
    dir: PathBuf,
    records: Vec<EventRecord>,
    embedder: Arc<dyn Embedder>,
}

impl EventStore {
    /// Open (or create) the store in the given directory
    pub async fn open(dir: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| store_error(&format!("Failed to create store directory: {}", e)))?;

        let index_path = dir.join(INDEX_FILE);
        let records: Vec<EventRecord> = if index_path.exists() {
            let content = fs::read_to_string(&index_path)
                .map_err(|e| store_error(&format!("Failed to read index: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| store_error(&format!("Failed to parse index: {}", e)))?
        } else {
            Vec::new()
        };

        let store = Self {
            dir,
            records,
            embedder,
        };
        store.reconcile_table()?;
        Ok(store)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a new record and return its id
    pub async fn append(&mut self, description: &str) -> AppResult<String> {
        let id = format!("id{}", self.records.len() + 1);
        let embedding = self.embedder.embed(description).await?;
        let calendar_id = extract_calendar_id(description);

        self.records.push(EventRecord {
            id: id.clone(),
            description: description.to_string(),
            calendar_id,
            embedding,
        });
        self.persist()?;

        info!("Stored record {}", id);
        Ok(id)
    }

    /// Nearest-neighbor lookup, best matches first
    pub async fn query(&self, query_text: &str, n_results: usize) -> AppResult<Vec<ScoredRecord>> {
        if self.records.is_empty() || n_results == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query_text).await?;
        let mut scored: Vec<ScoredRecord> = self
            .records
            .iter()
            .map(|record| ScoredRecord {
                score: cosine_similarity(&query_embedding, &record.embedding),
                record: record.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(n_results);
        Ok(scored)
    }

    /// Replace the record best matching `query_text` with a new description
    ///
    /// The record keeps its id; text and embedding are overwritten in place.
    /// Returns the id of the replaced record.
    pub async fn replace(&mut self, query_text: &str, new_description: &str) -> AppResult<String> {
        let best = self
            .query(query_text, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::EventNotFound(format!("No record matching '{}'", query_text)))?;

        let embedding = self.embedder.embed(new_description).await?;

        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == best.record.id)
            .ok_or_else(|| store_error("Matched record disappeared from the index"))?;

        record.description = new_description.to_string();
        record.embedding = embedding;
        // A new token supersedes the old mapping; without one the old mapping stays valid
        if let Some(calendar_id) = extract_calendar_id(new_description) {
            record.calendar_id = Some(calendar_id);
        }
        let id = record.id.clone();
        self.persist()?;

        info!("Replaced record {}", id);
        Ok(id)
    }

    /// Write index and flat table from the in-memory records
    fn persist(&self) -> AppResult<()> {
        let index_json = serde_json::to_string_pretty(&self.records)?;
        fs::write(self.dir.join(INDEX_FILE), index_json)
            .map_err(|e| store_error(&format!("Failed to write index: {}", e)))?;
        self.write_table()
    }

    /// Rewrite the CSV mirror
    fn write_table(&self) -> AppResult<()> {
        let mut table = String::from("ids,description\n");
        for record in &self.records {
            table.push_str(&format!(
                "{},{}\n",
                record.id,
                csv_field(&record.description)
            ));
        }
        fs::write(self.dir.join(TABLE_FILE), table)
            .map_err(|e| store_error(&format!("Failed to write table: {}", e)))
    }

    /// Ensure the flat table's id set matches the index
    ///
    /// The original wrote the two files independently and a failure between
    /// the writes could leave them diverged; here the index is authoritative
    /// and a diverged table is rewritten from it on open.
    fn reconcile_table(&self) -> AppResult<()> {
        let table_path = self.dir.join(TABLE_FILE);
        let table_ids: HashSet<String> = if table_path.exists() {
            let content = fs::read_to_string(&table_path)
                .map_err(|e| store_error(&format!("Failed to read table: {}", e)))?;
            content
                .lines()
                .skip(1)
                .filter_map(|line| line.split_once(',').map(|(id, _)| id.to_string()))
                .collect()
        } else {
            HashSet::new()
        };

        let index_ids: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
        if table_ids != index_ids {
            if table_path.exists() {
                warn!("Flat table diverged from the index, rewriting it");
            }
            self.write_table()?;
        }
        Ok(())
    }
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
