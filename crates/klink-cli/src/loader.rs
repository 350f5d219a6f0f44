//! Corpus loading from scraped JSON files.
//!
//! Papers arrive as `{id, title, summary, author, published, updated}`;
//! articles as `{id, title, by, time, url, score, descendants, kids}` with
//! numeric ids. Only the fields the pipeline analyzes are extracted; a
//! record missing one of them is skipped and counted, never fatal.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use klink_core::{Corpus, Document, Result};

/// Load the paper corpus. Records missing `id`, `title` or `summary` are
/// skipped as malformed.
pub fn load_papers(path: &Path) -> Result<Vec<Document>> {
    let records: Vec<Value> = serde_json::from_reader(BufReader::new(File::open(path)?))?;

    let mut documents = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        match paper_from_value(record) {
            Some(doc) => documents.push(doc),
            None => {
                skipped += 1;
                warn!(index, "skipping malformed paper record");
            }
        }
    }

    info!(
        path = %path.display(),
        loaded = documents.len(),
        skipped,
        "paper corpus loaded"
    );
    Ok(documents)
}

/// Load the article corpus. Records missing `id` or `title` are skipped as
/// malformed; numeric ids are stringified.
pub fn load_articles(path: &Path) -> Result<Vec<Document>> {
    let records: Vec<Value> = serde_json::from_reader(BufReader::new(File::open(path)?))?;

    let mut documents = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for (index, record) in records.iter().enumerate() {
        match article_from_value(record) {
            Some(doc) => documents.push(doc),
            None => {
                skipped += 1;
                warn!(index, "skipping malformed article record");
            }
        }
    }

    info!(
        path = %path.display(),
        loaded = documents.len(),
        skipped,
        "article corpus loaded"
    );
    Ok(documents)
}

fn paper_from_value(record: &Value) -> Option<Document> {
    let id = string_field(record, "id")?;
    let title = string_field(record, "title")?;
    let summary = string_field(record, "summary")?;
    Some(Document::new(id, title, summary, Corpus::Paper))
}

fn article_from_value(record: &Value) -> Option<Document> {
    let id = id_field(record)?;
    let title = string_field(record, "title")?;
    Some(Document::new(id, title, "", Corpus::Article))
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    record.get(key)?.as_str().map(str::to_string)
}

/// Article ids come from the scraper as numbers; accept strings too.
fn id_field(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
