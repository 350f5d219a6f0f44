//! klink Core - Domain models and shared types
//!
//! This crate defines the core abstractions used throughout the klink
//! pipeline:
//! - Corpus documents and entity/relation/link records
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, EncoderConfig, ExtractionConfig, LinkerConfig, LoggingConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for klink operations
#[derive(Error, Debug)]
pub enum KlinkError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Index error: {0}")]
    IndexError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, KlinkError>;

// ============================================================================
// Corpus and Documents
// ============================================================================

/// Which corpus a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    /// Research paper abstracts
    Paper,
    /// Short news-style titles
    Article,
}

impl Corpus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Article => "article",
        }
    }
}

impl std::fmt::Display for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw document supplied by the corpus loader.
///
/// `id` and `title` are case-sensitive join keys for downstream graph
/// collaborators and must never be normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Abstract/summary text; empty for articles.
    pub body: String,
    pub corpus: Corpus,
}

impl Document {
    /// Create a new document
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        corpus: Corpus,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            corpus,
        }
    }

    /// Text used for linguistic analysis and encoding: the title alone when
    /// there is no body, `"{title}. {body}"` otherwise.
    pub fn analysis_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{}. {}", self.title, self.body)
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Entity label set emitted by the tagger.
///
/// Mentions tagged outside this set are dropped, not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Product,
    WorkOfArt,
}

impl EntityLabel {
    /// All labels, in report order
    pub const ALL: [EntityLabel; 5] = [
        Self::Person,
        Self::Org,
        Self::Gpe,
        Self::Product,
        Self::WorkOfArt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Product => "PRODUCT",
            Self::WorkOfArt => "WORK_OF_ART",
        }
    }

    /// Labels eligible for entity-entity and entity-action relations
    pub fn is_pairable(&self) -> bool {
        matches!(self, Self::Org | Self::Person | Self::Product)
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityLabel {
    type Err = KlinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PERSON" => Ok(Self::Person),
            "ORG" => Ok(Self::Org),
            "GPE" => Ok(Self::Gpe),
            "PRODUCT" => Ok(Self::Product),
            "WORK_OF_ART" => Ok(Self::WorkOfArt),
            _ => Err(KlinkError::ParseFailure(format!(
                "unknown entity label: {s}"
            ))),
        }
    }
}

/// A typed entity mention with source traceability.
///
/// Repeated surface forms produce repeated mentions; no deduplication
/// happens at this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub label: EntityLabel,
    pub source_doc_id: String,
    pub source_title: String,
    pub corpus: Corpus,
}

/// A lightweight entity reference used inside relations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub text: String,
    pub label: EntityLabel,
}

// ============================================================================
// Relations
// ============================================================================

/// A relation extracted from one document.
///
/// Source traceability fields are shared across all kinds; the payload is a
/// tagged variant so all relations live in one sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub source_doc_id: String,
    pub source_title: String,
    pub corpus: Corpus,
    #[serde(flatten)]
    pub kind: RelationKind,
}

/// The three relation kinds emitted by the extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationKind {
    SubjectVerbObject {
        subject: String,
        verb: String,
        object: String,
        sentence: String,
    },
    EntityEntity {
        entity1: EntityRef,
        entity2: EntityRef,
    },
    EntityAction {
        entity: EntityRef,
        action: String,
    },
}

impl RelationKind {
    /// Stable kind name used in reports and statistics
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubjectVerbObject { .. } => "subject_verb_object",
            Self::EntityEntity { .. } => "entity_entity",
            Self::EntityAction { .. } => "entity_action",
        }
    }
}

// ============================================================================
// Similarity Links
// ============================================================================

/// One neighbor of a query document in the indexed corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    pub target_doc_id: String,
    pub target_title: String,
    /// Normalized similarity, strictly in (0, 1]
    pub similarity: f32,
}

/// Top-k most similar indexed documents for one query document.
///
/// Neighbors are ordered by decreasing similarity and never exceed k.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityLink {
    pub query_doc_id: String,
    pub query_title: String,
    pub neighbors: Vec<Neighbor>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_text_with_body() {
        let doc = Document::new("p1", "A Title", "The abstract.", Corpus::Paper);
        assert_eq!(doc.analysis_text(), "A Title. The abstract.");
    }

    #[test]
    fn test_analysis_text_title_only() {
        let doc = Document::new("a1", "Show HN: klink", "", Corpus::Article);
        assert_eq!(doc.analysis_text(), "Show HN: klink");
    }

    #[test]
    fn test_entity_label_roundtrip() {
        for label in EntityLabel::ALL {
            assert_eq!(label.as_str().parse::<EntityLabel>().unwrap(), label);
        }
        assert!("LOC".parse::<EntityLabel>().is_err());
    }

    #[test]
    fn test_pairable_labels() {
        assert!(EntityLabel::Org.is_pairable());
        assert!(EntityLabel::Person.is_pairable());
        assert!(EntityLabel::Product.is_pairable());
        assert!(!EntityLabel::Gpe.is_pairable());
        assert!(!EntityLabel::WorkOfArt.is_pairable());
    }

    #[test]
    fn test_entity_label_serde_names() {
        let json = serde_json::to_string(&EntityLabel::WorkOfArt).unwrap();
        assert_eq!(json, "\"WORK_OF_ART\"");
    }

    #[test]
    fn test_relation_kind_tagging() {
        let relation = Relation {
            source_doc_id: "a42".to_string(),
            source_title: "Startup ships model".to_string(),
            corpus: Corpus::Article,
            kind: RelationKind::EntityAction {
                entity: EntityRef {
                    text: "OpenAI".to_string(),
                    label: EntityLabel::Org,
                },
                action: "ships".to_string(),
            },
        };

        let value = serde_json::to_value(&relation).unwrap();
        assert_eq!(value["kind"], "entity_action");
        assert_eq!(value["corpus"], "article");
        assert_eq!(value["entity"]["label"], "ORG");
        assert_eq!(relation.kind.name(), "entity_action");
    }
}
