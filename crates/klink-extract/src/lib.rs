//! klink Extract - Knowledge extraction over parsed documents
//!
//! Turns one document's parse into:
//! - Typed entity mentions (Entity Tagger)
//! - Subject-verb-object, entity-entity and entity-action relations
//!   (Relation Extractor)
//!
//! Both components take the annotator handle at construction; extraction is
//! a pure function of the document text and the loaded resources, and its
//! output order is stable for a given parse.

use std::sync::Arc;

use tracing::warn;

use klink_core::{Document, EntityMention};
use klink_nlp::Annotator;

pub mod pairs;
pub mod relation;

pub use pairs::EntityPairs;
pub use relation::RelationExtractor;

// ============================================================================
// Entity Tagger
// ============================================================================

/// Tags documents with typed entity mentions.
///
/// The label set is closed; anything the annotator reports is already
/// restricted to it. Empty text or a failed parse yields an empty result,
/// never an error.
pub struct EntityTagger {
    annotator: Arc<dyn Annotator>,
}

impl EntityTagger {
    pub fn new(annotator: Arc<dyn Annotator>) -> Self {
        Self { annotator }
    }

    /// Extract every entity mention from one document, in parser order.
    /// Repeated surface forms produce repeated mentions.
    pub fn tag(&self, doc: &Document) -> Vec<EntityMention> {
        let text = doc.analysis_text();
        let parsed = match self.annotator.annotate(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(doc_id = %doc.id, error = %e, "annotation failed, emitting no mentions");
                return Vec::new();
            }
        };

        parsed
            .entities
            .iter()
            .map(|span| EntityMention {
                text: span.text.clone(),
                label: span.label,
                source_doc_id: doc.id.clone(),
                source_title: doc.title.clone(),
                corpus: doc.corpus,
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
