//! Relation Extraction over one document's dependency parse.
//!
//! Three independent rules, all reading the same parse:
//! 1. Subject-verb-object triples from nsubj/dobj arcs under a verb head
//! 2. Entity-entity co-occurrence pairs over pairable mentions
//! 3. Entity-action pairs between pairable mentions and chained verbs
//!
//! Output order is stable: all SVO triples in sentence/token order, then
//! entity pairs, then entity-action pairs.

use std::sync::Arc;

use tracing::warn;

use klink_core::{Document, EntityRef, ExtractionConfig, Relation, RelationKind};
use klink_nlp::{Annotator, Dep, EntitySpan, ParsedDoc, Pos};

use crate::pairs::entity_pairs;

/// Extracts relations from documents via a shared annotator handle.
pub struct RelationExtractor {
    annotator: Arc<dyn Annotator>,
    config: ExtractionConfig,
}

impl RelationExtractor {
    pub fn new(annotator: Arc<dyn Annotator>) -> Self {
        Self {
            annotator,
            config: ExtractionConfig::default(),
        }
    }

    pub fn with_config(annotator: Arc<dyn Annotator>, config: ExtractionConfig) -> Self {
        Self { annotator, config }
    }

    /// Extract all relations from one document.
    ///
    /// Empty text or a failed parse yields an empty result, never an error.
    pub fn extract(&self, doc: &Document) -> Vec<Relation> {
        let text = doc.analysis_text();
        let parsed = match self.annotator.annotate(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(doc_id = %doc.id, error = %e, "annotation failed, emitting no relations");
                return Vec::new();
            }
        };

        let mut relations = Vec::new();
        self.extract_svo(doc, &parsed, &mut relations);
        self.extract_entity_pairs(doc, &parsed, &mut relations);
        self.extract_entity_actions(doc, &parsed, &mut relations);
        relations
    }

    /// Rule 1: for each nominal subject whose head is a verb, pair it with
    /// every direct object under the same verb. Multiple subjects/objects
    /// yield the cross product.
    fn extract_svo(&self, doc: &Document, parsed: &ParsedDoc, out: &mut Vec<Relation>) {
        for sentence in &parsed.sentences {
            for i in sentence.first..sentence.last {
                let token = &parsed.tokens[i];
                if token.dep != Dep::Nsubj {
                    continue;
                }
                let head = token.head;
                if parsed.tokens[head].pos != Pos::Verb {
                    continue;
                }

                for j in sentence.first..sentence.last {
                    let sibling = &parsed.tokens[j];
                    if sibling.dep == Dep::Dobj && sibling.head == head {
                        out.push(self.relation(
                            doc,
                            RelationKind::SubjectVerbObject {
                                subject: token.text.clone(),
                                verb: parsed.tokens[head].text.clone(),
                                object: sibling.text.clone(),
                                sentence: sentence.text.clone(),
                            },
                        ));
                    }
                }
            }
        }
    }

    /// Rule 2: every unordered pair of pairable mentions in the document.
    /// Quadratic by design; `max_pairable_mentions` skips oversized
    /// documents.
    fn extract_entity_pairs(&self, doc: &Document, parsed: &ParsedDoc, out: &mut Vec<Relation>) {
        let pairable = pairable_mentions(parsed);

        if let Some(max) = self.config.max_pairable_mentions {
            if pairable.len() > max {
                warn!(
                    doc_id = %doc.id,
                    mentions = pairable.len(),
                    max,
                    "skipping entity-pair extraction for oversized document"
                );
                return;
            }
        }

        for (first, second) in entity_pairs(&pairable) {
            out.push(self.relation(
                doc,
                RelationKind::EntityEntity {
                    entity1: entity_ref(first),
                    entity2: entity_ref(second),
                },
            ));
        }
    }

    /// Rule 3: every pairable mention paired with every verb token whose own
    /// head is a different verb (compound/auxiliary chains), document-wide
    /// regardless of sentence or proximity.
    fn extract_entity_actions(&self, doc: &Document, parsed: &ParsedDoc, out: &mut Vec<Relation>) {
        let pairable = pairable_mentions(parsed);
        let actions: Vec<usize> = (0..parsed.tokens.len())
            .filter(|&i| parsed.is_chained_verb(i))
            .collect();

        for span in &pairable {
            for &action in &actions {
                out.push(self.relation(
                    doc,
                    RelationKind::EntityAction {
                        entity: entity_ref(span),
                        action: parsed.tokens[action].text.clone(),
                    },
                ));
            }
        }
    }

    fn relation(&self, doc: &Document, kind: RelationKind) -> Relation {
        Relation {
            source_doc_id: doc.id.clone(),
            source_title: doc.title.clone(),
            corpus: doc.corpus,
            kind,
        }
    }
}

/// Mentions eligible for pairwise relations, in parser order
fn pairable_mentions(parsed: &ParsedDoc) -> Vec<&EntitySpan> {
    parsed
        .entities
        .iter()
        .filter(|span| span.label.is_pairable())
        .collect()
}

fn entity_ref(span: &EntitySpan) -> EntityRef {
    EntityRef {
        text: span.text.clone(),
        label: span.label,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use klink_core::Corpus;
    use klink_nlp::RuleAnnotator;

    fn extractor() -> RelationExtractor {
        RelationExtractor::new(Arc::new(RuleAnnotator::new()))
    }

    fn article(id: &str, title: &str) -> Document {
        Document::new(id, title, "", Corpus::Article)
    }

    fn kinds(relations: &[Relation], kind: &str) -> usize {
        relations.iter().filter(|r| r.kind.name() == kind).count()
    }

    #[test]
    fn test_single_entity_pair() {
        let doc = article("a1", "OpenAI and Google compete in AI race");
        let relations = extractor().extract(&doc);

        let pairs: Vec<_> = relations
            .iter()
            .filter_map(|r| match &r.kind {
                RelationKind::EntityEntity { entity1, entity2 } => {
                    Some((entity1.text.as_str(), entity2.text.as_str()))
                }
                _ => None,
            })
            .collect();

        assert_eq!(pairs, vec![("OpenAI", "Google")]);
    }

    #[test]
    fn test_pair_count_is_n_choose_2() {
        let doc = article("a2", "Microsoft, Amazon and Nvidia join OpenAI");
        let relations = extractor().extract(&doc);

        // 4 pairable mentions -> C(4,2) = 6 pairs
        assert_eq!(kinds(&relations, "entity_entity"), 6);
    }

    #[test]
    fn test_svo_extraction() {
        let doc = article("a3", "Startup releases open source model");
        let relations = extractor().extract(&doc);

        let svo: Vec<_> = relations
            .iter()
            .filter_map(|r| match &r.kind {
                RelationKind::SubjectVerbObject {
                    subject,
                    verb,
                    object,
                    sentence,
                } => Some((subject.as_str(), verb.as_str(), object.as_str(), sentence)),
                _ => None,
            })
            .collect();

        assert_eq!(svo.len(), 1);
        let (subject, verb, object, sentence) = svo[0];
        assert_eq!(subject, "Startup");
        assert_eq!(verb, "releases");
        assert_eq!(object, "model");
        assert_eq!(sentence, "Startup releases open source model");
    }

    #[test]
    fn test_svo_cross_product() {
        let doc = article("a4", "Alice and Bob release software");
        let relations = extractor().extract(&doc);
        assert_eq!(kinds(&relations, "subject_verb_object"), 2);
    }

    #[test]
    fn test_entity_action_pairs_chained_verbs() {
        let doc = article("a5", "Microsoft will release the model");
        let relations = extractor().extract(&doc);

        let actions: Vec<_> = relations
            .iter()
            .filter_map(|r| match &r.kind {
                RelationKind::EntityAction { entity, action } => {
                    Some((entity.text.as_str(), action.as_str()))
                }
                _ => None,
            })
            .collect();

        // "will" chains to "release"; the root verb itself is not an action
        assert_eq!(actions, vec![("Microsoft", "will")]);
    }

    #[test]
    fn test_empty_document() {
        let doc = article("a6", "");
        assert!(extractor().extract(&doc).is_empty());
    }

    #[test]
    fn test_pair_bound_skips_oversized_documents() {
        let config = ExtractionConfig {
            max_pairable_mentions: Some(2),
        };
        let extractor = RelationExtractor::with_config(Arc::new(RuleAnnotator::new()), config);

        let doc = article("a7", "Microsoft, Amazon and Nvidia join OpenAI");
        let relations = extractor.extract(&doc);

        assert_eq!(kinds(&relations, "entity_entity"), 0);
    }

    #[test]
    fn test_output_order_is_stable() {
        let doc = article("a8", "OpenAI and Google compete in AI race");
        let first = extractor().extract(&doc);
        let second = extractor().extract(&doc);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }
}
