//! Per-corpus aggregation of entity, relation and link streams.
//!
//! Aggregators observe records one at a time while the same records stream
//! to the report writers, so statistics are complete exactly when the
//! detail sections finish.

use std::collections::BTreeMap;

use serde::Serialize;

use klink_core::{Corpus, EntityMention, Relation, RelationKind, SimilarityLink};

use crate::counter::FrequencyCounter;
use crate::TOP_K;

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Default)]
struct CorpusEntityAccum {
    counts: BTreeMap<&'static str, u64>,
    by_label: BTreeMap<&'static str, FrequencyCounter>,
}

impl CorpusEntityAccum {
    fn observe(&mut self, mention: &EntityMention) {
        let label = mention.label.as_str();
        *self.counts.entry(label).or_default() += 1;
        self.by_label
            .entry(label)
            .or_default()
            // Case-folded so "OpenAI" and "openai" rank together
            .add(mention.text.to_lowercase());
    }

    fn finish(&self) -> CorpusEntityStats {
        CorpusEntityStats {
            counts: self.counts.clone(),
            most_common: self
                .by_label
                .iter()
                .map(|(label, counter)| (*label, counter.top(TOP_K)))
                .collect(),
        }
    }
}

/// Entity statistics for one corpus
#[derive(Debug, Serialize)]
pub struct CorpusEntityStats {
    pub counts: BTreeMap<&'static str, u64>,
    pub most_common: BTreeMap<&'static str, Vec<(String, u64)>>,
}

/// Entity statistics for both corpora
#[derive(Debug, Serialize)]
pub struct EntityStatistics {
    pub paper: CorpusEntityStats,
    pub article: CorpusEntityStats,
}

/// Streams entity mentions into per-corpus counts and top-10 rankings
#[derive(Debug, Default)]
pub struct EntityAggregator {
    paper: CorpusEntityAccum,
    article: CorpusEntityAccum,
}

impl EntityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, mention: &EntityMention) {
        match mention.corpus {
            Corpus::Paper => self.paper.observe(mention),
            Corpus::Article => self.article.observe(mention),
        }
    }

    pub fn finish(&self) -> EntityStatistics {
        EntityStatistics {
            paper: self.paper.finish(),
            article: self.article.finish(),
        }
    }
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Default)]
struct CorpusRelationAccum {
    counts: BTreeMap<&'static str, u64>,
    subject_verb: FrequencyCounter,
    entity_pairs: FrequencyCounter,
}

impl CorpusRelationAccum {
    fn observe(&mut self, relation: &Relation) {
        *self.counts.entry(relation.kind.name()).or_default() += 1;

        match &relation.kind {
            RelationKind::SubjectVerbObject { subject, verb, .. } => {
                self.subject_verb.add(format!("{subject}_{verb}"));
            }
            RelationKind::EntityEntity { entity1, entity2 } => {
                self.entity_pairs
                    .add(format!("{}_{}", entity1.text, entity2.text));
            }
            RelationKind::EntityAction { .. } => {}
        }
    }

    fn finish(&self) -> CorpusRelationStats {
        CorpusRelationStats {
            relation_counts: self.counts.clone(),
            common_patterns: CommonPatterns {
                subject_verb: self.subject_verb.top(TOP_K),
                entity_pairs: self.entity_pairs.top(TOP_K),
            },
        }
    }
}

/// Most frequent relation patterns for one corpus
#[derive(Debug, Serialize)]
pub struct CommonPatterns {
    pub subject_verb: Vec<(String, u64)>,
    pub entity_pairs: Vec<(String, u64)>,
}

/// Relation statistics for one corpus
#[derive(Debug, Serialize)]
pub struct CorpusRelationStats {
    pub relation_counts: BTreeMap<&'static str, u64>,
    pub common_patterns: CommonPatterns,
}

/// Relation statistics for both corpora
#[derive(Debug, Serialize)]
pub struct RelationStatistics {
    pub paper: CorpusRelationStats,
    pub article: CorpusRelationStats,
}

/// Streams relations into per-corpus counts and pattern rankings
#[derive(Debug, Default)]
pub struct RelationAggregator {
    paper: CorpusRelationAccum,
    article: CorpusRelationAccum,
}

impl RelationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, relation: &Relation) {
        match relation.corpus {
            Corpus::Paper => self.paper.observe(relation),
            Corpus::Article => self.article.observe(relation),
        }
    }

    pub fn finish(&self) -> RelationStatistics {
        RelationStatistics {
            paper: self.paper.finish(),
            article: self.article.finish(),
        }
    }
}

// ============================================================================
// Links
// ============================================================================

/// Link statistics over the whole document-link report
#[derive(Debug, Serialize)]
pub struct LinkStatistics {
    pub total_relations: u64,
    /// Mean over every neighbor score; absent when no link has neighbors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_similarity: Option<f64>,
}

/// Streams similarity links into totals and the average neighbor score
#[derive(Debug, Default)]
pub struct LinkStatsAccum {
    links: u64,
    score_sum: f64,
    score_count: u64,
}

impl LinkStatsAccum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, link: &SimilarityLink) {
        self.links += 1;
        for neighbor in &link.neighbors {
            self.score_sum += f64::from(neighbor.similarity);
            self.score_count += 1;
        }
    }

    pub fn finish(&self) -> LinkStatistics {
        LinkStatistics {
            total_relations: self.links,
            average_similarity: (self.score_count > 0)
                .then(|| self.score_sum / self.score_count as f64),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use klink_core::{EntityLabel, EntityRef, Neighbor};

    fn mention(text: &str, label: EntityLabel, corpus: Corpus) -> EntityMention {
        EntityMention {
            text: text.to_string(),
            label,
            source_doc_id: "d1".to_string(),
            source_title: "t".to_string(),
            corpus,
        }
    }

    fn svo(subject: &str, verb: &str, corpus: Corpus) -> Relation {
        Relation {
            source_doc_id: "d1".to_string(),
            source_title: "t".to_string(),
            corpus,
            kind: RelationKind::SubjectVerbObject {
                subject: subject.to_string(),
                verb: verb.to_string(),
                object: "it".to_string(),
                sentence: "s".to_string(),
            },
        }
    }

    #[test]
    fn test_entity_counts_are_case_folded_per_label() {
        let mut agg = EntityAggregator::new();
        agg.observe(&mention("OpenAI", EntityLabel::Org, Corpus::Paper));
        agg.observe(&mention("openai", EntityLabel::Org, Corpus::Paper));
        agg.observe(&mention("Tokyo", EntityLabel::Gpe, Corpus::Paper));
        agg.observe(&mention("OpenAI", EntityLabel::Org, Corpus::Article));

        let stats = agg.finish();
        assert_eq!(stats.paper.counts["ORG"], 2);
        assert_eq!(stats.paper.counts["GPE"], 1);
        assert_eq!(stats.paper.most_common["ORG"], vec![("openai".to_string(), 2)]);
        // Corpora aggregate independently
        assert_eq!(stats.article.counts["ORG"], 1);
    }

    #[test]
    fn test_relation_patterns() {
        let mut agg = RelationAggregator::new();
        agg.observe(&svo("model", "beats", Corpus::Article));
        agg.observe(&svo("model", "beats", Corpus::Article));
        agg.observe(&svo("team", "ships", Corpus::Article));
        agg.observe(&Relation {
            source_doc_id: "d2".to_string(),
            source_title: "t".to_string(),
            corpus: Corpus::Article,
            kind: RelationKind::EntityEntity {
                entity1: EntityRef {
                    text: "OpenAI".to_string(),
                    label: EntityLabel::Org,
                },
                entity2: EntityRef {
                    text: "Google".to_string(),
                    label: EntityLabel::Org,
                },
            },
        });

        let stats = agg.finish();
        assert_eq!(stats.article.relation_counts["subject_verb_object"], 3);
        assert_eq!(stats.article.relation_counts["entity_entity"], 1);
        assert_eq!(
            stats.article.common_patterns.subject_verb[0],
            ("model_beats".to_string(), 2)
        );
        assert_eq!(
            stats.article.common_patterns.entity_pairs,
            vec![("OpenAI_Google".to_string(), 1)]
        );
    }

    #[test]
    fn test_link_average() {
        let mut accum = LinkStatsAccum::new();
        accum.observe(&SimilarityLink {
            query_doc_id: "a1".to_string(),
            query_title: "q".to_string(),
            neighbors: vec![
                Neighbor {
                    target_doc_id: "p1".to_string(),
                    target_title: "t1".to_string(),
                    similarity: 0.5,
                },
                Neighbor {
                    target_doc_id: "p2".to_string(),
                    target_title: "t2".to_string(),
                    similarity: 1.0,
                },
            ],
        });

        let stats = accum.finish();
        assert_eq!(stats.total_relations, 1);
        assert_eq!(stats.average_similarity, Some(0.75));
    }

    #[test]
    fn test_link_average_absent_without_neighbors() {
        let mut accum = LinkStatsAccum::new();
        accum.observe(&SimilarityLink {
            query_doc_id: "a1".to_string(),
            query_title: "q".to_string(),
            neighbors: vec![],
        });

        let stats = accum.finish();
        assert_eq!(stats.total_relations, 1);
        assert!(stats.average_similarity.is_none());

        // The absent average is omitted from the serialized report
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("average_similarity").is_none());
    }
}
