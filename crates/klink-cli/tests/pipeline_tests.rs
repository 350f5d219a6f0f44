//! End-to-end pipeline tests over in-memory corpora.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use klink_cli::pipeline::{self, CorpusSet};
use klink_core::{Corpus, Document, ExtractionConfig, LinkerConfig, Result};
use klink_nlp::RuleAnnotator;
use klink_vector::SentenceEncoder;

fn corpora() -> CorpusSet {
    CorpusSet {
        papers: vec![Document::new(
            "http://arxiv.org/abs/2401.00001",
            "Quantum computing at OpenAI",
            "We evaluate transformer models from Google and Microsoft.",
            Corpus::Paper,
        )],
        articles: vec![
            Document::new(
                "38970001",
                "OpenAI and Google compete in AI race",
                "",
                Corpus::Article,
            ),
            Document::new(
                "38970002",
                "Startup releases open source model",
                "",
                Corpus::Article,
            ),
        ],
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn entity_report_structure() {
    let dir = tempfile::tempdir().unwrap();
    pipeline::run_entities(Arc::new(RuleAnnotator::new()), &corpora(), dir.path()).unwrap();

    let report = read_json(&dir.path().join("entities.json"));

    let papers = report["detailed_entities"]["paper"].as_array().unwrap();
    assert!(!papers.is_empty());

    const LABELS: [&str; 5] = ["PERSON", "ORG", "GPE", "PRODUCT", "WORK_OF_ART"];
    for record in papers {
        assert!(LABELS.contains(&record["label"].as_str().unwrap()));
        assert_eq!(record["source_doc_id"], "http://arxiv.org/abs/2401.00001");
    }

    // Paper text mentions three known organizations
    assert_eq!(report["statistics"]["paper"]["counts"]["ORG"], 3);

    let articles = report["detailed_entities"]["article"].as_array().unwrap();
    assert!(articles
        .iter()
        .any(|r| r["text"] == "OpenAI" && r["source_doc_id"] == "38970001"));

    // Top lists never exceed ten entries
    for (_, top) in report["statistics"]["article"]["most_common"]
        .as_object()
        .unwrap()
    {
        assert!(top.as_array().unwrap().len() <= 10);
    }
}

#[test]
fn relation_report_structure() {
    let dir = tempfile::tempdir().unwrap();
    pipeline::run_relations(
        Arc::new(RuleAnnotator::new()),
        ExtractionConfig::default(),
        &corpora(),
        dir.path(),
    )
    .unwrap();

    let report = read_json(&dir.path().join("relations.json"));
    let articles = report["detailed_relations"]["article"].as_array().unwrap();

    // "OpenAI and Google compete in AI race" yields exactly one entity pair
    let pairs: Vec<&Value> = articles
        .iter()
        .filter(|r| r["kind"] == "entity_entity" && r["source_doc_id"] == "38970001")
        .collect();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["entity1"]["text"], "OpenAI");
    assert_eq!(pairs[0]["entity2"]["text"], "Google");

    // "Startup releases open source model" yields one SVO triple
    let svo: Vec<&Value> = articles
        .iter()
        .filter(|r| r["kind"] == "subject_verb_object")
        .collect();
    assert_eq!(svo.len(), 1);
    assert_eq!(svo[0]["subject"], "Startup");
    assert_eq!(svo[0]["verb"], "releases");
    assert_eq!(svo[0]["object"], "model");

    let counts = &report["statistics"]["article"]["relation_counts"];
    assert_eq!(counts["entity_entity"], 1);
    assert_eq!(counts["subject_verb_object"], 1);

    let patterns = &report["statistics"]["article"]["common_patterns"];
    assert_eq!(patterns["subject_verb"][0][0], "Startup_releases");
    assert_eq!(patterns["entity_pairs"][0][0], "OpenAI_Google");
}

/// Deterministic byte-derived vectors stand in for the model in tests
struct StubEncoder;

#[async_trait]
impl SentenceEncoder for StubEncoder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 8];
                for (i, byte) in text.bytes().enumerate() {
                    vector[i % 8] += byte as f32 / 255.0;
                }
                vector
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        8
    }
}

#[tokio::test]
async fn link_report_structure() {
    let dir = tempfile::tempdir().unwrap();
    pipeline::run_links(
        Arc::new(StubEncoder),
        &LinkerConfig::default(),
        16,
        &corpora(),
        dir.path(),
    )
    .await
    .unwrap();

    let report = read_json(&dir.path().join("links.json"));
    let links = report["document_relations"].as_array().unwrap();

    // One link per article, in article order
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["query_doc_id"], "38970001");
    assert_eq!(links[1]["query_doc_id"], "38970002");

    // k=5 against a single indexed paper returns exactly one neighbor
    for link in links {
        let neighbors = link["neighbors"].as_array().unwrap();
        assert_eq!(neighbors.len(), 1);
        let similarity = neighbors[0]["similarity"].as_f64().unwrap();
        assert!(similarity > 0.0 && similarity <= 1.0);
    }

    assert_eq!(report["statistics"]["total_relations"], 2);
    let average = report["statistics"]["average_similarity"].as_f64().unwrap();
    assert!(average > 0.0 && average <= 1.0);
}

#[tokio::test]
async fn link_report_with_no_neighbors_omits_average() {
    let dir = tempfile::tempdir().unwrap();
    let corpora = CorpusSet {
        papers: vec![],
        articles: vec![Document::new("a1", "lonely query", "", Corpus::Article)],
    };

    pipeline::run_links(
        Arc::new(StubEncoder),
        &LinkerConfig::default(),
        16,
        &corpora,
        dir.path(),
    )
    .await
    .unwrap();

    let report = read_json(&dir.path().join("links.json"));
    assert_eq!(report["statistics"]["total_relations"], 1);
    assert!(report["statistics"].get("average_similarity").is_none());
    assert!(report["document_relations"][0]["neighbors"]
        .as_array()
        .unwrap()
        .is_empty());
}
