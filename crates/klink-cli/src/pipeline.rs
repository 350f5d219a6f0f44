//! Pipeline orchestration.
//!
//! Each run phase streams its records straight into the report writer
//! while the matching aggregator observes them, so nothing but the
//! similarity index's matrix is held for the whole run.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use klink_core::{Corpus, Document, ExtractionConfig, LinkerConfig, Result};
use klink_extract::{EntityTagger, RelationExtractor};
use klink_nlp::Annotator;
use klink_report::{
    EntityAggregator, LinkReportWriter, LinkStatsAccum, RelationAggregator, ReportWriter,
};
use klink_vector::{CrossCorpusLinker, SentenceEncoder};

/// Both corpora, loaded read-only before the run
pub struct CorpusSet {
    pub papers: Vec<Document>,
    pub articles: Vec<Document>,
}

impl CorpusSet {
    fn sections(&self) -> [(Corpus, &[Document]); 2] {
        [
            (Corpus::Paper, self.papers.as_slice()),
            (Corpus::Article, self.articles.as_slice()),
        ]
    }
}

/// Tag every document and write the entity report to `entities.json`.
pub fn run_entities(
    annotator: Arc<dyn Annotator>,
    corpora: &CorpusSet,
    out_dir: &Path,
) -> Result<()> {
    let tagger = EntityTagger::new(annotator);
    let path = out_dir.join("entities.json");
    let file = BufWriter::new(File::create(&path)?);

    let mut report = ReportWriter::create(file, "detailed_entities")?;
    let mut aggregator = EntityAggregator::new();
    let mut total = 0usize;

    for (corpus, docs) in corpora.sections() {
        report.begin_corpus(corpus)?;
        for doc in docs {
            for mention in tagger.tag(doc) {
                aggregator.observe(&mention);
                report.push(&mention)?;
                total += 1;
            }
        }
        report.end_corpus()?;
    }

    report.finish(&aggregator.finish())?;
    info!(mentions = total, path = %path.display(), "entity report written");
    Ok(())
}

/// Extract every relation and write the relation report to
/// `relations.json`.
pub fn run_relations(
    annotator: Arc<dyn Annotator>,
    config: ExtractionConfig,
    corpora: &CorpusSet,
    out_dir: &Path,
) -> Result<()> {
    let extractor = RelationExtractor::with_config(annotator, config);
    let path = out_dir.join("relations.json");
    let file = BufWriter::new(File::create(&path)?);

    let mut report = ReportWriter::create(file, "detailed_relations")?;
    let mut aggregator = RelationAggregator::new();
    let mut total = 0usize;

    for (corpus, docs) in corpora.sections() {
        report.begin_corpus(corpus)?;
        for doc in docs {
            for relation in extractor.extract(doc) {
                aggregator.observe(&relation);
                report.push(&relation)?;
                total += 1;
            }
        }
        report.end_corpus()?;
    }

    report.finish(&aggregator.finish())?;
    info!(relations = total, path = %path.display(), "relation report written");
    Ok(())
}

/// Link articles against the indexed paper corpus and write the
/// document-link report to `links.json`.
pub async fn run_links(
    encoder: Arc<dyn SentenceEncoder>,
    config: &LinkerConfig,
    batch_size: usize,
    corpora: &CorpusSet,
    out_dir: &Path,
) -> Result<()> {
    let linker = CrossCorpusLinker::new(encoder, config.top_k, batch_size);
    let path = out_dir.join("links.json");
    let file = BufWriter::new(File::create(&path)?);

    let mut report = LinkReportWriter::create(file)?;
    let mut stats = LinkStatsAccum::new();

    let produced = linker
        .link_with(&corpora.papers, &corpora.articles, |link| {
            stats.observe(&link);
            report.push(&link)
        })
        .await?;

    report.finish(&stats.finish())?;
    info!(links = produced, path = %path.display(), "document-link report written");
    Ok(())
}
