//! Cross-corpus linker.
//!
//! Encodes the indexed corpus once, builds the flat index once, then
//! streams the query corpus through the encoder in fixed-size batches so
//! only the indexed corpus's full matrix stays resident.

use std::sync::Arc;

use tracing::{debug, info};

use klink_core::{Document, Neighbor, Result, SimilarityLink};

use crate::flat_index::{similarity_from_distance, DocRef, FlatIndex};
use crate::SentenceEncoder;

/// Links every query document to its top-k nearest indexed documents.
pub struct CrossCorpusLinker {
    encoder: Arc<dyn SentenceEncoder>,
    top_k: usize,
    batch_size: usize,
}

impl CrossCorpusLinker {
    pub fn new(encoder: Arc<dyn SentenceEncoder>, top_k: usize, batch_size: usize) -> Self {
        Self {
            encoder,
            top_k,
            batch_size: batch_size.max(1),
        }
    }

    /// Link both corpora, collecting every link in query-corpus order.
    pub async fn link(
        &self,
        indexed: &[Document],
        queries: &[Document],
    ) -> Result<Vec<SimilarityLink>> {
        let mut links = Vec::with_capacity(queries.len());
        self.link_with(indexed, queries, |link| {
            links.push(link);
            Ok(())
        })
        .await?;
        Ok(links)
    }

    /// Link both corpora, handing each `SimilarityLink` to `sink` as soon
    /// as its batch resolves. Returns the number of links produced.
    pub async fn link_with<F>(
        &self,
        indexed: &[Document],
        queries: &[Document],
        mut sink: F,
    ) -> Result<usize>
    where
        F: FnMut(SimilarityLink) -> Result<()>,
    {
        let index = self.build_index(indexed).await?;
        info!(
            indexed = index.len(),
            queries = queries.len(),
            top_k = self.top_k,
            "linking corpora"
        );

        let mut produced = 0;
        for batch in queries.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.analysis_text()).collect();
            let vectors = self.encoder.encode_batch(&texts).await?;
            let results = index.search(&vectors, self.top_k)?;

            for (doc, hits) in batch.iter().zip(results) {
                // Positions without a mapping are dropped, not reported
                let neighbors: Vec<Neighbor> = hits
                    .iter()
                    .filter_map(|hit| {
                        index.entry(hit.position).map(|entry| Neighbor {
                            target_doc_id: entry.doc_id.clone(),
                            target_title: entry.title.clone(),
                            similarity: similarity_from_distance(hit.distance),
                        })
                    })
                    .collect();

                sink(SimilarityLink {
                    query_doc_id: doc.id.clone(),
                    query_title: doc.title.clone(),
                    neighbors,
                })?;
                produced += 1;
            }
        }

        Ok(produced)
    }

    async fn build_index(&self, indexed: &[Document]) -> Result<FlatIndex> {
        let texts: Vec<String> = indexed.iter().map(|d| d.analysis_text()).collect();
        let vectors = self.encoder.encode_batch(&texts).await?;
        debug!(count = vectors.len(), "indexed corpus encoded");

        let rows = vectors
            .into_iter()
            .zip(indexed)
            .map(|(vector, doc)| {
                (
                    vector,
                    DocRef {
                        doc_id: doc.id.clone(),
                        title: doc.title.clone(),
                    },
                )
            })
            .collect();

        FlatIndex::build(self.encoder.dimension(), rows)
    }
}

// ============================================================================
// Tests
// ============================================================================
