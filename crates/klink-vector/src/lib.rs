//! klink Vector - Sentence encoding and exact similarity search
//!
//! Provides the numeric half of the pipeline:
//! - `SentenceEncoder` trait and the candle-backed `BertEncoder`
//! - `FlatIndex`, an exact brute-force L2 index over one corpus
//! - `CrossCorpusLinker`, which joins the two corpora through the index

use async_trait::async_trait;

use klink_core::Result;

pub mod encoder;
pub mod flat_index;
pub mod linker;

pub use encoder::BertEncoder;
pub use flat_index::{similarity_from_distance, DocRef, FlatIndex, SearchHit};
pub use linker::CrossCorpusLinker;

/// Trait for sentence encoders.
///
/// Implementations batch internally; the returned vectors are stacked in
/// input order and share one dimension for the lifetime of the encoder.
/// Identical input text yields an identical vector.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    /// Encode a sequence of texts into one fixed-length vector each
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Encode a single text
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| klink_core::KlinkError::EncodingError("no vector returned".into()))
    }

    /// Embedding dimension
    fn dimension(&self) -> usize;
}
