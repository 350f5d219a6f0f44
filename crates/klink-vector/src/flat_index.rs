//! Exact brute-force L2 similarity index.
//!
//! Holds the full embedding matrix of the indexed corpus plus a stable
//! position -> document mapping fixed at build time. Queries compute
//! squared L2 distance against every stored vector (FAISS IndexFlatL2
//! semantics) and return the k nearest ascending.

use ndarray::Array2;
use tracing::debug;

use klink_core::{KlinkError, Result};

/// Document identity stored at each index position
#[derive(Debug, Clone)]
pub struct DocRef {
    pub doc_id: String,
    pub title: String,
}

/// One query result: an index position and its raw distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// Convert a raw distance into a similarity score.
///
/// Strictly within (0, 1], equal to 1 only at distance 0, monotonically
/// decreasing as distance grows.
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// Exact L2 index over one corpus's embeddings.
///
/// Single-writer: built once, then queried read-only.
#[derive(Debug)]
pub struct FlatIndex {
    vectors: Array2<f32>,
    entries: Vec<DocRef>,
}

impl FlatIndex {
    /// Build the index from `(vector, doc)` rows of one fixed dimension.
    pub fn build(dimension: usize, rows: Vec<(Vec<f32>, DocRef)>) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * dimension);
        let mut entries = Vec::with_capacity(rows.len());

        for (vector, entry) in rows {
            if vector.len() != dimension {
                return Err(KlinkError::IndexError(format!(
                    "vector for {} has dimension {}, index expects {}",
                    entry.doc_id,
                    vector.len(),
                    dimension
                )));
            }
            data.extend(vector);
            entries.push(entry);
        }

        let count = entries.len();
        let vectors = Array2::from_shape_vec((count, dimension), data)
            .map_err(|e| KlinkError::IndexError(format!("matrix shape: {e}")))?;

        debug!(vectors = count, dimension, "similarity index built");

        Ok(Self { vectors, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// Document stored at an index position, if the position is valid
    pub fn entry(&self, position: usize) -> Option<&DocRef> {
        self.entries.get(position)
    }

    /// For each query vector, the k nearest positions by squared L2
    /// distance, ascending; ties break by ascending position. An index
    /// holding fewer than k entries returns everything it holds.
    pub fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<SearchHit>>> {
        queries.iter().map(|query| self.search_one(query, k)).collect()
    }

    fn search_one(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension() {
            return Err(KlinkError::IndexError(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension()
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .vectors
            .rows()
            .into_iter()
            .enumerate()
            .map(|(position, row)| {
                let distance = row
                    .iter()
                    .zip(query)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>();
                SearchHit { position, distance }
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> DocRef {
        DocRef {
            doc_id: id.to_string(),
            title: format!("title {id}"),
        }
    }

    fn two_vector_index() -> FlatIndex {
        FlatIndex::build(
            2,
            vec![
                (vec![0.0, 0.0], doc("p1")),
                (vec![3.0, 4.0], doc("p2")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_underflow_returns_all_entries() {
        let index = two_vector_index();
        let hits = index.search(&[vec![0.0, 0.0]], 5).unwrap();

        assert_eq!(hits[0].len(), 2);
        assert_eq!(hits[0][0].position, 0);
        assert_eq!(hits[0][0].distance, 0.0);
        // Squared L2: 3^2 + 4^2
        assert_eq!(hits[0][1].distance, 25.0);
    }

    #[test]
    fn test_ascending_distance_order() {
        let index = FlatIndex::build(
            1,
            vec![
                (vec![10.0], doc("far")),
                (vec![1.0], doc("near")),
                (vec![5.0], doc("mid")),
            ],
        )
        .unwrap();

        let hits = index.search(&[vec![0.0]], 3).unwrap();
        let order: Vec<&str> = hits[0]
            .iter()
            .map(|h| index.entry(h.position).unwrap().doc_id.as_str())
            .collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_tie_breaks_by_position() {
        let index = FlatIndex::build(
            1,
            vec![
                (vec![1.0], doc("a")),
                (vec![-1.0], doc("b")),
                (vec![1.0], doc("c")),
            ],
        )
        .unwrap();

        let hits = index.search(&[vec![0.0]], 3).unwrap();
        let positions: Vec<usize> = hits[0].iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity_from_distance(0.0), 1.0);
        let near = similarity_from_distance(0.5);
        let far = similarity_from_distance(5.0);
        assert!(near > far);
        assert!(near > 0.0 && near <= 1.0);
        assert!(far > 0.0 && far <= 1.0);
    }

    #[test]
    fn test_dimension_mismatch_on_build() {
        let err = FlatIndex::build(3, vec![(vec![1.0, 2.0], doc("bad"))]).unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }

    #[test]
    fn test_dimension_mismatch_on_query() {
        let index = two_vector_index();
        assert!(index.search(&[vec![1.0]], 5).is_err());
    }

    #[test]
    fn test_mapping_is_stable() {
        let index = two_vector_index();
        assert_eq!(index.entry(0).unwrap().doc_id, "p1");
        assert_eq!(index.entry(1).unwrap().doc_id, "p2");
        assert!(index.entry(2).is_none());
    }
}
