use serde::{Deserialize, Serialize};

/// Sparse weighted-term representation of a query, produced by the lexical
/// encoder. Indices are term ids in the corpus vocabulary; `indices` and
/// `values` are parallel and sorted by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
	pub indices: Vec<u32>,
	pub values: Vec<f32>,
}
impl SparseVector {
	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}
}

/// One hybrid index lookup: both query representations plus the knobs the
/// index client needs to weight and bound the result.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridQuery {
	pub dense: Vec<f32>,
	pub sparse: SparseVector,
	/// Convex weight on the dense arm; the sparse arm gets `1 - alpha`.
	pub alpha: f32,
	/// Candidate pool fetched per arm before fusion.
	pub candidate_k: u32,
	/// Result bound after fusion.
	pub top_k: u32,
}
