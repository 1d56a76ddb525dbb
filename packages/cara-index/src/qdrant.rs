use std::time::Duration;

use ahash::AHashMap;
use qdrant_client::qdrant::{
	Query, QueryPointsBuilder, ScoredPoint, point_id::PointIdOptions, value::Kind,
};
use tracing::warn;

use cara_domain::{HybridQuery, Passage};

use crate::Result;

pub const DENSE_VECTOR_NAME: &str = "dense";
pub const LEXICAL_VECTOR_NAME: &str = "bm25";

pub const TEXT_PAYLOAD_KEY: &str = "text";
pub const SOURCE_PAYLOAD_KEY: &str = "source";

/// Client for the hybrid passage collection: one qdrant collection carrying
/// a dense named vector and a sparse lexical named vector per passage.
pub struct QdrantIndex {
	client: qdrant_client::Qdrant,
	collection: String,
}
impl QdrantIndex {
	pub fn new(cfg: &cara_config::Index) -> Result<Self> {
		let mut builder = qdrant_client::Qdrant::from_url(&cfg.url)
			.timeout(Duration::from_millis(cfg.timeout_ms));
		if let Some(api_key) = cfg.api_key.as_ref() {
			builder = builder.api_key(api_key.clone());
		}

		Ok(Self { client: builder.build()?, collection: cfg.collection.clone() })
	}

	/// Runs one bounded lookup per retrieval arm and convex-combines the
	/// scores with the query's weighting before truncating to `top_k`.
	pub async fn query_hybrid(&self, query: &HybridQuery) -> Result<Vec<Passage>> {
		let dense_arm = self.query_arm(
			Query::new_nearest(query.dense.clone()),
			DENSE_VECTOR_NAME,
			query.candidate_k,
		);
		let (dense_hits, lexical_hits) = if query.sparse.is_empty() {
			(dense_arm.await?, Vec::new())
		} else {
			let pairs: Vec<(u32, f32)> = query
				.sparse
				.indices
				.iter()
				.copied()
				.zip(query.sparse.values.iter().copied())
				.collect();
			let lexical_arm = self.query_arm(
				Query::new_nearest(pairs.as_slice()),
				LEXICAL_VECTOR_NAME,
				query.candidate_k,
			);

			tokio::try_join!(dense_arm, lexical_arm)?
		};

		Ok(fuse(dense_hits, lexical_hits, query.alpha, query.top_k))
	}

	async fn query_arm(
		&self,
		query: Query,
		using: &str,
		candidate_k: u32,
	) -> Result<Vec<ScoredPoint>> {
		let request = QueryPointsBuilder::new(self.collection.clone())
			.query(query)
			.using(using)
			.limit(candidate_k as u64)
			.with_payload(true);

		Ok(self.client.query(request).await?.result)
	}
}

#[derive(Debug, Default)]
struct FusedHit {
	text: String,
	source: String,
	dense_score: f32,
	lexical_score: f32,
}

fn fuse(
	dense: Vec<ScoredPoint>,
	lexical: Vec<ScoredPoint>,
	alpha: f32,
	top_k: u32,
) -> Vec<Passage> {
	let mut hits: AHashMap<String, FusedHit> = AHashMap::new();
	for (points, is_dense) in [(dense, true), (lexical, false)] {
		for point in points {
			let Some(key) = point_key(&point) else {
				warn!("Skipping scored point without an id.");

				continue;
			};
			let Some(text) = payload_str(&point, TEXT_PAYLOAD_KEY) else {
				warn!(%key, "Skipping scored point without a text payload.");

				continue;
			};
			let hit = hits.entry(key).or_default();
			hit.text = text;
			hit.source = payload_str(&point, SOURCE_PAYLOAD_KEY).unwrap_or_default();
			if is_dense {
				hit.dense_score = point.score;
			} else {
				hit.lexical_score = point.score;
			}
		}
	}

	let mut passages: Vec<Passage> = hits
		.into_values()
		.map(|hit| Passage {
			text: hit.text,
			source: hit.source,
			score: alpha * hit.dense_score + (1.0 - alpha) * hit.lexical_score,
		})
		.collect();

	passages.sort_by(|a, b| b.score.total_cmp(&a.score));
	passages.truncate(top_k as usize);

	passages
}

fn point_key(point: &ScoredPoint) -> Option<String> {
	match point.id.as_ref()?.point_id_options.as_ref()? {
		PointIdOptions::Num(num) => Some(num.to_string()),
		PointIdOptions::Uuid(uuid) => Some(uuid.clone()),
	}
}

fn payload_str(point: &ScoredPoint, key: &str) -> Option<String> {
	match point.payload.get(key)?.kind.as_ref()? {
		Kind::StringValue(value) => Some(value.clone()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use qdrant_client::qdrant::{PointId, Value};

	use super::*;

	fn point(id: u64, text: &str, source: &str, score: f32) -> ScoredPoint {
		ScoredPoint {
			id: Some(PointId { point_id_options: Some(PointIdOptions::Num(id)) }),
			payload: HashMap::from([
				(
					TEXT_PAYLOAD_KEY.to_string(),
					Value { kind: Some(Kind::StringValue(text.to_string())) },
				),
				(
					SOURCE_PAYLOAD_KEY.to_string(),
					Value { kind: Some(Kind::StringValue(source.to_string())) },
				),
			]),
			score,
			..Default::default()
		}
	}

	#[test]
	fn fusion_weights_both_arms() {
		let dense = vec![point(1, "first", "Part 1", 0.9), point(2, "second", "Part 2", 0.5)];
		let lexical = vec![point(2, "second", "Part 2", 0.8)];
		let passages = fuse(dense, lexical, 0.5, 10);

		// Point 2 fuses to 0.65, point 1 to 0.45.
		assert_eq!(passages.len(), 2);
		assert_eq!(passages[0].source, "Part 2");
		assert!((passages[0].score - 0.65).abs() < 1e-6);
		assert!((passages[1].score - 0.45).abs() < 1e-6);
	}

	#[test]
	fn alpha_one_ignores_the_lexical_arm() {
		let dense = vec![point(1, "first", "Part 1", 0.3)];
		let lexical = vec![point(2, "second", "Part 2", 0.9)];
		let passages = fuse(dense, lexical, 1.0, 10);

		assert_eq!(passages[0].source, "Part 1");
		assert!((passages[1].score - 0.0).abs() < 1e-6);
	}

	#[test]
	fn results_are_truncated_to_top_k() {
		let dense =
			(0..6).map(|i| point(i, "text", "Part 1", 1.0 - i as f32 * 0.1)).collect::<Vec<_>>();
		let passages = fuse(dense, Vec::new(), 1.0, 4);

		assert_eq!(passages.len(), 4);
	}

	#[test]
	fn points_without_text_payload_are_skipped() {
		let mut broken = point(1, "unused", "Part 1", 0.9);
		broken.payload.remove(TEXT_PAYLOAD_KEY);

		let passages = fuse(vec![broken, point(2, "kept", "Part 2", 0.1)], Vec::new(), 1.0, 10);

		assert_eq!(passages.len(), 1);
		assert_eq!(passages[0].text, "kept");
	}
}
