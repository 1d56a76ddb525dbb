use std::{collections::HashMap, fs, path::Path};

use ahash::AHashMap;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use cara_domain::SparseVector;

use crate::{Error, Result};

/// Corpus term statistics produced by the out-of-band indexing job. The
/// encoder treats this as an opaque fitted artifact; it never refits.
#[derive(Debug, Deserialize)]
pub struct Bm25Artifact {
	pub k1: f32,
	pub b: f32,
	pub avgdl: f32,
	pub terms: HashMap<String, Bm25Term>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Bm25Term {
	pub index: u32,
	pub idf: f32,
}

/// Query-side BM25 encoder over the fitted corpus vocabulary. Terms outside
/// the vocabulary contribute nothing; a query with no known terms encodes to
/// an empty sparse vector and retrieval degrades to the dense arm.
pub struct Bm25Encoder {
	k1: f32,
	b: f32,
	avgdl: f32,
	terms: AHashMap<String, Bm25Term>,
}
impl Bm25Encoder {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadArtifact { path: path.to_path_buf(), source: err })?;
		let artifact: Bm25Artifact = serde_json::from_str(&raw)?;

		Self::from_artifact(artifact)
	}

	pub fn from_artifact(artifact: Bm25Artifact) -> Result<Self> {
		if !(artifact.k1.is_finite() && artifact.k1 > 0.0) {
			return Err(Error::InvalidArtifact {
				message: "BM25 artifact k1 must be a positive number.".to_string(),
			});
		}
		if !(artifact.b.is_finite() && (0.0..=1.0).contains(&artifact.b)) {
			return Err(Error::InvalidArtifact {
				message: "BM25 artifact b must be in the range 0.0-1.0.".to_string(),
			});
		}
		if !(artifact.avgdl.is_finite() && artifact.avgdl > 0.0) {
			return Err(Error::InvalidArtifact {
				message: "BM25 artifact avgdl must be a positive number.".to_string(),
			});
		}
		if artifact.terms.is_empty() {
			return Err(Error::InvalidArtifact {
				message: "BM25 artifact vocabulary must be non-empty.".to_string(),
			});
		}

		Ok(Self {
			k1: artifact.k1,
			b: artifact.b,
			avgdl: artifact.avgdl,
			terms: artifact.terms.into_iter().collect(),
		})
	}

	pub fn encode(&self, text: &str) -> SparseVector {
		let tokens = tokenize(text);
		let length = tokens.len() as f32;
		let mut frequencies: AHashMap<String, f32> = AHashMap::new();
		for token in tokens {
			*frequencies.entry(token).or_insert(0.0) += 1.0;
		}

		let norm = self.k1 * (1.0 - self.b + self.b * length / self.avgdl);
		let mut weighted: Vec<(u32, f32)> = frequencies
			.into_iter()
			.filter_map(|(token, tf)| {
				let term = self.terms.get(&token)?;
				let weight = term.idf * (tf * (self.k1 + 1.0)) / (tf + norm);

				Some((term.index, weight))
			})
			.collect();

		weighted.sort_by_key(|(index, _)| *index);

		let (indices, values) = weighted.into_iter().unzip();

		SparseVector { indices, values }
	}
}

fn tokenize(text: &str) -> Vec<String> {
	text.unicode_words().map(|word| word.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn artifact() -> Bm25Artifact {
		Bm25Artifact {
			k1: 1.2,
			b: 0.75,
			avgdl: 4.0,
			terms: HashMap::from([
				("pcar".to_string(), Bm25Term { index: 0, idf: 2.0 }),
				("part".to_string(), Bm25Term { index: 1, idf: 1.0 }),
			]),
		}
	}

	#[test]
	fn repeated_terms_weigh_more_than_single_terms() {
		let encoder = Bm25Encoder::from_artifact(artifact()).unwrap();
		let sparse = encoder.encode("PCAR Part PCAR");

		assert_eq!(sparse.indices, vec![0, 1]);
		assert!(sparse.values[0] > sparse.values[1]);
		assert!(sparse.values[1] > 0.0);
	}

	#[test]
	fn weights_follow_the_bm25_saturation_curve() {
		let encoder = Bm25Encoder::from_artifact(artifact()).unwrap();
		let sparse = encoder.encode("PCAR Part PCAR");

		// Three tokens: tf(pcar) = 2, tf(part) = 1.
		let norm = 1.2 * (1.0 - 0.75 + 0.75 * 3.0 / 4.0);
		let expected_pcar = 2.0 * (2.0 * 2.2) / (2.0 + norm);
		let expected_part = 1.0 * (1.0 * 2.2) / (1.0 + norm);

		assert!((sparse.values[0] - expected_pcar).abs() < 1e-6);
		assert!((sparse.values[1] - expected_part).abs() < 1e-6);
	}

	#[test]
	fn unknown_terms_encode_to_empty() {
		let encoder = Bm25Encoder::from_artifact(artifact()).unwrap();

		assert!(encoder.encode("completely unrelated words").is_empty());
	}

	#[test]
	fn tokenization_lowercases_and_splits_on_word_bounds() {
		assert_eq!(tokenize("PCAR, Part 8.2!"), vec!["pcar", "part", "8.2"]);
	}

	#[test]
	fn empty_vocabulary_is_rejected() {
		let artifact = Bm25Artifact { k1: 1.2, b: 0.75, avgdl: 4.0, terms: HashMap::new() };

		assert!(Bm25Encoder::from_artifact(artifact).is_err());
	}
}
