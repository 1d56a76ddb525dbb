use cara_domain::{HybridQuery, Passage};

use crate::{CaraService, Error, Result};

impl CaraService {
	/// Hybrid retrieval for one standalone query: dense embedding plus
	/// lexical encoding, fused by the index client, bounded to `top_k`.
	pub(crate) async fn search_passages(&self, query: &str) -> Result<Vec<Passage>> {
		let dense = self.embed_query(query).await?;
		let sparse = self.lexical.encode(query);
		let index_cfg = &self.cfg.index;
		let hybrid = HybridQuery {
			dense,
			sparse,
			alpha: index_cfg.alpha,
			candidate_k: index_cfg.candidate_k,
			top_k: index_cfg.top_k,
		};

		self.index
			.query(hybrid)
			.await
			.map_err(|err| Error::RetrievalUnavailable { message: err.to_string() })
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&query.to_string()))
			.await
			.map_err(|err| Error::RetrievalUnavailable { message: err.to_string() })?;
		let vector = embeddings.into_iter().next().ok_or_else(|| Error::RetrievalUnavailable {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.cfg.index.vector_dim as usize {
			return Err(Error::RetrievalUnavailable {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}
