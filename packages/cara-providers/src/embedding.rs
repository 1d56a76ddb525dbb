use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

pub async fn embed(
	cfg: &cara_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let response: EmbeddingResponse = res.error_for_status()?.json().await?;

	if response.data.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: "Embedding response row count does not match input count.".to_string(),
		});
	}

	Ok(order_embeddings(response))
}

/// Providers may return rows out of order; the `index` field, when present,
/// is authoritative.
fn order_embeddings(response: EmbeddingResponse) -> Vec<Vec<f32>> {
	let mut rows: Vec<(usize, Vec<f32>)> = response
		.data
		.into_iter()
		.enumerate()
		.map(|(fallback, row)| (row.index.unwrap_or(fallback), row.embedding))
		.collect();

	rows.sort_by_key(|(index, _)| *index);

	rows.into_iter().map(|(_, embedding)| embedding).collect()
}
