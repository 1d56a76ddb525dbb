use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub index: Index,
	pub providers: Providers,
	pub lexical: Lexical,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Index {
	pub url: String,
	/// Optional for unauthenticated local deployments. Accepts a `${VAR}`
	/// placeholder resolved from the environment at load time.
	pub api_key: Option<String>,
	pub collection: String,
	pub vector_dim: u32,
	pub top_k: u32,
	/// Candidate pool fetched per retrieval arm before fusion.
	pub candidate_k: u32,
	/// Convex weight on the dense arm; the lexical arm gets `1 - alpha`.
	pub alpha: f32,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub completion: CompletionProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Lexical {
	/// Precomputed corpus term-statistics artifact consumed by the BM25
	/// encoder.
	pub artifact: PathBuf,
}
