use std::{
	collections::{HashMap, VecDeque},
	path::PathBuf,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre::eyre;
use serde_json::{Map, Value};
use tokio::sync::Semaphore;

use cara_config::{
	CompletionProviderConfig, Config, EmbeddingProviderConfig, Index, Lexical, Providers, Service,
};
use cara_domain::{HybridQuery, Passage};
use cara_providers::lexical::{Bm25Artifact, Bm25Encoder, Bm25Term};
use cara_service::{BoxFuture, CompletionProvider, EmbeddingProvider, SearchIndex};

pub fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		index: Index {
			url: "http://localhost:6334".to_string(),
			api_key: None,
			collection: "pcar_passages_test".to_string(),
			vector_dim: 4,
			top_k: 4,
			candidate_k: 8,
			alpha: 0.5,
			timeout_ms: 1_000,
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				api_base: "http://localhost".to_string(),
				api_key: "embed-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "all-MiniLM-L6-v2".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			completion: CompletionProviderConfig {
				api_base: "http://localhost".to_string(),
				api_key: "completion-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "gpt-4o-mini".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		lexical: Lexical { artifact: PathBuf::from("unused-in-tests.json") },
	}
}

/// Small corpus vocabulary so lexical encoding stays deterministic in tests.
pub fn bm25_encoder() -> Bm25Encoder {
	let artifact = Bm25Artifact {
		k1: 1.2,
		b: 0.75,
		avgdl: 6.0,
		terms: HashMap::from([
			("pcar".to_string(), Bm25Term { index: 0, idf: 2.0 }),
			("part".to_string(), Bm25Term { index: 1, idf: 1.2 }),
			("aircraft".to_string(), Bm25Term { index: 2, idf: 1.5 }),
			("airworthiness".to_string(), Bm25Term { index: 3, idf: 1.8 }),
			("licensing".to_string(), Bm25Term { index: 4, idf: 1.6 }),
		]),
	};

	Bm25Encoder::from_artifact(artifact).expect("test artifact must be valid")
}

pub fn passage(text: &str, source: &str, score: f32) -> Passage {
	Passage { text: text.to_string(), source: source.to_string(), score }
}

/// Embedding double: fixed-dimension zero-ish vectors, records every text it
/// was asked to embed so tests can assert what the retriever searched for.
pub struct CountingEmbedding {
	dimensions: usize,
	queries: Mutex<Vec<String>>,
}
impl CountingEmbedding {
	pub fn new(dimensions: usize) -> Self {
		Self { dimensions, queries: Mutex::new(Vec::new()) }
	}

	pub fn calls(&self) -> usize {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn queries(&self) -> Vec<String> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl EmbeddingProvider for CountingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			let mut queries = self.queries.lock().unwrap_or_else(|err| err.into_inner());

			queries.extend(texts.iter().cloned());

			Ok(vec![vec![0.1; self.dimensions]; texts.len()])
		})
	}
}

/// Completion double: pops queued replies in order, records every request's
/// full message payload. Running out of replies is an error, which makes an
/// unexpected extra completion call fail the test loudly.
pub struct ScriptedCompletion {
	replies: Mutex<VecDeque<String>>,
	requests: Mutex<Vec<Vec<Value>>>,
}
impl ScriptedCompletion {
	pub fn new<I, S>(replies: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
			requests: Mutex::new(Vec::new()),
		}
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn requests(&self) -> Vec<Vec<Value>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	/// The system message content of the nth recorded request.
	pub fn system_prompt(&self, call: usize) -> Option<String> {
		let requests = self.requests.lock().unwrap_or_else(|err| err.into_inner());

		requests
			.get(call)?
			.first()?
			.get("content")
			.and_then(|content| content.as_str())
			.map(|content| content.to_string())
	}
}
impl CompletionProvider for ScriptedCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a CompletionProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move {
			{
				let mut requests = self.requests.lock().unwrap_or_else(|err| err.into_inner());

				requests.push(messages.to_vec());
			}

			let mut replies = self.replies.lock().unwrap_or_else(|err| err.into_inner());

			replies.pop_front().ok_or_else(|| eyre!("Completion script is exhausted."))
		})
	}
}

/// Completion double that parks every call until a permit is released,
/// holding the session's turn lock open for contention tests.
pub struct GatedCompletion {
	permits: Semaphore,
	attempts: AtomicUsize,
	replies: Mutex<VecDeque<String>>,
}
impl GatedCompletion {
	pub fn new<I, S>(replies: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			permits: Semaphore::new(0),
			attempts: AtomicUsize::new(0),
			replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
		}
	}

	pub fn release(&self, calls: usize) {
		self.permits.add_permits(calls);
	}

	/// Calls that have reached the gate, parked or not.
	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::SeqCst)
	}
}
impl CompletionProvider for GatedCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a CompletionProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move {
			self.attempts.fetch_add(1, Ordering::SeqCst);

			let permit =
				self.permits.acquire().await.map_err(|_| eyre!("Completion gate is closed."))?;

			permit.forget();

			let mut replies = self.replies.lock().unwrap_or_else(|err| err.into_inner());

			replies.pop_front().ok_or_else(|| eyre!("Completion script is exhausted."))
		})
	}
}

pub struct FailingCompletion;
impl CompletionProvider for FailingCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a CompletionProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Err(eyre!("Completion backend is unreachable.")) })
	}
}

/// Index double returning a fixed passage list, recording every query.
pub struct StaticIndex {
	passages: Vec<Passage>,
	queries: Mutex<Vec<HybridQuery>>,
}
impl StaticIndex {
	pub fn new(passages: Vec<Passage>) -> Self {
		Self { passages, queries: Mutex::new(Vec::new()) }
	}

	pub fn calls(&self) -> usize {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn queries(&self) -> Vec<HybridQuery> {
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl SearchIndex for StaticIndex {
	fn query<'a>(&'a self, query: HybridQuery) -> BoxFuture<'a, color_eyre::Result<Vec<Passage>>> {
		Box::pin(async move {
			let mut queries = self.queries.lock().unwrap_or_else(|err| err.into_inner());

			queries.push(query);

			Ok(self.passages.clone())
		})
	}
}

pub struct FailingIndex;
impl SearchIndex for FailingIndex {
	fn query<'a>(&'a self, _query: HybridQuery) -> BoxFuture<'a, color_eyre::Result<Vec<Passage>>> {
		Box::pin(async move { Err(eyre!("Index backend is unreachable.")) })
	}
}
