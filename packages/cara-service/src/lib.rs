pub mod prompt;
pub mod session;

mod error;
mod generate;
mod retrieve;
mod rewrite;

use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use cara_config::{CompletionProviderConfig, Config, EmbeddingProviderConfig};
use cara_domain::{HybridQuery, Passage, Transcript, UserProfile};
use cara_index::QdrantIndex;
use cara_providers::{completion, embedding, lexical::Bm25Encoder};

pub use error::{Error, Result};
pub use session::{Session, SessionStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a CompletionProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

pub trait SearchIndex
where
	Self: Send + Sync,
{
	fn query<'a>(&'a self, query: HybridQuery) -> BoxFuture<'a, color_eyre::Result<Vec<Passage>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a CompletionProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Ok(completion::complete(cfg, messages).await?) })
	}
}
impl SearchIndex for QdrantIndex {
	fn query<'a>(&'a self, query: HybridQuery) -> BoxFuture<'a, color_eyre::Result<Vec<Passage>>> {
		Box::pin(async move { Ok(self.query_hybrid(&query).await?) })
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
	#[serde(default)]
	pub session_id: Option<Uuid>,
	pub utterance: String,
	#[serde(default)]
	pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
	pub session_id: Uuid,
	pub answer: String,
}

pub struct CaraService {
	pub cfg: Config,
	index: Arc<dyn SearchIndex>,
	providers: Providers,
	lexical: Bm25Encoder,
	sessions: SessionStore,
}
impl CaraService {
	pub fn new(cfg: Config, index: Arc<dyn SearchIndex>, lexical: Bm25Encoder) -> Self {
		let providers = Providers {
			embedding: Arc::new(DefaultProviders),
			completion: Arc::new(DefaultProviders),
		};

		Self::with_providers(cfg, index, lexical, providers)
	}

	pub fn with_providers(
		cfg: Config,
		index: Arc<dyn SearchIndex>,
		lexical: Bm25Encoder,
		providers: Providers,
	) -> Self {
		Self { cfg, index, providers, lexical, sessions: SessionStore::new() }
	}

	/// One user turn: rewrite, retrieve, generate, commit. The transcript is
	/// appended only after generation succeeds, so a failed turn leaves the
	/// session history untouched and the caller can retry the same
	/// utterance.
	pub async fn handle_turn(&self, req: TurnRequest) -> Result<TurnResponse> {
		if req.utterance.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "utterance must be non-empty.".to_string(),
			});
		}

		let (session_id, session) = self.sessions.get_or_create(req.session_id);
		let mut transcript =
			session.transcript.try_lock().map_err(|_| Error::SessionBusy { session_id })?;

		let standalone = self.rewrite_query(&transcript, &req.utterance).await?;
		let passages = self.search_passages(&standalone).await?;

		tracing::debug!(
			%session_id,
			profile = ?req.profile,
			passages = passages.len(),
			"Retrieved context for turn."
		);

		let answer =
			self.generate_answer(&passages, &transcript, &req.utterance, req.profile).await?;

		transcript.push_exchange(req.utterance.as_str(), answer.as_str());

		Ok(TurnResponse { session_id, answer })
	}

	/// Snapshot of a session's transcript, if the session exists. UIs that
	/// need a rendered history derive it from this projection.
	pub async fn transcript(&self, session_id: Uuid) -> Option<Transcript> {
		let session = self.sessions.get(session_id)?;
		let transcript = session.transcript.lock().await;

		Some(transcript.clone())
	}

	pub fn clear_session(&self, session_id: Uuid) -> bool {
		self.sessions.clear(session_id)
	}
}
