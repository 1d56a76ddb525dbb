use cara_domain::Transcript;

use crate::{CaraService, Error, Result, prompt};

impl CaraService {
	/// Resolves a follow-up into a standalone query. An empty history needs
	/// no resolution, so the utterance passes through without a completion
	/// call.
	pub(crate) async fn rewrite_query(
		&self,
		transcript: &Transcript,
		utterance: &str,
	) -> Result<String> {
		if transcript.is_empty() {
			return Ok(utterance.to_string());
		}

		let messages = prompt::chat_messages(prompt::REWRITE_SYSTEM_PROMPT, transcript, utterance);

		self.providers
			.completion
			.complete(&self.cfg.providers.completion, &messages)
			.await
			.map_err(|err| Error::RewriteFailed { message: err.to_string() })
	}
}
