use cara_domain::{Passage, Transcript, UserProfile};

use crate::{CaraService, Error, Result, prompt};

impl CaraService {
	/// Answer synthesis conditioned on retrieved context, history and the
	/// caller's profile. The response text is returned verbatim; citation
	/// discipline lives in the prompt, not in post-processing.
	pub(crate) async fn generate_answer(
		&self,
		passages: &[Passage],
		transcript: &Transcript,
		utterance: &str,
		profile: UserProfile,
	) -> Result<String> {
		let system = prompt::system_prompt(profile, passages);
		let messages = prompt::chat_messages(&system, transcript, utterance);

		self.providers
			.completion
			.complete(&self.cfg.providers.completion, &messages)
			.await
			.map_err(|err| Error::GenerationFailed { message: err.to_string() })
	}
}
