use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant,
}
impl Role {
	/// Wire string used both in serialized transcripts and in completion
	/// request message roles.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Assistant => "assistant",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
	pub role: Role,
	pub text: String,
}
impl ChatTurn {
	pub fn user(text: impl Into<String>) -> Self {
		Self { role: Role::User, text: text.into() }
	}

	pub fn assistant(text: impl Into<String>) -> Self {
		Self { role: Role::Assistant, text: text.into() }
	}
}

/// Ordered conversation history for one session.
///
/// Turns strictly alternate roles starting with `user`. The only way to grow
/// a transcript is [`Transcript::push_exchange`], which appends a completed
/// user/assistant pair, so the invariant holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
	turns: Vec<ChatTurn>,
}
impl Transcript {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.turns.is_empty()
	}

	pub fn len(&self) -> usize {
		self.turns.len()
	}

	pub fn turns(&self) -> &[ChatTurn] {
		&self.turns
	}

	pub fn push_exchange(&mut self, utterance: impl Into<String>, answer: impl Into<String>) {
		self.turns.push(ChatTurn::user(utterance));
		self.turns.push(ChatTurn::assistant(answer));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exchanges_alternate_roles_starting_with_user() {
		let mut transcript = Transcript::new();

		transcript.push_exchange("What is PCAR?", "PCAR is the Philippine Civil Aviation Regulations.");
		transcript.push_exchange("What about Part 5?", "Part 5 covers airworthiness.");

		let roles: Vec<Role> = transcript.turns().iter().map(|turn| turn.role).collect();

		assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
	}

	#[test]
	fn empty_transcript_reports_empty() {
		let transcript = Transcript::new();

		assert!(transcript.is_empty());
		assert_eq!(transcript.len(), 0);
	}
}
