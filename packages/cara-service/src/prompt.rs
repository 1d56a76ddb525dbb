use serde_json::{Value, json};

use cara_domain::{Passage, Transcript, UserProfile};

pub const REWRITE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which can \
be understood without the chat history. Do NOT answer the question, just reformulate it if \
needed and otherwise return it as is.";

pub const ENTHUSIAST_SYSTEM_PROMPT: &str = "You are Cara, an AI assistant specializing in \
Philippine civil aviation queries. Use the provided context to answer the user's question in \
plain language. Keep your response concise, limited to three sentences if possible. If the \
answer is not in the context, just say that you don't know and ask to provide more information \
or ask aviation-related queries only, but do not repeatedly ask for more questions or \
clarifications. You can still provide general information if the question is not tailored to \
the context. When addressing queries directly answered by the context, mention \"According to \
PCAR\" or a similar phrase, ensuring that \"PCAR\" is highlighted, but do not mention it for \
general questions that are not specifically tailored to the context. Capitalize all \
abbreviations you use.\n\n{context}";

pub const EXPERT_SYSTEM_PROMPT: &str = "You are Cara, an AI assistant for aviation \
professionals working with the Philippine Civil Aviation Regulations. Treat the abbreviations \
PCAR and CAR as referring to the same regulations. Use the provided context to answer the \
user's question exhaustively; completeness matters more than brevity. If the answer is not in \
the context, just say that you don't know and ask to provide more information or ask \
aviation-related queries only, but do not repeatedly ask for more questions or clarifications. \
You can still provide general information if the question is not tailored to the context. When \
addressing queries directly answered by the context, mention \"According to PCAR\" or a \
similar phrase, ensuring that \"PCAR\" is highlighted, but do not mention it for general \
questions that are not specifically tailored to the context. Capitalize all abbreviations you \
use. End every context-grounded answer with a line starting with \"Sources:\" naming the \
regulation part or section each statement came from.\n\n{context}";

pub fn system_prompt(profile: UserProfile, passages: &[Passage]) -> String {
	let template = match profile {
		UserProfile::Expert => EXPERT_SYSTEM_PROMPT,
		UserProfile::Enthusiast => ENTHUSIAST_SYSTEM_PROMPT,
	};

	template.replace("{context}", &context_block(passages))
}

/// Passage texts in retrieved order, the block the templates substitute.
fn context_block(passages: &[Passage]) -> String {
	passages.iter().map(|passage| passage.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Completion message list: system instruction, prior turns in order, then
/// the latest utterance as the final user message.
pub fn chat_messages(system: &str, transcript: &Transcript, utterance: &str) -> Vec<Value> {
	let mut messages = Vec::with_capacity(transcript.len() + 2);

	messages.push(json!({ "role": "system", "content": system }));
	for turn in transcript.turns() {
		messages.push(json!({ "role": turn.role.as_str(), "content": turn.text }));
	}
	messages.push(json!({ "role": "user", "content": utterance }));

	messages
}

#[cfg(test)]
mod tests {
	use super::*;

	fn passages() -> Vec<Passage> {
		vec![
			Passage { text: "PCAR governs...".to_string(), source: "Part 1".to_string(), score: 0.9 },
			Passage { text: "Part 5 covers...".to_string(), source: "Part 5".to_string(), score: 0.4 },
		]
	}

	#[test]
	fn profiles_select_different_templates() {
		let passages = passages();
		let expert = system_prompt(UserProfile::Expert, &passages);
		let enthusiast = system_prompt(UserProfile::Enthusiast, &passages);

		assert_ne!(expert, enthusiast);
		assert!(expert.contains("Sources:"));
		assert!(expert.contains("PCAR and CAR"));
		assert!(enthusiast.contains("three sentences"));
	}

	#[test]
	fn context_is_substituted_in_retrieved_order() {
		let prompt = system_prompt(UserProfile::Enthusiast, &passages());

		assert!(!prompt.contains("{context}"));
		assert!(prompt.contains("PCAR governs...\n\nPart 5 covers..."));
	}

	#[test]
	fn messages_carry_system_history_and_utterance_in_order() {
		let mut transcript = Transcript::new();

		transcript.push_exchange("What is PCAR?", "According to PCAR, it governs civil aviation.");

		let messages = chat_messages("instruction", &transcript, "What about Part 5?");
		let roles: Vec<&str> =
			messages.iter().map(|message| message["role"].as_str().unwrap()).collect();

		assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
		assert_eq!(messages[0]["content"], "instruction");
		assert_eq!(messages[3]["content"], "What about Part 5?");
	}
}
