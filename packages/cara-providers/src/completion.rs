use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// One chat-completion round trip. The caller supplies the full message
/// list (system instruction, prior turns, latest user message); sampling
/// temperature comes from configuration. Failures are not retried here.
pub async fn complete(
	cfg: &cara_config::CompletionProviderConfig,
	messages: &[Value],
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_text(json)
}

fn parse_completion_text(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|content| content.as_str())
		.map(|content| content.to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "According to PCAR, yes." } },
				{ "message": { "content": "ignored" } }
			]
		});

		assert_eq!(parse_completion_text(json).expect("parse failed"), "According to PCAR, yes.");
	}

	#[test]
	fn missing_content_is_an_error() {
		let json = serde_json::json!({ "choices": [ { "message": {} } ] });

		assert!(parse_completion_text(json).is_err());
	}
}
