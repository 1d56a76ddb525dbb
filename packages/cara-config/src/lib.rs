mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CompletionProviderConfig, Config, EmbeddingProviderConfig, Index, Lexical, Providers, Service,
};

use std::{env, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg)?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.index.url.trim().is_empty() {
		return Err(Error::Validation { message: "index.url must be non-empty.".to_string() });
	}
	if cfg.index.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "index.collection must be non-empty.".to_string(),
		});
	}
	if cfg.index.vector_dim == 0 {
		return Err(Error::Validation {
			message: "index.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.index.top_k == 0 {
		return Err(Error::Validation {
			message: "index.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.index.candidate_k < cfg.index.top_k {
		return Err(Error::Validation {
			message: "index.candidate_k must be at least index.top_k.".to_string(),
		});
	}
	if !cfg.index.alpha.is_finite() || !(0.0..=1.0).contains(&cfg.index.alpha) {
		return Err(Error::Validation {
			message: "index.alpha must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.index.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match index.vector_dim.".to_string(),
		});
	}
	if !cfg.providers.completion.temperature.is_finite()
		|| cfg.providers.completion.temperature < 0.0
	{
		return Err(Error::Validation {
			message: "providers.completion.temperature must be zero or greater.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("index", cfg.index.timeout_ms),
		("providers.embedding", cfg.providers.embedding.timeout_ms),
		("providers.completion", cfg.providers.completion.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	// Required credentials are a startup failure, never a first-use failure.
	for (label, key) in [
		("providers.embedding", &cfg.providers.embedding.api_key),
		("providers.completion", &cfg.providers.completion.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("{label}.api_key must be non-empty."),
			});
		}
	}

	if let Some(key) = cfg.index.api_key.as_ref()
		&& key.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "index.api_key must be non-empty when present.".to_string(),
		});
	}
	if cfg.lexical.artifact.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "lexical.artifact must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) -> Result<()> {
	cfg.providers.embedding.api_key =
		resolve_credential("providers.embedding.api_key", &cfg.providers.embedding.api_key)?;
	cfg.providers.completion.api_key =
		resolve_credential("providers.completion.api_key", &cfg.providers.completion.api_key)?;

	if let Some(key) = cfg.index.api_key.as_ref() {
		cfg.index.api_key = Some(resolve_credential("index.api_key", key)?);
	}

	Ok(())
}

/// Credential fields may hold a `${VAR}` placeholder instead of a literal
/// secret so the secret itself stays out of the config file.
fn resolve_credential(field: &str, value: &str) -> Result<String> {
	let Some(name) = value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) else {
		return Ok(value.to_string());
	};

	match env::var(name) {
		Ok(resolved) if !resolved.trim().is_empty() => Ok(resolved),
		_ => Err(Error::Validation {
			message: format!("{field} references environment variable {name}, which is unset."),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"
		[service]
		http_bind = "127.0.0.1:8080"
		log_level = "info"

		[index]
		url         = "http://localhost:6334"
		collection  = "pcar_passages_v1"
		vector_dim  = 384
		top_k       = 4
		candidate_k = 20
		alpha       = 0.5
		timeout_ms  = 10000

		[providers.embedding]
		api_base   = "https://api.example.com"
		api_key    = "embed-key"
		path       = "/v1/embeddings"
		model      = "all-MiniLM-L6-v2"
		dimensions = 384
		timeout_ms = 10000

		[providers.completion]
		api_base    = "https://api.example.com"
		api_key     = "completion-key"
		path        = "/v1/chat/completions"
		model       = "gpt-4o-mini"
		temperature = 0.0
		timeout_ms  = 30000

		[lexical]
		artifact = "datas/bm25_pcar.json"
	"#;

	fn sample() -> Config {
		toml::from_str(SAMPLE).expect("sample config must parse")
	}

	#[test]
	fn sample_config_validates() {
		let mut cfg = sample();

		normalize(&mut cfg).unwrap();
		validate(&cfg).unwrap();
	}

	#[test]
	fn alpha_outside_unit_interval_is_rejected() {
		let mut cfg = sample();

		cfg.index.alpha = 1.5;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn candidate_pool_smaller_than_top_k_is_rejected() {
		let mut cfg = sample();

		cfg.index.candidate_k = 2;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn dimension_mismatch_is_rejected() {
		let mut cfg = sample();

		cfg.providers.embedding.dimensions = 768;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn blank_completion_credential_is_rejected() {
		let mut cfg = sample();

		cfg.providers.completion.api_key = "  ".to_string();

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn placeholder_resolves_from_environment() {
		// SAFETY: tests in this module do not race on this variable.
		unsafe { env::set_var("CARA_TEST_COMPLETION_KEY", "resolved-key") };

		let resolved =
			resolve_credential("providers.completion.api_key", "${CARA_TEST_COMPLETION_KEY}")
				.unwrap();

		assert_eq!(resolved, "resolved-key");
	}

	#[test]
	fn unset_placeholder_fails_at_load() {
		let err =
			resolve_credential("providers.completion.api_key", "${CARA_TEST_MISSING_KEY}")
				.unwrap_err();

		assert!(err.to_string().contains("CARA_TEST_MISSING_KEY"));
	}

	#[test]
	fn literal_credential_passes_through() {
		let resolved = resolve_credential("index.api_key", "literal-key").unwrap();

		assert_eq!(resolved, "literal-key");
	}
}
