use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Session {session_id} already has a turn in flight.")]
	SessionBusy { session_id: Uuid },
	#[error("Retrieval backend unavailable: {message}")]
	RetrievalUnavailable { message: String },
	#[error("Query rewrite failed: {message}")]
	RewriteFailed { message: String },
	#[error("Answer generation failed: {message}")]
	GenerationFailed { message: String },
}
