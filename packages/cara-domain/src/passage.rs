use serde::{Deserialize, Serialize};

/// A retrieved chunk of regulation text with its origin locator and fused
/// relevance score. Owned transiently by a single retrieval call; never
/// cached across turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
	pub text: String,
	/// Part/section locator within the regulations, e.g. "Part 8.2.1".
	pub source: String,
	pub score: f32,
}
