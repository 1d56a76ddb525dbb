use serde::{Deserialize, Serialize};

/// Closed set of audience profiles. The profile is supplied by the caller on
/// every turn and selects the answer-generation prompt variant; it is not
/// part of the session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserProfile {
	Expert,
	#[default]
	Enthusiast,
}
