use cara_domain::{ChatTurn, Passage, Role, SparseVector, Transcript, UserProfile};

#[test]
fn turn_constructors_set_roles() {
	assert_eq!(ChatTurn::user("hi").role, Role::User);
	assert_eq!(ChatTurn::assistant("hello").role, Role::Assistant);
}

#[test]
fn role_wire_strings_match_completion_message_roles() {
	assert_eq!(Role::User.as_str(), "user");
	assert_eq!(Role::Assistant.as_str(), "assistant");
}

#[test]
fn transcript_preserves_insertion_order() {
	let mut transcript = Transcript::new();

	transcript.push_exchange("first question", "first answer");
	transcript.push_exchange("second question", "second answer");

	let texts: Vec<&str> = transcript.turns().iter().map(|turn| turn.text.as_str()).collect();

	assert_eq!(texts, vec!["first question", "first answer", "second question", "second answer"]);
}

#[test]
fn transcript_serde_round_trip() {
	let mut transcript = Transcript::new();

	transcript.push_exchange("What is PCAR?", "According to PCAR, it governs civil aviation.");

	let json = serde_json::to_string(&transcript).unwrap();
	let back: Transcript = serde_json::from_str(&json).unwrap();

	assert_eq!(back, transcript);
}

#[test]
fn passage_serializes_with_locator_and_score() {
	let passage =
		Passage { text: "PCAR governs...".to_string(), source: "Part 1".to_string(), score: 0.9 };
	let json = serde_json::to_value(&passage).unwrap();

	assert_eq!(json["source"], "Part 1");
	assert!((json["score"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[test]
fn empty_sparse_vector_reports_empty() {
	assert!(SparseVector::default().is_empty());
	assert!(!SparseVector { indices: vec![3], values: vec![0.4] }.is_empty());
}

#[test]
fn unknown_profile_string_is_rejected() {
	assert!(serde_json::from_str::<UserProfile>("\"pilot\"").is_err());
}
