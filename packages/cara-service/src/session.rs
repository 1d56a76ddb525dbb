use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use uuid::Uuid;

use cara_domain::Transcript;

/// One conversation: the transcript plus the lock that serializes turns
/// within the session.
#[derive(Debug, Default)]
pub struct Session {
	pub transcript: tokio::sync::Mutex<Transcript>,
}

/// Process-wide mapping from session id to live session. Sessions are
/// created lazily, removed only by an explicit clear, and never expire: the
/// store is in-memory and dies with the process.
#[derive(Debug, Default)]
pub struct SessionStore {
	sessions: Mutex<AHashMap<Uuid, Arc<Session>>>,
}
impl SessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the live session for a known id; an absent or unknown id
	/// allocates a fresh identifier with an empty transcript.
	pub fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<Session>) {
		let mut sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(id) = id
			&& let Some(session) = sessions.get(&id)
		{
			return (id, session.clone());
		}

		let id = Uuid::new_v4();
		let session = Arc::new(Session::default());

		sessions.insert(id, session.clone());

		(id, session)
	}

	pub fn get(&self, id: Uuid) -> Option<Arc<Session>> {
		let sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		sessions.get(&id).cloned()
	}

	/// Removes the session entirely. A later turn carrying the same id is
	/// treated as unknown and gets a brand-new session.
	pub fn clear(&self, id: Uuid) -> bool {
		let mut sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		sessions.remove(&id).is_some()
	}

	pub fn len(&self) -> usize {
		let sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_id_returns_the_same_session() {
		let store = SessionStore::new();
		let (id, session) = store.get_or_create(None);
		let (again_id, again) = store.get_or_create(Some(id));

		assert_eq!(again_id, id);
		assert!(Arc::ptr_eq(&session, &again));
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn unknown_id_allocates_a_fresh_identifier() {
		let store = SessionStore::new();
		let unknown = Uuid::new_v4();
		let (id, _session) = store.get_or_create(Some(unknown));

		assert_ne!(id, unknown);
		assert!(store.get(unknown).is_none());
		assert!(store.get(id).is_some());
	}

	#[test]
	fn clear_removes_the_session_entirely() {
		let store = SessionStore::new();
		let (id, _session) = store.get_or_create(None);

		assert!(store.clear(id));
		assert!(!store.clear(id));
		assert!(store.get(id).is_none());
		assert!(store.is_empty());
	}

	#[tokio::test]
	async fn a_held_transcript_lock_rejects_a_second_turn() {
		let store = SessionStore::new();
		let (_id, session) = store.get_or_create(None);
		let _guard = session.transcript.try_lock().expect("first lock must succeed");

		assert!(session.transcript.try_lock().is_err());
	}
}
