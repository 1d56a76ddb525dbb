pub mod chat;
pub mod passage;
pub mod profile;
pub mod query;

pub use chat::{ChatTurn, Role, Transcript};
pub use passage::Passage;
pub use profile::UserProfile;
pub use query::{HybridQuery, SparseVector};
