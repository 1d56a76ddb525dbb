pub mod qdrant;

mod error;

pub use error::{Error, Result};
pub use qdrant::QdrantIndex;
