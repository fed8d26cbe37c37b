pub mod indexed;

pub use indexed::{IndexedStream, Indexer};
