pub mod committer;
pub mod engine;
pub mod filter;
pub mod matcher;
pub mod projector;

pub use committer::{CommitFailure, CommitReport};
pub use engine::{
    Allocation, AllocationEngine, CategoryStats, Clock, EngineConfig, FixedClock, Outcome,
    SystemClock,
};
pub use matcher::{CategoryMatcher, NormalizedLevenshtein, SimilarityScore};
pub use projector::{ContactCard, PLACEHOLDER};
