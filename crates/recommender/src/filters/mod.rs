//! Filter implementations for the candidate pipeline.

pub mod already_rated;

// Re-export for convenience
pub use already_rated::AlreadyRatedFilter;
