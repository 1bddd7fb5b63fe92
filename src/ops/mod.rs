//! High-level operations.

pub mod substitute;
pub mod workflow;

pub use substitute::{DependencySubstitutor, BOOTSTRAP_REPOSITORY, KOTLIN_GROUP};
pub use workflow::WorkflowGenerator;
