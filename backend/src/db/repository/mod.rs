//! Repository trait definitions and error types.

pub mod coverage;
pub mod error;

pub use coverage::CoverageRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
