pub mod coverage;
pub mod macros;
pub mod pagination;
pub mod pattern;

pub use coverage::*;
pub use pagination::*;
pub use pattern::ilike;
