//! Input data context
//!
//! An immutable snapshot of request data, built once and shared read-only by
//! every evaluator that looks at it.

mod field_lookup;
mod snapshot;

pub use snapshot::Context;
