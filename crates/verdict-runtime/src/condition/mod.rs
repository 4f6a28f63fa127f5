//! Condition evaluation (operator dispatch engine)
//!
//! Evaluates `{field, op, value}` predicates and `all`/`any` groups against a
//! [`Context`](crate::context::Context). Operators are grouped into nine
//! categories offered each operator in a fixed order; the first category that
//! owns it decides. An operator no category owns evaluates to `false`.

mod cache;
mod dispatch;
mod evaluator;
mod operators;

pub use cache::{CacheStats, ConditionCaches, MemoCache};
pub use dispatch::{Dispatch, OperatorCategory};
pub use evaluator::ConditionEvaluator;
pub use operators::geo::{haversine_distance, point_in_polygon, GeoPoint, EARTH_RADIUS_KM};
