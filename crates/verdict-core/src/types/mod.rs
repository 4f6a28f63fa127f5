//! FEEL type system
//!
//! This module contains the runtime value types:
//! - Decimal-preserving numbers
//! - Dates, times and durations
//! - Lists, contexts and function values

pub mod number;
pub mod temporal;
pub mod value;

pub use number::FeelNumber;
pub use temporal::{FeelDate, FeelDuration, FeelTime};
pub use value::{FeelContext, FeelFunction, FeelValue};
