//! Verdict Core - Core types and definitions for the Verdict decision engine
//!
//! This crate provides the fundamental types used across the Verdict ecosystem:
//! - FEEL value types (numbers, dates, times, durations, lists, contexts)
//! - FEEL AST (Abstract Syntax Tree) definitions
//! - Rule DSL and decision graph definitions
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigurationError, CoreError};
pub use types::{
    FeelContext, FeelDate, FeelDuration, FeelFunction, FeelNumber, FeelTime, FeelValue,
};
