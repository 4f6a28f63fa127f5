//! Verdict decision engine SDK
//!
//! An [`Agent`] runs a set of evaluators (rule engines, decision graph
//! decisions, or custom [`Evaluator`]s) against one input context and folds
//! their evaluations into a single auditable [`Decision`] with a pluggable
//! [`ScoringStrategy`].
//!
//! ```rust,ignore
//! use verdict_sdk::{Agent, Context};
//!
//! let agent = Agent::builder("checkout")
//!     .with_ruleset_source(FRAUD_RULES)?
//!     .build()
//!     .await?;
//! let decision = agent.decide_json(&serde_json::json!({"amount": 1200}))?;
//! println!("{} {:.2} {}", decision.decision(), decision.confidence(), decision.audit_hash());
//! ```

pub mod agent;
pub mod audit;
pub mod builder;
pub mod config;
pub mod decision;
pub mod error;
pub mod logging;
pub mod scoring;

pub use agent::Agent;
pub use audit::{
    AuditHasher, AuditSink, NoopAuditSink, TracingAuditSink, DEFAULT_AUDIT_CACHE_CAPACITY,
};
pub use builder::AgentBuilder;
pub use config::{AgentConfig, AuditSinkKind, GraphDecisionRef};
pub use decision::Decision;
pub use error::{Result, SdkError};
pub use scoring::{
    strategy_from_name, MajorityVote, MaxWeight, Score, ScoringStrategy, WeightedAverage,
    STRATEGY_NAMES,
};

// Re-export commonly used types from dependencies
pub use verdict_repository::{
    FileSystemRepository, MemoryRepository, Repository, RepositoryConfig,
};
pub use verdict_runtime::{
    Context, DecisionGraph, DecisionGraphEvaluator, Evaluation, Evaluator, RuleEngine,
};
