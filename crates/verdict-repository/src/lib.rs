//! Definition storage for the Verdict decision engine
//!
//! Loads rulesets and decision graph definitions by id from a directory
//! tree or from an in-memory store, keeping parsed definitions in a
//! read-through cache.
//!
//! ```no_run
//! use verdict_repository::{Repository, RepositoryConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = RepositoryConfig::file_system("definitions").build()?;
//! let (graph, _) = repo.load_decision_graph("loan_approval").await?;
//! println!("{} decisions", graph.decisions.len());
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod traits;

pub use config::{ConfigError, RepositoryConfig, RepositorySource};
pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FileSystemRepository;
pub use memory::MemoryRepository;
pub use models::{ArtifactKind, CacheStats, DOCUMENT_EXTENSIONS};
pub use traits::{CacheableRepository, Repository};
