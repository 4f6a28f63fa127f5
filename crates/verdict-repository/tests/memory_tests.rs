//! Integration tests for MemoryRepository

use std::sync::Arc;
use verdict_repository::{
    ArtifactKind, CacheableRepository, MemoryRepository, Repository, RepositoryError,
};

const GRAPH_JSON: &str = r#"{
  "name": "pricing",
  "decisions": [
    {"id": "base", "literal": "100"},
    {"id": "total", "dependencies": ["base"], "literal": "base * 1.2"}
  ]
}"#;

#[tokio::test]
async fn test_load_registered_graph() {
    let repo = MemoryRepository::new().with_decision_graph("pricing", GRAPH_JSON);

    let (graph, content) = repo.load_decision_graph("pricing").await.unwrap();
    assert_eq!(graph.name, "pricing");
    assert_eq!(graph.decisions.len(), 2);
    assert_eq!(content, GRAPH_JSON);
    assert!(repo
        .exists(ArtifactKind::DecisionGraph, "pricing")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_parse_errors_surface_on_load() {
    let repo = MemoryRepository::new().with_decision_graph("bad", r#"{"decisions": "x"}"#);
    let err = repo.load_decision_graph("bad").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Definition { .. }));
}

#[tokio::test]
async fn test_rejects_path_like_ids() {
    let repo = MemoryRepository::new();
    let err = repo
        .put(ArtifactKind::Ruleset, "a/b", r#"{"ruleset": "x", "rules": []}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidIdentifier(_)));
}

#[tokio::test]
async fn test_shared_across_tasks() {
    let repo = Arc::new(MemoryRepository::new().with_decision_graph("pricing", GRAPH_JSON));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.load_decision_graph("pricing").await.map(|(g, _)| g) })
        })
        .collect();
    for handle in handles {
        let graph = handle.await.unwrap().unwrap();
        assert_eq!(graph.name, "pricing");
    }

    let stats = repo.cache_stats().await;
    assert_eq!(stats.hits + stats.misses, 8);
    assert_eq!(stats.size, 1);

    repo.clear_cache().await;
    assert_eq!(repo.cache_stats().await.size, 0);
}
