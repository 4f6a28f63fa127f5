//! Scoring strategies that fold evaluator outputs into one decision

use crate::error::{Result, SdkError};
use std::fmt;
use std::sync::Arc;
use verdict_runtime::Evaluation;

/// Winning decision and its confidence in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub decision: String,
    pub confidence: f64,
}

impl Score {
    fn new(decision: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            decision: decision.into(),
            confidence,
        }
    }
}

/// Pluggable aggregation over the evaluations of one request
///
/// Implementations return `None` only for an empty slice.
pub trait ScoringStrategy: Send + Sync + fmt::Debug {
    /// Name recorded in the audit payload
    fn name(&self) -> &str;

    fn score(&self, evaluations: &[Evaluation]) -> Option<Score>;
}

/// Per-decision tallies in first-seen order
struct Tally<'a> {
    decision: &'a str,
    weight: f64,
    votes: usize,
}

fn tally(evaluations: &[Evaluation]) -> Vec<Tally<'_>> {
    let mut tallies: Vec<Tally<'_>> = Vec::new();
    for evaluation in evaluations {
        match tallies
            .iter_mut()
            .find(|t| t.decision == evaluation.decision())
        {
            Some(entry) => {
                entry.weight += evaluation.weight();
                entry.votes += 1;
            }
            None => tallies.push(Tally {
                decision: evaluation.decision(),
                weight: evaluation.weight(),
                votes: 1,
            }),
        }
    }
    tallies
}

/// Decision with the largest summed weight
///
/// Confidence is the winner's share of the total weight. Ties go to the
/// decision seen first. When every weight is zero the first evaluation
/// wins with confidence 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedAverage;

impl ScoringStrategy for WeightedAverage {
    fn name(&self) -> &str {
        "weighted_average"
    }

    fn score(&self, evaluations: &[Evaluation]) -> Option<Score> {
        let tallies = tally(evaluations);
        let total: f64 = tallies.iter().map(|t| t.weight).sum();
        let mut best = tallies.first()?;
        for candidate in &tallies[1..] {
            if candidate.weight > best.weight {
                best = candidate;
            }
        }
        if total <= 0.0 {
            return Some(Score::new(best.decision, 0.0));
        }
        Some(Score::new(best.decision, best.weight / total))
    }
}

/// Single most confident evaluation wins with its own weight
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxWeight;

impl ScoringStrategy for MaxWeight {
    fn name(&self) -> &str {
        "max_weight"
    }

    fn score(&self, evaluations: &[Evaluation]) -> Option<Score> {
        let mut best = evaluations.first()?;
        for candidate in &evaluations[1..] {
            if candidate.weight() > best.weight() {
                best = candidate;
            }
        }
        Some(Score::new(best.decision(), best.weight()))
    }
}

/// Most frequent decision; confidence is its share of the votes
///
/// Equal vote counts are broken by summed weight, then by first appearance.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVote;

impl ScoringStrategy for MajorityVote {
    fn name(&self) -> &str {
        "majority_vote"
    }

    fn score(&self, evaluations: &[Evaluation]) -> Option<Score> {
        let tallies = tally(evaluations);
        let mut best = tallies.first()?;
        for candidate in &tallies[1..] {
            let more_votes = candidate.votes > best.votes;
            let heavier = candidate.votes == best.votes && candidate.weight > best.weight;
            if more_votes || heavier {
                best = candidate;
            }
        }
        Some(Score::new(
            best.decision,
            best.votes as f64 / evaluations.len() as f64,
        ))
    }
}

/// Names accepted by [`strategy_from_name`]
pub const STRATEGY_NAMES: [&str; 3] = ["weighted_average", "max_weight", "majority_vote"];

/// Built-in strategy by name
pub fn strategy_from_name(name: &str) -> Result<Arc<dyn ScoringStrategy>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "weighted_average" => Ok(Arc::new(WeightedAverage)),
        "max_weight" => Ok(Arc::new(MaxWeight)),
        "majority_vote" => Ok(Arc::new(MajorityVote)),
        _ => Err(SdkError::UnknownStrategy(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(decision: &str, weight: f64) -> Evaluation {
        Evaluation::new(decision, weight, "")
    }

    #[test]
    fn test_weighted_average() {
        let evaluations = vec![eval("deny", 0.9), eval("approve", 0.6), eval("deny", 0.3)];
        let score = WeightedAverage.score(&evaluations).unwrap();
        assert_eq!(score.decision, "deny");
        assert!((score.confidence - 1.2 / 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_average_all_zero() {
        let evaluations = vec![eval("review", 0.0), eval("deny", 0.0)];
        let score = WeightedAverage.score(&evaluations).unwrap();
        assert_eq!(score, Score::new("review", 0.0));
    }

    #[test]
    fn test_max_weight() {
        let evaluations = vec![eval("approve", 0.4), eval("deny", 0.8), eval("review", 0.8)];
        let score = MaxWeight.score(&evaluations).unwrap();
        assert_eq!(score.decision, "deny");
        assert_eq!(score.confidence, 0.8);
    }

    #[test]
    fn test_majority_vote_ties_break_on_weight() {
        let evaluations = vec![
            eval("approve", 0.2),
            eval("deny", 0.5),
            eval("approve", 0.2),
            eval("deny", 0.5),
        ];
        let score = MajorityVote.score(&evaluations).unwrap();
        assert_eq!(score.decision, "deny");
        assert_eq!(score.confidence, 0.5);
    }

    #[test]
    fn test_empty_input() {
        assert!(WeightedAverage.score(&[]).is_none());
        assert!(MaxWeight.score(&[]).is_none());
        assert!(MajorityVote.score(&[]).is_none());
    }

    #[test]
    fn test_strategy_from_name() {
        for name in STRATEGY_NAMES {
            assert_eq!(strategy_from_name(name).unwrap().name(), name);
        }
        assert_eq!(
            strategy_from_name(" Max_Weight ").unwrap().name(),
            "max_weight"
        );
        assert!(matches!(
            strategy_from_name("median"),
            Err(SdkError::UnknownStrategy(_))
        ));
    }
}
