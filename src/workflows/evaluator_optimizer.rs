// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Optimizer/evaluator refinement loop.
//!
//! The optimizer produces a candidate, the evaluator rates it; below the
//! quality threshold the evaluator's feedback is folded into the next
//! optimizer prompt. The loop ends at the threshold or after the refinement
//! budget, returning the best candidate seen either way.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ExecutionError;
use crate::observability::messages::workflow::RefinementBelowThreshold;

use super::WorkflowNode;

/// Evaluation rating scale, ordered worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl FromStr for QualityRating {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POOR" => Ok(QualityRating::Poor),
            "FAIR" => Ok(QualityRating::Fair),
            "GOOD" => Ok(QualityRating::Good),
            "EXCELLENT" => Ok(QualityRating::Excellent),
            _ => Err(()),
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityRating::Poor => "POOR",
            QualityRating::Fair => "FAIR",
            QualityRating::Good => "GOOD",
            QualityRating::Excellent => "EXCELLENT",
        };
        write!(f, "{label}")
    }
}

/// Result of one refinement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOutcome {
    pub response: String,
    pub iterations: u32,
    pub best_rating: QualityRating,
    pub met_threshold: bool,
}

pub struct EvaluatorOptimizer {
    name: String,
    optimizer: Arc<dyn WorkflowNode>,
    evaluator: Arc<dyn WorkflowNode>,
    min_rating: QualityRating,
    max_refinements: u32,
}

impl EvaluatorOptimizer {
    pub fn new(
        name: impl Into<String>,
        optimizer: Arc<dyn WorkflowNode>,
        evaluator: Arc<dyn WorkflowNode>,
        min_rating: QualityRating,
        max_refinements: u32,
    ) -> Self {
        EvaluatorOptimizer {
            name: name.into(),
            optimizer,
            evaluator,
            min_rating,
            // A loop that never runs is useless; floor the budget at one.
            max_refinements: max_refinements.max(1),
        }
    }

    /// Run the full loop and report the outcome, including whether the
    /// threshold was actually met.
    pub async fn refine(&self, message: &str) -> Result<RefinementOutcome, ExecutionError> {
        let mut best: Option<(String, QualityRating)> = None;
        let mut feedback = String::new();

        for iteration in 1..=self.max_refinements {
            let mut optimizer_input = String::new();
            optimizer_input.push_str(message);
            if !feedback.is_empty() {
                optimizer_input.push_str("\n\nEvaluator feedback on the previous attempt:\n");
                optimizer_input.push_str(&feedback);
            }

            let candidate = self.optimizer.send(&optimizer_input).await?;

            let evaluator_input = format!(
                "Task: {message}\n\nCandidate response:\n{candidate}\n\n\
                 Rate the candidate as one of POOR, FAIR, GOOD, EXCELLENT \
                 and explain what to improve."
            );
            let evaluation = self.evaluator.send(&evaluator_input).await?;
            let rating = extract_rating(&evaluation, &self.name);

            let improved = best
                .as_ref()
                .map(|(_, best_rating)| rating > *best_rating)
                .unwrap_or(true);
            if improved {
                best = Some((candidate, rating));
            }

            if rating >= self.min_rating {
                let (response, best_rating) =
                    best.unwrap_or((String::new(), QualityRating::Poor));
                return Ok(RefinementOutcome {
                    response,
                    iterations: iteration,
                    best_rating,
                    met_threshold: true,
                });
            }
            feedback = evaluation;
        }

        let (response, best_rating) = best.unwrap_or((String::new(), QualityRating::Poor));
        tracing::warn!(
            "{}",
            RefinementBelowThreshold {
                workflow: &self.name,
                iterations: self.max_refinements,
                best_rating: &best_rating.to_string(),
            }
        );
        Ok(RefinementOutcome {
            response,
            iterations: self.max_refinements,
            best_rating,
            met_threshold: false,
        })
    }
}

/// Scan the evaluation text for rating keywords and take the last one
/// mentioned, on the theory that a conclusion follows the discussion. No
/// keyword at all reads as POOR.
fn extract_rating(evaluation: &str, workflow: &str) -> QualityRating {
    let mut found: Option<(usize, QualityRating)> = None;
    for keyword in ["POOR", "FAIR", "GOOD", "EXCELLENT"] {
        if let Some(at) = evaluation.rfind(keyword) {
            let rating = match QualityRating::from_str(keyword) {
                Ok(rating) => rating,
                Err(()) => continue,
            };
            if found.map(|(best_at, _)| at > best_at).unwrap_or(true) {
                found = Some((at, rating));
            }
        }
    }
    match found {
        Some((_, rating)) => rating,
        None => {
            tracing::warn!(
                workflow,
                "evaluation contained no rating keyword, treating as POOR"
            );
            QualityRating::Poor
        }
    }
}

#[async_trait]
impl WorkflowNode for EvaluatorOptimizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<String, ExecutionError> {
        Ok(self.refine(message).await?.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CountingNode {
        name: String,
        replies: Mutex<Vec<String>>,
        calls: Mutex<u32>,
    }

    impl CountingNode {
        fn new(name: &str, replies: Vec<&str>) -> Arc<Self> {
            Arc::new(CountingNode {
                name: name.to_string(),
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl WorkflowNode for CountingNode {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send(&self, _message: &str) -> Result<String, ExecutionError> {
            *self.calls.lock().unwrap() += 1;
            let mut replies = self.replies.lock().unwrap();
            Ok(replies.pop().unwrap_or_else(|| "draft".to_string()))
        }
    }

    #[test]
    fn ratings_order_worst_to_best() {
        assert!(QualityRating::Poor < QualityRating::Fair);
        assert!(QualityRating::Fair < QualityRating::Good);
        assert!(QualityRating::Good < QualityRating::Excellent);
    }

    #[test]
    fn last_keyword_wins() {
        assert_eq!(
            extract_rating("The draft is GOOD in parts but overall FAIR", "w"),
            QualityRating::Fair
        );
        assert_eq!(extract_rating("EXCELLENT", "w"), QualityRating::Excellent);
        assert_eq!(extract_rating("no verdict here", "w"), QualityRating::Poor);
    }

    #[tokio::test]
    async fn stops_when_threshold_met() {
        let optimizer = CountingNode::new("opt", vec!["v1", "v2"]);
        let evaluator = CountingNode::new("eval", vec!["FAIR, needs work", "GOOD now"]);
        let workflow = EvaluatorOptimizer::new(
            "loop",
            optimizer.clone(),
            evaluator.clone(),
            QualityRating::Good,
            5,
        );

        let outcome = workflow.refine("write").await.unwrap();
        assert!(outcome.met_threshold);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.best_rating, QualityRating::Good);
        assert_eq!(outcome.response, "v2");
        assert_eq!(optimizer.calls(), 2);
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_best_candidate() {
        let optimizer = CountingNode::new("opt", vec!["v1", "v2", "v3"]);
        let evaluator = CountingNode::new("eval", vec!["POOR", "POOR", "POOR"]);
        let workflow = EvaluatorOptimizer::new(
            "loop",
            optimizer.clone(),
            evaluator,
            QualityRating::Good,
            3,
        );

        let outcome = workflow.refine("write").await.unwrap();
        assert!(!outcome.met_threshold);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.best_rating, QualityRating::Poor);
        // First candidate is kept since ratings never improved.
        assert_eq!(outcome.response, "v1");
        assert_eq!(optimizer.calls(), 3);
    }

    #[tokio::test]
    async fn zero_budget_still_runs_once() {
        let optimizer = CountingNode::new("opt", vec!["only"]);
        let evaluator = CountingNode::new("eval", vec!["EXCELLENT"]);
        let workflow =
            EvaluatorOptimizer::new("loop", optimizer.clone(), evaluator, QualityRating::Good, 0);

        let outcome = workflow.refine("write").await.unwrap();
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.met_threshold);
    }
}
