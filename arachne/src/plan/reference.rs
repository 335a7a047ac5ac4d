// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Exhaustive reference planner
//!
//! Enumerates every valid ordering and keeps the global minimum-cost
//! one. Factorial in the number of constraints, so only suitable for
//! small patterns; it exists as the optimality oracle the greedy
//! planner is measured against.

use crate::catalog::SchemaCatalog;
use crate::error::PlanError;
use crate::pattern::Pattern;
use crate::plan::conjunction::ConjunctionQuery;
use crate::plan::cost::{sequence_cost, CostConfig};
use crate::plan::fragment::Fragment;
use crate::plan::traversal::TraversalPlan;
use std::cmp::Ordering;

/// Planner that finds the true minimum-cost ordering by exhaustion
#[derive(Debug, Clone, Default)]
pub struct ReferencePlanner {
    config: CostConfig,
}

impl ReferencePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CostConfig) -> Self {
        ReferencePlanner { config }
    }

    /// Produce the globally optimal plan for the pattern.
    pub fn optimal(
        &self,
        pattern: &Pattern,
        catalog: &dyn SchemaCatalog,
    ) -> Result<TraversalPlan, PlanError> {
        let conjunctions = pattern.disjunctive_normal_form()?;
        let mut sequences = Vec::with_capacity(conjunctions.len());
        for conjunction in conjunctions {
            let query = ConjunctionQuery::new(conjunction, catalog)?;
            sequences.push(self.optimal_sequence(&query)?);
        }
        Ok(TraversalPlan::with_config(sequences, self.config.clone()))
    }

    fn optimal_sequence(&self, query: &ConjunctionQuery) -> Result<Vec<Fragment>, PlanError> {
        let mut considered = 0usize;
        let mut best: Option<(f64, Vec<Fragment>)> = None;
        for ordering in query.orderings() {
            considered += 1;
            let cost = sequence_cost(&ordering, &self.config);
            let replace = match &best {
                None => true,
                Some((best_cost, _)) => cost.total_cmp(best_cost) == Ordering::Less,
            };
            if replace {
                best = Some((cost, ordering));
            }
        }
        log::debug!(
            "exhausted {} ordering(s) for {}",
            considered,
            query.conjunction()
        );
        match best {
            Some((_, ordering)) => Ok(ordering),
            // Construction validated every dependency as bindable, so
            // at least one ordering must exist
            None => Err(PlanError::PlanningDeadlock(format!(
                "no valid ordering exists for {}",
                query.conjunction()
            ))),
        }
    }
}
