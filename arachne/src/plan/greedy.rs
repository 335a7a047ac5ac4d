// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Greedy traversal planner
//!
//! Exhaustive search over valid orderings is factorial in the number of
//! constraints, so the planner extends a partial sequence one fragment
//! at a time, always picking the locally cheapest placeable candidate.
//! Ties break by fragment priority and then by rendered form, which
//! keeps plans deterministic across runs.

use crate::catalog::SchemaCatalog;
use crate::error::PlanError;
use crate::pattern::var::Var;
use crate::pattern::Pattern;
use crate::plan::conjunction::ConjunctionQuery;
use crate::plan::cost::{step_cost, CostConfig};
use crate::plan::fragment::Fragment;
use crate::plan::traversal::TraversalPlan;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Plan a pattern with the default cost configuration.
pub fn plan(pattern: &Pattern, catalog: &dyn SchemaCatalog) -> Result<TraversalPlan, PlanError> {
    TraversalPlanner::new().plan(pattern, catalog)
}

/// Cost-based greedy planner
///
/// The planner is stateless between calls and holds only its cost
/// configuration, so one instance can plan any number of patterns
/// against any number of catalogs.
#[derive(Debug, Clone, Default)]
pub struct TraversalPlanner {
    config: CostConfig,
}

impl TraversalPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CostConfig) -> Self {
        TraversalPlanner { config }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Produce a plan for the pattern, one greedy sequence per
    /// disjunct of its normal form.
    pub fn plan(
        &self,
        pattern: &Pattern,
        catalog: &dyn SchemaCatalog,
    ) -> Result<TraversalPlan, PlanError> {
        let conjunctions = pattern.disjunctive_normal_form()?;
        let mut sequences = Vec::with_capacity(conjunctions.len());
        for conjunction in conjunctions {
            let query = ConjunctionQuery::new(conjunction, catalog)?;
            sequences.push(self.greedy_sequence(&query)?);
        }
        let plan = TraversalPlan::with_config(sequences, self.config.clone());
        log::debug!("planned {} → {}", pattern_summary(pattern), plan);
        Ok(plan)
    }

    /// Order one conjunction's fragments by repeated locally-cheapest
    /// selection.
    fn greedy_sequence(&self, query: &ConjunctionQuery) -> Result<Vec<Fragment>, PlanError> {
        let sets = query.candidate_sets();
        let mut used = vec![false; sets.len()];
        let mut sequence = Vec::with_capacity(sets.len());
        let mut bound: BTreeSet<Var> = BTreeSet::new();
        let mut running = 1.0;

        for _ in 0..sets.len() {
            let mut best: Option<Selection> = None;
            for (set_idx, set) in sets.iter().enumerate() {
                if used[set_idx] {
                    continue;
                }
                for fragment in set.fragments() {
                    let placeable = fragment
                        .dependencies()
                        .iter()
                        .all(|dep| bound.contains(*dep));
                    if !placeable {
                        continue;
                    }
                    let cost = step_cost(fragment, running, &bound, &self.config);
                    let candidate = Selection {
                        cost,
                        priority: fragment.priority(),
                        rendering: fragment.to_string(),
                        set_idx,
                        fragment: fragment.clone(),
                    };
                    if best.as_ref().map_or(true, |b| candidate.beats(b)) {
                        best = Some(candidate);
                    }
                }
            }

            match best {
                Some(selection) => {
                    used[selection.set_idx] = true;
                    running = selection.cost;
                    bound.extend(selection.fragment.binds().into_iter().cloned());
                    sequence.push(selection.fragment);
                }
                None => {
                    // Dependencies cannot cycle through the candidate
                    // sets the expansion produces, so reaching this
                    // point means fragment generation broke its own
                    // contract.
                    let remaining = used.iter().filter(|u| !**u).count();
                    log::error!(
                        "planning deadlock: {} candidate set(s) unplaceable in {}",
                        remaining,
                        query.conjunction()
                    );
                    return Err(PlanError::PlanningDeadlock(format!(
                        "{} candidate set(s) unplaceable in {}",
                        remaining,
                        query.conjunction()
                    )));
                }
            }
        }
        Ok(sequence)
    }
}

/// One candidate under consideration during a greedy step
struct Selection {
    cost: f64,
    priority: u8,
    rendering: String,
    set_idx: usize,
    fragment: Fragment,
}

impl Selection {
    fn beats(&self, other: &Selection) -> bool {
        match self.cost.total_cmp(&other.cost) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => match self.priority.cmp(&other.priority) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => self.rendering < other.rendering,
            },
        }
    }
}

fn pattern_summary(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Constraint(c) => c.to_string(),
        Pattern::And(parts) => format!("and({})", parts.len()),
        Pattern::Or(parts) => format!("or({})", parts.len()),
        Pattern::Not(_) => "not(..)".to_string(),
    }
}
