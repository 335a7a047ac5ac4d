// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-conjunction planning state
//!
//! A [`ConjunctionQuery`] holds the candidate fragment sets of one
//! conjunction after the shortcut rewrite, validated so that every
//! dependency can eventually be satisfied. From it the planner either
//! walks greedily or enumerates every valid ordering.

use crate::catalog::SchemaCatalog;
use crate::error::PlanError;
use crate::pattern::constraint::Constraint;
use crate::pattern::var::Var;
use crate::pattern::Conjunction;
use crate::plan::candidates::{candidates_for, CandidateSet};
use crate::plan::fragment::Fragment;
use crate::plan::shortcut::find_merges;
use std::collections::BTreeSet;

/// One conjunction expanded into candidate fragment sets
#[derive(Debug, Clone)]
pub struct ConjunctionQuery {
    conjunction: Conjunction,
    candidate_sets: Vec<CandidateSet>,
}

impl ConjunctionQuery {
    /// Expand a conjunction into candidate sets.
    ///
    /// Runs the shortcut rewrite, expands every surviving constraint,
    /// and verifies that each fragment dependency is bindable by some
    /// candidate. Fails when the conjunction is empty, references
    /// unknown types, or contains a constraint no fragment can realize.
    pub fn new(conjunction: Conjunction, catalog: &dyn SchemaCatalog) -> Result<Self, PlanError> {
        if conjunction.is_empty() {
            return Err(PlanError::MalformedPattern(
                "conjunction has no constraints".to_string(),
            ));
        }

        let merges = find_merges(&conjunction, catalog)?;
        let consumed: BTreeSet<&Constraint> =
            merges.iter().flat_map(|m| m.consumed().iter()).collect();

        let mut candidate_sets = Vec::new();
        for constraint in conjunction.constraints() {
            if consumed.contains(constraint) {
                continue;
            }
            candidate_sets.push(candidates_for(constraint, &conjunction, catalog)?);
        }
        for merge in &merges {
            candidate_sets.push(CandidateSet::new(merge.shortcut_candidates()));
            if let Some(guard) = merge.guard() {
                candidate_sets.push(CandidateSet::new(vec![guard]));
            }
        }

        // Every dependency must be bindable by some candidate,
        // otherwise no ordering can ever satisfy it
        let bindable: BTreeSet<&Var> = candidate_sets
            .iter()
            .flat_map(|set| set.fragments().iter())
            .flat_map(|fragment| fragment.binds())
            .collect();
        for set in &candidate_sets {
            for fragment in set.fragments() {
                for dep in fragment.dependencies() {
                    if !bindable.contains(dep) {
                        return Err(PlanError::UnresolvableConstraint(format!(
                            "variable {} is never bound by any fragment (required by {})",
                            dep, fragment
                        )));
                    }
                }
            }
        }

        Ok(ConjunctionQuery {
            conjunction,
            candidate_sets,
        })
    }

    /// The conjunction this query was built from.
    pub fn conjunction(&self) -> &Conjunction {
        &self.conjunction
    }

    /// The candidate fragment sets, one per surviving constraint plus
    /// one per rewrite product.
    pub fn candidate_sets(&self) -> &[CandidateSet] {
        &self.candidate_sets
    }

    /// Lazily enumerate every valid ordering: one fragment per
    /// candidate set, sequenced so each fragment's dependencies are
    /// bound by the fragments before it.
    pub fn orderings(&self) -> Orderings<'_> {
        Orderings::new(&self.candidate_sets)
    }
}

/// Backtracking iterator over valid fragment orderings
///
/// The search tree has one level per candidate set position; each next
/// call resumes the walk where the previous ordering left off, so full
/// enumeration is never materialized unless the caller asks for it.
pub struct Orderings<'a> {
    sets: &'a [CandidateSet],
    stack: Vec<Frame>,
    used: Vec<bool>,
    // bound[d] holds the bindings before placing depth d, with a
    // sentinel empty set at the bottom
    bound: Vec<BTreeSet<&'a Var>>,
    exhausted: bool,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    set_idx: usize,
    frag_idx: usize,
}

impl<'a> Orderings<'a> {
    fn new(sets: &'a [CandidateSet]) -> Self {
        let mut bound = Vec::with_capacity(sets.len() + 1);
        bound.push(BTreeSet::new());
        Orderings {
            sets,
            stack: Vec::with_capacity(sets.len()),
            used: vec![false; sets.len()],
            bound,
            exhausted: false,
        }
    }

    /// Find the first placeable position at the current depth, at or
    /// after `cursor` in (set, fragment) order.
    fn find_valid(&self, cursor: (usize, usize)) -> Option<Frame> {
        let current = self.bound.last()?;
        for set_idx in cursor.0..self.sets.len() {
            if self.used[set_idx] {
                continue;
            }
            let start = if set_idx == cursor.0 { cursor.1 } else { 0 };
            let fragments = self.sets[set_idx].fragments();
            for (frag_idx, fragment) in fragments.iter().enumerate().skip(start) {
                let deps_met = fragment.dependencies().iter().all(|dep| current.contains(*dep));
                if deps_met {
                    return Some(Frame { set_idx, frag_idx });
                }
            }
        }
        None
    }

    fn push(&mut self, frame: Frame) {
        let fragment = &self.sets[frame.set_idx].fragments()[frame.frag_idx];
        let mut next_bound = self.bound.last().cloned().unwrap_or_default();
        next_bound.extend(fragment.binds());
        self.bound.push(next_bound);
        self.used[frame.set_idx] = true;
        self.stack.push(frame);
    }

    fn pop(&mut self) -> Option<Frame> {
        let frame = self.stack.pop()?;
        self.used[frame.set_idx] = false;
        self.bound.pop();
        Some(frame)
    }

    fn current_ordering(&self) -> Vec<Fragment> {
        self.stack
            .iter()
            .map(|frame| self.sets[frame.set_idx].fragments()[frame.frag_idx].clone())
            .collect()
    }
}

impl<'a> Iterator for Orderings<'a> {
    type Item = Vec<Fragment>;

    fn next(&mut self) -> Option<Vec<Fragment>> {
        if self.exhausted || self.sets.is_empty() {
            self.exhausted = true;
            return None;
        }

        // Resume: on the first call start at the root, afterwards
        // backtrack past the ordering yielded last time
        let mut cursor = if self.stack.is_empty() {
            (0, 0)
        } else {
            match self.pop() {
                Some(frame) => (frame.set_idx, frame.frag_idx + 1),
                None => {
                    self.exhausted = true;
                    return None;
                }
            }
        };

        loop {
            match self.find_valid(cursor) {
                Some(frame) => {
                    self.push(frame);
                    if self.stack.len() == self.sets.len() {
                        return Some(self.current_ordering());
                    }
                    cursor = (0, 0);
                }
                None => match self.pop() {
                    Some(frame) => cursor = (frame.set_idx, frame.frag_idx + 1),
                    None => {
                        self.exhausted = true;
                        return None;
                    }
                },
            }
        }
    }
}
