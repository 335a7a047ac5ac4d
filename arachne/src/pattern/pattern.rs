// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pattern trees and disjunctive normal form
//!
//! A query pattern arrives as an arbitrary and/or tree over atomic
//! constraints. Planning only understands flat conjunctions, so the
//! first pass rewrites the tree into a set of conjunctions (DNF): one
//! conjunction per alternative way of satisfying the pattern.

use crate::error::PlanError;
use crate::pattern::constraint::Constraint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An and/or tree over atomic constraints
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// A single atomic constraint
    Constraint(Constraint),
    /// All sub-patterns must hold
    And(Vec<Pattern>),
    /// At least one sub-pattern must hold
    Or(Vec<Pattern>),
    /// The sub-pattern must not hold. Not plannable; normalization
    /// rejects it so callers get a structured error instead of a
    /// silently wrong plan.
    Not(Box<Pattern>),
}

impl Pattern {
    /// Rewrite the pattern into disjunctive normal form.
    ///
    /// The result is a set of conjunctions whose union is equivalent to
    /// the input: `A and (B or C)` becomes `{A, B}` and `{A, C}`.
    /// Duplicate constraints inside one alternative collapse, and
    /// identical alternatives collapse, because both levels are sets.
    pub fn disjunctive_normal_form(&self) -> Result<BTreeSet<Conjunction>, PlanError> {
        match self {
            Pattern::Constraint(constraint) => {
                let mut constraints = BTreeSet::new();
                constraints.insert(constraint.clone());
                let mut out = BTreeSet::new();
                out.insert(Conjunction { constraints });
                Ok(out)
            }
            Pattern::And(parts) => {
                if parts.is_empty() {
                    return Err(PlanError::MalformedPattern(
                        "conjunction has no sub-patterns".to_string(),
                    ));
                }
                // Distribute: the DNF of a conjunction is the cross
                // product of its parts' DNFs.
                let mut acc = BTreeSet::new();
                acc.insert(Conjunction {
                    constraints: BTreeSet::new(),
                });
                for part in parts {
                    let part_dnf = part.disjunctive_normal_form()?;
                    let mut next = BTreeSet::new();
                    for left in &acc {
                        for right in &part_dnf {
                            let mut constraints = left.constraints.clone();
                            constraints.extend(right.constraints.iter().cloned());
                            next.insert(Conjunction { constraints });
                        }
                    }
                    acc = next;
                }
                Ok(acc)
            }
            Pattern::Or(parts) => {
                if parts.is_empty() {
                    return Err(PlanError::MalformedPattern(
                        "disjunction has no sub-patterns".to_string(),
                    ));
                }
                let mut out = BTreeSet::new();
                for part in parts {
                    out.extend(part.disjunctive_normal_form()?);
                }
                Ok(out)
            }
            Pattern::Not(_) => Err(PlanError::MalformedPattern(
                "negation cannot be planned".to_string(),
            )),
        }
    }
}

impl From<Constraint> for Pattern {
    fn from(constraint: Constraint) -> Self {
        Pattern::Constraint(constraint)
    }
}

/// A flat set of constraints that must all hold together
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Conjunction {
    constraints: BTreeSet<Constraint>,
}

impl Conjunction {
    pub fn new(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Conjunction {
            constraints: constraints.into_iter().collect(),
        }
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", constraint)?;
        }
        write!(f, "}}")
    }
}
