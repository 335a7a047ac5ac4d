// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Planning error types
//!
//! Planning either succeeds with one immutable plan or fails with one of
//! these errors. No partial plans are ever returned.

use thiserror::Error;

/// Planning errors
#[derive(Error, Debug)]
pub enum PlanError {
    /// The input pattern uses logical structure the planner does not
    /// support (negation, empty conjunctions or disjunctions). Surfaced
    /// to the caller unchanged.
    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),

    /// An atomic constraint cannot be realized by any fragment: it
    /// references a type label the catalog does not know, or depends on
    /// a variable nothing in its conjunction can bind. Aborts planning
    /// for the whole query.
    #[error("Unresolvable constraint: {0}")]
    UnresolvableConstraint(String),

    /// Internal invariant violation: constraints remain but no fragment
    /// has its dependencies satisfied. Fragment generation is supposed
    /// to make this impossible, so this is a defect, not a user error.
    #[error("Planning deadlock: {0}")]
    PlanningDeadlock(String),
}
