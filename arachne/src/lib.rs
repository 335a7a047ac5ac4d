// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Arachne - A cost-based traversal planner for semantic graph pattern queries
//!
//! Arachne turns declarative graph patterns into ordered traversal plans.
//!
//! # Features
//!
//! - **Pattern Normalization**: And/or pattern trees rewrite to disjunctive normal form
//! - **Candidate Expansion**: Every constraint expands to each of its physical realizations
//! - **Shortcut Rewrite**: Paired role-player constraints collapse into direct player-to-player hops
//! - **Cost-Based Search**: Greedy ordering by marginal cost under a tunable cost model
//! - **Deterministic Plans**: Equal patterns produce byte-identical plans
//!
//! # Usage
//!
//! ```rust
//! use arachne::{plan, var, MemoryCatalog, Pattern};
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert_type("movie");
//!
//! let pattern: Pattern = var("x").id("V123").isa(var("y").label("movie")).into();
//! let traversal = plan(&pattern, &catalog).unwrap();
//! println!("{}", traversal.explain());
//! ```

// Internal modules - only visible within arachne crate
pub(crate) mod catalog;
pub(crate) mod error;
pub(crate) mod pattern;
pub(crate) mod plan;

// Re-export the public API - patterns in, traversal plans out
pub use catalog::{MemoryCatalog, SchemaCatalog};
pub use error::PlanError;
pub use pattern::build::{and, or, var, VarPattern};
pub use pattern::constraint::Constraint;
pub use pattern::value::{Comparison, Value, ValuePredicate};
pub use pattern::var::{ConceptId, Label, Var};
pub use pattern::{Conjunction, Pattern};
pub use plan::candidates::CandidateSet;
pub use plan::conjunction::{ConjunctionQuery, Orderings};
pub use plan::cost::{sequence_cost, step_cost, CostConfig};
pub use plan::fragment::Fragment;
pub use plan::greedy::{plan, TraversalPlanner};
pub use plan::reference::ReferencePlanner;
pub use plan::traversal::TraversalPlan;

/// Arachne version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Arachne crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
