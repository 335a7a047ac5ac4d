// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema catalog interface used by the planner
//!
//! Planning needs a small window onto the schema: whether a label names
//! a known type, and the set of labels subsumed by it. The planner takes
//! the catalog as an explicit parameter on every call rather than
//! holding one, so one planner can serve many schemas.

use crate::pattern::var::Label;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Read-only schema knowledge the planner consults
///
/// Implementations must answer from a consistent snapshot of the
/// schema; the planner may call these methods any number of times while
/// planning one pattern.
pub trait SchemaCatalog: Send + Sync {
    /// All labels subsumed by the given label, including itself.
    ///
    /// Returns `None` when the label does not name a known type, which
    /// the planner reports as an unresolvable constraint.
    fn subtypes(&self, label: &Label) -> Option<BTreeSet<Label>>;

    /// Whether the label names a known type.
    fn is_known_type(&self, label: &Label) -> bool {
        self.subtypes(label).is_some()
    }
}

/// In-memory catalog backed by a direct-subtype adjacency map
///
/// Suitable for tests and for embedding the planner without a real
/// schema store behind it.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    children: BTreeMap<Label, BTreeSet<Label>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with no subtypes (yet).
    pub fn insert_type(&mut self, label: impl Into<Label>) -> &mut Self {
        self.children.entry(label.into()).or_default();
        self
    }

    /// Register `subtype` as a direct subtype of `supertype`. Both
    /// labels become known types.
    pub fn add_subtype(&mut self, supertype: impl Into<Label>, subtype: impl Into<Label>) -> &mut Self {
        let subtype = subtype.into();
        self.children.entry(subtype.clone()).or_default();
        self.children.entry(supertype.into()).or_default().insert(subtype);
        self
    }
}

impl SchemaCatalog for MemoryCatalog {
    fn subtypes(&self, label: &Label) -> Option<BTreeSet<Label>> {
        if !self.children.contains_key(label) {
            return None;
        }
        // Breadth-first closure over direct subtypes
        let mut closure = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(label.clone());
        while let Some(current) = queue.pop_front() {
            if !closure.insert(current.clone()) {
                continue;
            }
            if let Some(children) = self.children.get(&current) {
                for child in children {
                    queue.push_back(child.clone());
                }
            }
        }
        Some(closure)
    }
}
