// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Executable traversal plans
//!
//! A [`TraversalPlan`] is the planner's immutable output: one ordered
//! fragment sequence per disjunct of the normalized pattern, plus the
//! cost configuration it was planned under. Plans render
//! deterministically, so equal inputs produce byte-identical output.

use crate::plan::cost::{sequence_cost, step_cost, CostConfig};
use crate::plan::fragment::Fragment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The immutable output of planning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalPlan {
    sequences: BTreeSet<Vec<Fragment>>,
    config: CostConfig,
}

impl TraversalPlan {
    /// Assemble a plan from fragment sequences under the default cost
    /// configuration.
    pub fn new(sequences: impl IntoIterator<Item = Vec<Fragment>>) -> Self {
        Self::with_config(sequences, CostConfig::default())
    }

    /// Assemble a plan from fragment sequences under an explicit cost
    /// configuration.
    pub fn with_config(
        sequences: impl IntoIterator<Item = Vec<Fragment>>,
        config: CostConfig,
    ) -> Self {
        TraversalPlan {
            sequences: sequences.into_iter().collect(),
            config,
        }
    }

    /// The fragment sequences, one per disjunct.
    pub fn sequences(&self) -> impl Iterator<Item = &[Fragment]> {
        self.sequences.iter().map(|s| s.as_slice())
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Estimated total work of executing this plan.
    ///
    /// Disjunct sequences run independently, so their costs compound
    /// multiplicatively into one comparable magnitude.
    pub fn complexity(&self) -> f64 {
        self.sequences
            .iter()
            .map(|sequence| sequence_cost(sequence, &self.config))
            .product()
    }

    /// Human-readable breakdown of the plan and its cost.
    pub fn explain(&self) -> String {
        let mut output = String::new();
        output.push_str("Traversal Plan Summary\n");
        output.push_str(&"=".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "Total Complexity: {:.4} | Sequences: {}\n",
            self.complexity(),
            self.sequences.len()
        ));

        for (i, sequence) in self.sequences.iter().enumerate() {
            output.push_str(&format!(
                "\nSequence {} (cost: {:.4})\n",
                i + 1,
                sequence_cost(sequence, &self.config)
            ));
            output.push_str(&"-".repeat(30));
            output.push('\n');
            let mut running = 1.0;
            let mut bound = BTreeSet::new();
            for (step, fragment) in sequence.iter().enumerate() {
                let cost = step_cost(fragment, running, &bound, &self.config);
                output.push_str(&format!(
                    "{}. {} → step cost: {:.4}\n",
                    step + 1,
                    fragment,
                    cost
                ));
                running = cost;
                bound.extend(fragment.binds().into_iter().cloned());
            }
        }
        output
    }

    /// JSON rendering of the plan, for tooling.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Plans compare by their sequences alone; the cost configuration is
/// planning metadata.
impl PartialEq for TraversalPlan {
    fn eq(&self, other: &Self) -> bool {
        self.sequences == other.sequences
    }
}

impl Eq for TraversalPlan {}

impl fmt::Display for TraversalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sequence) in self.sequences.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;
            let mut cursor = None;
            for fragment in sequence {
                if cursor == Some(fragment.start()) {
                    write!(f, "{}", fragment.render_tail())?;
                } else {
                    if cursor.is_some() {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", fragment)?;
                }
                cursor = Some(fragment.end().unwrap_or(fragment.start()));
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}
