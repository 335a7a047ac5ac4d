// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cost model for traversal planning
//!
//! Every fragment kind has a per-execution base cost. Sequencing scales
//! each step by a running factor that tracks the size of the
//! intermediate result set: a fragment starting from an already-bound
//! variable runs once per intermediate result, while a fragment
//! starting from an unbound variable restarts against the whole graph.
//! Index lookups are the exception: they cost a flat amount wherever
//! they run, and they shrink the running factor back to that amount.
//! All constants are tunable; only their relative order is meaningful.

use crate::pattern::var::Var;
use crate::plan::fragment::Fragment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tunable constants of the cost model
///
/// Base costs are unitless work per intermediate result, except the
/// index lookups, which are flat per-execution costs. Selectivities
/// are multiplicative discounts in `(0, 1]` applied when a filter is
/// statically known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Assumed number of concepts in the graph, used when a fragment
    /// must start from an unbound variable
    pub graph_size_estimate: f64,
    /// Flat cost of looking up one concept by id
    pub id_lookup: f64,
    /// Flat cost of looking up a schema type by label
    pub type_lookup: f64,
    /// Flat cost of an indexed lookup of instances by exact attribute
    /// value
    pub value_eq_lookup: f64,
    /// Range or containment scan over attribute values
    pub value_scan: f64,
    /// Hop from an instance to its type
    pub isa_out: f64,
    /// Assumed instances per subtype when walking a type to its
    /// instances
    pub instances_per_subtype: f64,
    /// Assumed subtype count when the type is not statically known
    pub unknown_subtype_fanout: f64,
    /// Hop from a relation type to a role type
    pub relates_out: f64,
    /// Hop from a role type to a relation type
    pub relates_in: f64,
    /// Role-player edge walked from the relation to the player
    pub role_player_out: f64,
    /// Role-player edge walked from the player to the relation
    pub role_player_in: f64,
    /// Combined role-player hop between two players, skipping their
    /// relation
    pub shortcut_hop: f64,
    /// Discount applied per statically-known role filter
    pub role_filter_selectivity: f64,
    /// Discount applied when the relation type is statically known
    pub relation_filter_selectivity: f64,
    /// Distinctness check between two bound variables
    pub distinctness_filter: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        CostConfig {
            graph_size_estimate: 10_000.0,
            id_lookup: 1.0,
            type_lookup: 5.0,
            value_eq_lookup: 10.0,
            value_scan: 0.5,
            isa_out: 1.5,
            instances_per_subtype: 100.0,
            unknown_subtype_fanout: 8.0,
            relates_out: 2.0,
            relates_in: 1.5,
            role_player_out: 2.0,
            role_player_in: 30.0,
            shortcut_hop: 6.0,
            role_filter_selectivity: 0.5,
            relation_filter_selectivity: 0.5,
            distinctness_filter: 1.0,
        }
    }
}

/// Marginal cost of appending `fragment` to a partial traversal.
///
/// `running` is the scale carried from the previous step. An index
/// lookup costs a flat amount wherever it is placed. Any other
/// fragment starting from a bound variable extends the walk and is
/// scaled by `running`; otherwise it restarts against the whole graph.
/// The returned cost is also the running scale for the next step.
pub fn step_cost(fragment: &Fragment, running: f64, bound: &BTreeSet<Var>, config: &CostConfig) -> f64 {
    if fragment.has_fixed_cost() {
        return fragment.base_cost(config);
    }
    let scale = if bound.contains(fragment.start()) {
        running
    } else {
        config.graph_size_estimate
    };
    fragment.base_cost(config) * scale
}

/// Total cost of executing the fragments in the given order.
pub fn sequence_cost(sequence: &[Fragment], config: &CostConfig) -> f64 {
    let mut total = 0.0;
    let mut running = 1.0;
    let mut bound = BTreeSet::new();
    for fragment in sequence {
        let cost = step_cost(fragment, running, &bound, config);
        total += cost;
        running = cost;
        bound.extend(fragment.binds().into_iter().cloned());
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::var::ConceptId;

    fn x_id() -> Fragment {
        Fragment::Id {
            var: Var::from("x"),
            id: ConceptId::from("V1"),
        }
    }

    fn y_id() -> Fragment {
        Fragment::Id {
            var: Var::from("y"),
            id: ConceptId::from("V2"),
        }
    }

    fn x_isa_y() -> Fragment {
        Fragment::OutIsa {
            instance: Var::from("x"),
            type_var: Var::from("y"),
        }
    }

    fn y_instances_z() -> Fragment {
        Fragment::InIsa {
            type_var: Var::from("y"),
            instance: Var::from("z"),
            fan_out: None,
        }
    }

    #[test]
    fn test_unbound_start_restarts_against_whole_graph() {
        let config = CostConfig::default();
        let cost = sequence_cost(&[x_isa_y()], &config);
        assert_eq!(cost, config.isa_out * config.graph_size_estimate);
    }

    #[test]
    fn test_bound_start_scales_by_running_factor() {
        let config = CostConfig::default();
        let hop_after_lookup = sequence_cost(&[x_id(), x_isa_y()], &config);
        let hop_from_scratch = sequence_cost(&[x_isa_y()], &config);
        // Continuing from one bound concept is far cheaper than
        // scanning every instance
        assert!(hop_after_lookup < hop_from_scratch);
    }

    #[test]
    fn test_later_steps_compound_selectivity() {
        let config = CostConfig::default();
        let lookup_then_hop = sequence_cost(&[x_id(), x_isa_y()], &config);
        let lookup_alone = sequence_cost(&[x_id()], &config);
        let expected_hop = config.isa_out * lookup_alone;
        assert_eq!(lookup_then_hop, lookup_alone + expected_hop);
    }

    #[test]
    fn test_index_lookup_cost_ignores_the_running_factor() {
        let config = CostConfig::default();
        // The lookup lands on a variable the expensive hop just bound,
        // yet it still costs its flat amount
        let hop_then_lookup = sequence_cost(&[x_isa_y(), y_id()], &config);
        let hop_alone = sequence_cost(&[x_isa_y()], &config);
        assert_eq!(hop_then_lookup, hop_alone + config.id_lookup);
    }

    #[test]
    fn test_index_lookup_resets_the_running_factor() {
        let config = CostConfig::default();
        let total = sequence_cost(&[x_isa_y(), y_id(), y_instances_z()], &config);
        let fan_out = config.unknown_subtype_fanout * config.instances_per_subtype;
        // The final walk scales from the flat lookup cost, not from
        // the expensive restart before it
        let expected = config.isa_out * config.graph_size_estimate
            + config.id_lookup
            + fan_out * config.id_lookup;
        assert_eq!(total, expected);
    }
}
