// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal fragments
//!
//! A fragment is one atomic step of a traversal: look up a concept by
//! id, hop from an instance to its type, walk a role-player edge, and
//! so on. Fragments are a closed set of variants; every per-kind
//! behavior (cost, dependencies, rendering) is a single match in this
//! module rather than type checks scattered through the planner.
//!
//! Directed edge fragments come in out/in pairs describing the same
//! edge walked from either end. The shortcut fragment is the combined
//! form produced by the rewrite pass: a direct hop between two role
//! players that skips materializing the relation between them.

use crate::pattern::value::ValuePredicate;
use crate::pattern::var::{ConceptId, Label, Var};
use crate::plan::cost::CostConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One atomic traversal step
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fragment {
    /// Look up one concept by id
    Id { var: Var, id: ConceptId },
    /// Look up one schema type by label
    Label { var: Var, label: Label },
    /// Filter or look up instances by attribute value
    Value { var: Var, predicate: ValuePredicate },
    /// Hop from an instance to its type
    OutIsa { instance: Var, type_var: Var },
    /// Hop from a type to its instances, over all subtypes.
    /// `fan_out` is the subtype count when the type is statically known.
    InIsa {
        type_var: Var,
        instance: Var,
        fan_out: Option<usize>,
    },
    /// Hop from a relation type to a role type it relates
    OutRelates { relation: Var, role: Var },
    /// Hop from a role type to a relation type relating it
    InRelates { role: Var, relation: Var },
    /// Walk a role-player edge from the relation to the player
    OutRolePlayer {
        relation: Var,
        player: Var,
        role: Option<Label>,
    },
    /// Walk a role-player edge from the player to the relation
    InRolePlayer {
        player: Var,
        relation: Var,
        role: Option<Label>,
    },
    /// Hop directly between two role players of the same relation,
    /// skipping the relation variable. Role and relation-type filters
    /// are carried when statically known; `None` means unfiltered.
    Shortcut {
        from: Var,
        to: Var,
        relation: Var,
        from_roles: Option<BTreeSet<Label>>,
        to_roles: Option<BTreeSet<Label>>,
        relation_types: Option<BTreeSet<Label>>,
    },
    /// Check that two already-bound variables hold distinct concepts
    Neq { left: Var, right: Var },
}

impl Fragment {
    /// The variable this fragment starts from.
    pub fn start(&self) -> &Var {
        match self {
            Fragment::Id { var, .. }
            | Fragment::Label { var, .. }
            | Fragment::Value { var, .. } => var,
            Fragment::OutIsa { instance, .. } => instance,
            Fragment::InIsa { type_var, .. } => type_var,
            Fragment::OutRelates { relation, .. } => relation,
            Fragment::InRelates { role, .. } => role,
            Fragment::OutRolePlayer { relation, .. } => relation,
            Fragment::InRolePlayer { player, .. } => player,
            Fragment::Shortcut { from, .. } => from,
            Fragment::Neq { left, .. } => left,
        }
    }

    /// The variable this fragment arrives at, if it traverses an edge.
    pub fn end(&self) -> Option<&Var> {
        match self {
            Fragment::Id { .. }
            | Fragment::Label { .. }
            | Fragment::Value { .. }
            | Fragment::Neq { .. } => None,
            Fragment::OutIsa { type_var, .. } => Some(type_var),
            Fragment::InIsa { instance, .. } => Some(instance),
            Fragment::OutRelates { role, .. } => Some(role),
            Fragment::InRelates { relation, .. } => Some(relation),
            Fragment::OutRolePlayer { player, .. } => Some(player),
            Fragment::InRolePlayer { relation, .. } => Some(relation),
            Fragment::Shortcut { to, .. } => Some(to),
        }
    }

    /// Variables this fragment binds once executed.
    ///
    /// A distinctness check binds nothing, and a shortcut binds its two
    /// role players but not the relation it skips.
    pub fn binds(&self) -> BTreeSet<&Var> {
        let mut out = BTreeSet::new();
        match self {
            Fragment::Id { var, .. }
            | Fragment::Label { var, .. }
            | Fragment::Value { var, .. } => {
                out.insert(var);
            }
            Fragment::OutIsa { instance, type_var }
            | Fragment::InIsa {
                type_var, instance, ..
            } => {
                out.insert(instance);
                out.insert(type_var);
            }
            Fragment::OutRelates { relation, role }
            | Fragment::InRelates { role, relation } => {
                out.insert(relation);
                out.insert(role);
            }
            Fragment::OutRolePlayer {
                relation, player, ..
            }
            | Fragment::InRolePlayer {
                player, relation, ..
            } => {
                out.insert(relation);
                out.insert(player);
            }
            Fragment::Shortcut { from, to, .. } => {
                out.insert(from);
                out.insert(to);
            }
            Fragment::Neq { .. } => {}
        }
        out
    }

    /// Variables that must already be bound before this fragment may
    /// run. Empty for every kind except the distinctness check, which
    /// compares two existing bindings.
    pub fn dependencies(&self) -> BTreeSet<&Var> {
        let mut out = BTreeSet::new();
        if let Fragment::Neq { left, right } = self {
            out.insert(left);
            out.insert(right);
        }
        out
    }

    /// Tie-break rank used when two fragments cost the same, cheapest
    /// kinds first.
    pub fn priority(&self) -> u8 {
        match self {
            Fragment::Id { .. } => 0,
            Fragment::Label { .. } => 1,
            Fragment::Value { .. } => 2,
            Fragment::OutIsa { .. } => 3,
            Fragment::InIsa {
                fan_out: Some(_), ..
            } => 3,
            Fragment::OutRelates { .. }
            | Fragment::InRelates { .. }
            | Fragment::OutRolePlayer { .. }
            | Fragment::InRolePlayer { .. }
            | Fragment::Shortcut { .. } => 4,
            Fragment::InIsa { fan_out: None, .. } => 5,
            Fragment::Neq { .. } => 6,
        }
    }

    /// Whether this fragment is an index hit whose cost does not
    /// depend on the size of the intermediate result set.
    pub fn has_fixed_cost(&self) -> bool {
        match self {
            Fragment::Id { .. } | Fragment::Label { .. } => true,
            Fragment::Value { predicate, .. } => predicate.is_equality(),
            _ => false,
        }
    }

    /// Per-execution cost of this fragment, before scaling by the size
    /// of the intermediate result set it runs over. Fixed-cost
    /// fragments are never scaled, so for them this is the whole cost.
    pub fn base_cost(&self, config: &CostConfig) -> f64 {
        match self {
            Fragment::Id { .. } => config.id_lookup,
            Fragment::Label { .. } => config.type_lookup,
            Fragment::Value { predicate, .. } => {
                if predicate.is_equality() {
                    config.value_eq_lookup
                } else {
                    config.value_scan
                }
            }
            Fragment::OutIsa { .. } => config.isa_out,
            Fragment::InIsa { fan_out, .. } => {
                let subtypes = fan_out
                    .map(|n| n as f64)
                    .unwrap_or(config.unknown_subtype_fanout);
                subtypes * config.instances_per_subtype
            }
            Fragment::OutRelates { .. } => config.relates_out,
            Fragment::InRelates { .. } => config.relates_in,
            Fragment::OutRolePlayer { role, .. } => {
                let selectivity = if role.is_some() {
                    config.role_filter_selectivity
                } else {
                    1.0
                };
                config.role_player_out * selectivity
            }
            Fragment::InRolePlayer { role, .. } => {
                let selectivity = if role.is_some() {
                    config.role_filter_selectivity
                } else {
                    1.0
                };
                config.role_player_in * selectivity
            }
            Fragment::Shortcut {
                from_roles,
                to_roles,
                relation_types,
                ..
            } => {
                let mut cost = config.shortcut_hop;
                if from_roles.is_some() {
                    cost *= config.role_filter_selectivity;
                }
                if to_roles.is_some() {
                    cost *= config.role_filter_selectivity;
                }
                if relation_types.is_some() {
                    cost *= config.relation_filter_selectivity;
                }
                cost
            }
            Fragment::Neq { .. } => config.distinctness_filter,
        }
    }

    /// Render the fragment without its start variable, for chained
    /// display of a whole sequence.
    pub fn render_tail(&self) -> String {
        match self {
            Fragment::Id { id, .. } => format!("[id:{}]", id.as_str()),
            Fragment::Label { label, .. } => format!("[label:{}]", label.as_str()),
            Fragment::Value { predicate, .. } => format!("[value:{}]", predicate),
            Fragment::OutIsa { type_var, .. } => format!("-[isa]->{}", type_var),
            Fragment::InIsa { instance, .. } => format!("<-[isa]-{}", instance),
            Fragment::OutRelates { role, .. } => format!("-[relates]->{}", role),
            Fragment::InRelates { relation, .. } => format!("<-[relates]-{}", relation),
            Fragment::OutRolePlayer { player, role, .. } => {
                format!("-[role-player{}]->{}", render_role(role), player)
            }
            Fragment::InRolePlayer { relation, role, .. } => {
                format!("<-[role-player{}]-{}", render_role(role), relation)
            }
            Fragment::Shortcut {
                to,
                relation,
                from_roles,
                to_roles,
                relation_types,
                ..
            } => {
                let mut tail = format!("-[shortcut:{}", relation);
                if let Some(roles) = from_roles {
                    tail.push_str(&format!(" src-roles:{}", render_labels(roles)));
                }
                if let Some(roles) = to_roles {
                    tail.push_str(&format!(" roles:{}", render_labels(roles)));
                }
                if let Some(rels) = relation_types {
                    tail.push_str(&format!(" rels:{}", render_labels(rels)));
                }
                tail.push_str(&format!("]->{}", to));
                tail
            }
            Fragment::Neq { right, .. } => format!("[neq:{}]", right),
        }
    }
}

fn render_role(role: &Option<Label>) -> String {
    match role {
        Some(role) => format!(" roles:{}", role.as_str()),
        None => String::new(),
    }
}

fn render_labels(labels: &BTreeSet<Label>) -> String {
    labels
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start(), self.render_tail())
    }
}
