// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Atomic pattern constraints
//!
//! A conjunction is a set of these constraints. Each kind maps to one
//! candidate fragment set during planning; the planner never looks at
//! patterns below this level.

use crate::pattern::value::ValuePredicate;
use crate::pattern::var::{ConceptId, Label, Var};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One atomic requirement on the variables of a pattern
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Constraint {
    /// The variable is bound to the concept with this id
    Id { var: Var, id: ConceptId },
    /// The variable is the schema type with this label
    Label { var: Var, label: Label },
    /// The value of the variable satisfies the predicate
    Value { var: Var, predicate: ValuePredicate },
    /// The instance variable is a direct or indirect instance of the type variable
    Isa { instance: Var, type_var: Var },
    /// The player variable fills a role in the relation variable,
    /// optionally restricted to a named role type
    RolePlayer {
        relation: Var,
        player: Var,
        role: Option<Label>,
    },
    /// The relation type variable relates the role type variable
    Relates { relation: Var, role: Var },
    /// The two variables are bound to distinct concepts
    Neq { left: Var, right: Var },
}

impl Constraint {
    /// Every variable mentioned by this constraint.
    pub fn vars(&self) -> BTreeSet<&Var> {
        let mut out = BTreeSet::new();
        match self {
            Constraint::Id { var, .. }
            | Constraint::Label { var, .. }
            | Constraint::Value { var, .. } => {
                out.insert(var);
            }
            Constraint::Isa { instance, type_var } => {
                out.insert(instance);
                out.insert(type_var);
            }
            Constraint::RolePlayer {
                relation, player, ..
            } => {
                out.insert(relation);
                out.insert(player);
            }
            Constraint::Relates { relation, role } => {
                out.insert(relation);
                out.insert(role);
            }
            Constraint::Neq { left, right } => {
                out.insert(left);
                out.insert(right);
            }
        }
        out
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Id { var, id } => write!(f, "{} id \"{}\"", var, id.as_str()),
            Constraint::Label { var, label } => write!(f, "{} label {}", var, label.as_str()),
            Constraint::Value { var, predicate } => write!(f, "{} val {}", var, predicate),
            Constraint::Isa { instance, type_var } => write!(f, "{} isa {}", instance, type_var),
            Constraint::RolePlayer {
                relation,
                player,
                role: Some(role),
            } => write!(f, "{} rel ({}: {})", relation, role.as_str(), player),
            Constraint::RolePlayer {
                relation,
                player,
                role: None,
            } => write!(f, "{} rel ({})", relation, player),
            Constraint::Relates { relation, role } => {
                write!(f, "{} relates {}", relation, role)
            }
            Constraint::Neq { left, right } => write!(f, "{} != {}", left, right),
        }
    }
}
