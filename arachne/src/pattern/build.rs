// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Builder API for assembling patterns
//!
//! Patterns are built fluently around variables: `var("x").id("V123")`
//! or `var("r").rel_role("wife", var("x")).rel_role("husband", var("y"))`.
//! Nested variable patterns are absorbed, so constraints attached to a
//! sub-variable travel with it into the enclosing pattern.

use crate::pattern::constraint::Constraint;
use crate::pattern::pattern::Pattern;
use crate::pattern::value::ValuePredicate;
use crate::pattern::var::{ConceptId, Label, Var};

/// Start a pattern rooted at the named variable.
pub fn var(name: impl Into<String>) -> VarPattern {
    VarPattern {
        var: Var::new(name),
        constraints: Vec::new(),
    }
}

/// Conjoin several patterns.
pub fn and(patterns: impl IntoIterator<Item = impl Into<Pattern>>) -> Pattern {
    Pattern::And(patterns.into_iter().map(Into::into).collect())
}

/// Form the disjunction of several patterns.
pub fn or(patterns: impl IntoIterator<Item = impl Into<Pattern>>) -> Pattern {
    Pattern::Or(patterns.into_iter().map(Into::into).collect())
}

/// A variable together with the constraints accumulated on it
#[derive(Debug, Clone)]
pub struct VarPattern {
    var: Var,
    constraints: Vec<Constraint>,
}

impl VarPattern {
    /// The variable this pattern is rooted at.
    pub fn var(&self) -> &Var {
        &self.var
    }

    /// Bind the variable to a concrete concept id.
    pub fn id(mut self, id: impl Into<ConceptId>) -> Self {
        self.constraints.push(Constraint::Id {
            var: self.var.clone(),
            id: id.into(),
        });
        self
    }

    /// Require the variable to be the schema type with this label.
    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.constraints.push(Constraint::Label {
            var: self.var.clone(),
            label: label.into(),
        });
        self
    }

    /// Require the value of the variable to satisfy the predicate.
    pub fn value(mut self, predicate: ValuePredicate) -> Self {
        self.constraints.push(Constraint::Value {
            var: self.var.clone(),
            predicate,
        });
        self
    }

    /// Require the variable to be an instance of the given type
    /// variable, absorbing any constraints on it.
    pub fn isa(mut self, type_pattern: VarPattern) -> Self {
        self.constraints.push(Constraint::Isa {
            instance: self.var.clone(),
            type_var: type_pattern.var.clone(),
        });
        self.constraints.extend(type_pattern.constraints);
        self
    }

    /// Add a role player to this relation variable, with no role
    /// restriction.
    pub fn rel(mut self, player: VarPattern) -> Self {
        self.constraints.push(Constraint::RolePlayer {
            relation: self.var.clone(),
            player: player.var.clone(),
            role: None,
        });
        self.constraints.extend(player.constraints);
        self
    }

    /// Add a role player to this relation variable, restricted to the
    /// named role type.
    pub fn rel_role(mut self, role: impl Into<Label>, player: VarPattern) -> Self {
        self.constraints.push(Constraint::RolePlayer {
            relation: self.var.clone(),
            player: player.var.clone(),
            role: Some(role.into()),
        });
        self.constraints.extend(player.constraints);
        self
    }

    /// Require this relation type variable to relate the given role
    /// type variable.
    pub fn relates(mut self, role_pattern: VarPattern) -> Self {
        self.constraints.push(Constraint::Relates {
            relation: self.var.clone(),
            role: role_pattern.var.clone(),
        });
        self.constraints.extend(role_pattern.constraints);
        self
    }

    /// Require this variable and the other to be distinct concepts.
    pub fn neq(mut self, other: VarPattern) -> Self {
        self.constraints.push(Constraint::Neq {
            left: self.var.clone(),
            right: other.var.clone(),
        });
        self.constraints.extend(other.constraints);
        self
    }
}

impl From<VarPattern> for Pattern {
    fn from(vp: VarPattern) -> Self {
        Pattern::And(vp.constraints.into_iter().map(Pattern::Constraint).collect())
    }
}
