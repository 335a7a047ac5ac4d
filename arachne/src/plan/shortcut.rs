// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shortcut rewrite pass
//!
//! When two role-player constraints share a relation variable that the
//! rest of the conjunction never uses, the relation does not need to be
//! materialized: the plan can hop directly between the two players.
//! This pass detects such pairs and replaces their candidate sets with
//! a combined shortcut fragment plus a distinctness guard between the
//! players, since two role slots must not collapse onto one edge. The
//! guard is withheld when the conjunction already states the same
//! distinctness itself.
//!
//! An `isa` chain typing the relation through a label-constrained type
//! variable is absorbed into the shortcut as a relation-type filter,
//! provided that type variable is not used anywhere else.

use crate::catalog::SchemaCatalog;
use crate::error::PlanError;
use crate::pattern::constraint::Constraint;
use crate::pattern::var::{Label, Var};
use crate::pattern::Conjunction;
use crate::plan::fragment::Fragment;
use std::collections::{BTreeMap, BTreeSet};

/// One detected merge: two role-player constraints collapsing into a
/// direct hop between `first` and `second`
#[derive(Debug, Clone)]
pub(crate) struct Merge {
    first: Var,
    second: Var,
    relation: Var,
    first_roles: Option<BTreeSet<Label>>,
    second_roles: Option<BTreeSet<Label>>,
    relation_types: Option<BTreeSet<Label>>,
    consumed: BTreeSet<Constraint>,
    guard_needed: bool,
}

impl Merge {
    /// The constraints this merge replaces.
    pub fn consumed(&self) -> &BTreeSet<Constraint> {
        &self.consumed
    }

    /// The two directed shortcut fragments realizing the merge.
    pub fn shortcut_candidates(&self) -> Vec<Fragment> {
        vec![
            Fragment::Shortcut {
                from: self.first.clone(),
                to: self.second.clone(),
                relation: self.relation.clone(),
                from_roles: self.first_roles.clone(),
                to_roles: self.second_roles.clone(),
                relation_types: self.relation_types.clone(),
            },
            Fragment::Shortcut {
                from: self.second.clone(),
                to: self.first.clone(),
                relation: self.relation.clone(),
                from_roles: self.second_roles.clone(),
                to_roles: self.first_roles.clone(),
                relation_types: self.relation_types.clone(),
            },
        ]
    }

    /// The injected distinctness guard between the two players, or
    /// `None` when the conjunction states that distinctness itself and
    /// the explicit check already covers it.
    pub fn guard(&self) -> Option<Fragment> {
        if !self.guard_needed {
            return None;
        }
        let (left, right) = if self.first <= self.second {
            (self.first.clone(), self.second.clone())
        } else {
            (self.second.clone(), self.first.clone())
        };
        Some(Fragment::Neq { left, right })
    }
}

/// Detect every mergeable role-player pair in the conjunction.
pub(crate) fn find_merges(
    conjunction: &Conjunction,
    catalog: &dyn SchemaCatalog,
) -> Result<Vec<Merge>, PlanError> {
    // Role-player constraints grouped by their relation variable
    let mut by_relation: BTreeMap<&Var, Vec<&Constraint>> = BTreeMap::new();
    for constraint in conjunction.constraints() {
        if let Constraint::RolePlayer { relation, .. } = constraint {
            by_relation.entry(relation).or_default().push(constraint);
        }
    }

    let mut merges = Vec::new();
    for (relation, role_pairs) in by_relation {
        // Only a pair of distinct players collapses into one hop. A
        // single role-player edge or three and more players all need
        // the relation itself.
        if role_pairs.len() != 2 {
            continue;
        }
        let (first, first_role) = role_pair_parts(role_pairs[0]);
        let (second, second_role) = role_pair_parts(role_pairs[1]);
        if first == second {
            continue;
        }

        let consumed_role_pairs: BTreeSet<Constraint> =
            role_pairs.iter().map(|c| (*c).clone()).collect();
        let absorbed = match absorbable_type_chain(relation, &consumed_role_pairs, conjunction) {
            TypeChain::None => None,
            TypeChain::Absorbable { isa, label_constraint, label } => {
                Some((isa, label_constraint, label))
            }
            // The relation variable is needed elsewhere, so the hop
            // cannot skip it
            TypeChain::RelationReferenced => continue,
        };

        let mut consumed = consumed_role_pairs;
        let relation_types = match absorbed {
            Some((isa, label_constraint, label)) => {
                let types = catalog.subtypes(label).ok_or_else(|| {
                    PlanError::UnresolvableConstraint(format!(
                        "type '{}' is not in the schema catalog (required by {})",
                        label.as_str(),
                        label_constraint
                    ))
                })?;
                consumed.insert(isa.clone());
                consumed.insert(label_constraint.clone());
                Some(types)
            }
            None => None,
        };

        // An explicit distinctness constraint between the players gets
        // its own candidate set, making the injected guard a duplicate
        let guard_needed = !conjunction.constraints().any(|c| {
            matches!(c, Constraint::Neq { left, right }
                if (left == first && right == second) || (left == second && right == first))
        });

        let merge = Merge {
            first: first.clone(),
            second: second.clone(),
            relation: relation.clone(),
            first_roles: role_closure(first_role, role_pairs[0], catalog)?,
            second_roles: role_closure(second_role, role_pairs[1], catalog)?,
            relation_types,
            consumed,
            guard_needed,
        };
        log::debug!(
            "merging role-player pair on {} into shortcut {} <-> {}",
            relation,
            merge.first,
            merge.second
        );
        merges.push(merge);
    }
    Ok(merges)
}

fn role_pair_parts(constraint: &Constraint) -> (&Var, Option<&Label>) {
    match constraint {
        Constraint::RolePlayer { player, role, .. } => (player, role.as_ref()),
        _ => unreachable!("grouped constraints are role pairs"),
    }
}

fn role_closure(
    role: Option<&Label>,
    constraint: &Constraint,
    catalog: &dyn SchemaCatalog,
) -> Result<Option<BTreeSet<Label>>, PlanError> {
    match role {
        Some(label) => {
            let closure = catalog.subtypes(label).ok_or_else(|| {
                PlanError::UnresolvableConstraint(format!(
                    "type '{}' is not in the schema catalog (required by {})",
                    label.as_str(),
                    constraint
                ))
            })?;
            Ok(Some(closure))
        }
        None => Ok(None),
    }
}

enum TypeChain<'a> {
    /// The relation variable appears nowhere else
    None,
    /// The relation is typed by an isa into a label-constrained type
    /// variable that nothing else uses
    Absorbable {
        isa: &'a Constraint,
        label_constraint: &'a Constraint,
        label: &'a Label,
    },
    /// The relation variable has other uses and must be materialized
    RelationReferenced,
}

fn absorbable_type_chain<'a>(
    relation: &Var,
    consumed_role_pairs: &BTreeSet<Constraint>,
    conjunction: &'a Conjunction,
) -> TypeChain<'a> {
    let others: Vec<&Constraint> = conjunction
        .constraints()
        .filter(|c| !consumed_role_pairs.contains(*c))
        .filter(|c| c.vars().contains(relation))
        .collect();
    if others.is_empty() {
        return TypeChain::None;
    }

    // The only absorbable shape is a single `$r isa $t` where $t is
    // used by exactly one label constraint and nothing else.
    let isa = match others.as_slice() {
        [only @ Constraint::Isa { instance, .. }] if *instance == *relation => *only,
        _ => return TypeChain::RelationReferenced,
    };
    let type_var = match isa {
        Constraint::Isa { type_var, .. } => type_var,
        _ => unreachable!(),
    };

    let type_var_uses: Vec<&Constraint> = conjunction
        .constraints()
        .filter(|c| *c != isa && c.vars().contains(type_var))
        .collect();
    match type_var_uses.as_slice() {
        [only @ Constraint::Label { var, label }] if *var == *type_var => TypeChain::Absorbable {
            isa,
            label_constraint: *only,
            label,
        },
        _ => TypeChain::RelationReferenced,
    }
}
