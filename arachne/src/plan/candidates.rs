// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Candidate fragment generation
//!
//! Each atomic constraint expands into the set of fragments that could
//! realize it. Point constraints expand to a single fragment; edge
//! constraints expand to one fragment per direction, and the planner
//! later picks whichever direction is cheaper under the binding order.

use crate::catalog::SchemaCatalog;
use crate::error::PlanError;
use crate::pattern::constraint::Constraint;
use crate::pattern::var::{Label, Var};
use crate::pattern::Conjunction;
use crate::plan::fragment::Fragment;

/// The admissible realizations of one constraint
///
/// Exactly one fragment out of each set appears in any plan.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    fragments: Vec<Fragment>,
}

impl CandidateSet {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        CandidateSet { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

/// Expand one constraint into its candidate fragments.
///
/// The enclosing conjunction is consulted for static type knowledge,
/// like a label constraint on the type side of an `isa`, which turns
/// into a subtype fan-out hint on the reverse fragment.
pub fn candidates_for(
    constraint: &Constraint,
    conjunction: &Conjunction,
    catalog: &dyn SchemaCatalog,
) -> Result<CandidateSet, PlanError> {
    let fragments = match constraint {
        Constraint::Id { var, id } => vec![Fragment::Id {
            var: var.clone(),
            id: id.clone(),
        }],
        Constraint::Label { var, label } => {
            if !catalog.is_known_type(label) {
                return Err(unknown_type(label, constraint));
            }
            vec![Fragment::Label {
                var: var.clone(),
                label: label.clone(),
            }]
        }
        Constraint::Value { var, predicate } => vec![Fragment::Value {
            var: var.clone(),
            predicate: predicate.clone(),
        }],
        Constraint::Isa { instance, type_var } => {
            let fan_out = match label_of(type_var, conjunction) {
                Some(label) => match catalog.subtypes(label) {
                    Some(subtypes) => Some(subtypes.len()),
                    None => return Err(unknown_type(label, constraint)),
                },
                None => None,
            };
            vec![
                Fragment::OutIsa {
                    instance: instance.clone(),
                    type_var: type_var.clone(),
                },
                Fragment::InIsa {
                    type_var: type_var.clone(),
                    instance: instance.clone(),
                    fan_out,
                },
            ]
        }
        Constraint::RolePlayer {
            relation,
            player,
            role,
        } => {
            if let Some(role) = role {
                if !catalog.is_known_type(role) {
                    return Err(unknown_type(role, constraint));
                }
            }
            vec![
                Fragment::OutRolePlayer {
                    relation: relation.clone(),
                    player: player.clone(),
                    role: role.clone(),
                },
                Fragment::InRolePlayer {
                    player: player.clone(),
                    relation: relation.clone(),
                    role: role.clone(),
                },
            ]
        }
        Constraint::Relates { relation, role } => vec![
            Fragment::OutRelates {
                relation: relation.clone(),
                role: role.clone(),
            },
            Fragment::InRelates {
                role: role.clone(),
                relation: relation.clone(),
            },
        ],
        Constraint::Neq { left, right } => vec![Fragment::Neq {
            left: left.clone(),
            right: right.clone(),
        }],
    };
    Ok(CandidateSet::new(fragments))
}

/// The label statically constraining `var`, if the conjunction has one.
pub(crate) fn label_of<'a>(var: &Var, conjunction: &'a Conjunction) -> Option<&'a Label> {
    conjunction.constraints().find_map(|c| match c {
        Constraint::Label {
            var: label_var,
            label,
        } if label_var == var => Some(label),
        _ => None,
    })
}

fn unknown_type(label: &Label, constraint: &Constraint) -> PlanError {
    PlanError::UnresolvableConstraint(format!(
        "type '{}' is not in the schema catalog (required by {})",
        label.as_str(),
        constraint
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::pattern::var::ConceptId;

    fn catalog() -> MemoryCatalog {
        let mut catalog = MemoryCatalog::new();
        catalog.insert_type("movie");
        catalog.insert_type("wife");
        catalog
    }

    fn conjunction(constraints: Vec<Constraint>) -> Conjunction {
        Conjunction::new(constraints)
    }

    #[test]
    fn test_id_constraint_yields_single_fragment() {
        let constraint = Constraint::Id {
            var: Var::from("x"),
            id: ConceptId::from("V1"),
        };
        let set = candidates_for(&constraint, &conjunction(vec![constraint.clone()]), &catalog())
            .unwrap();
        assert_eq!(set.fragments().len(), 1);
    }

    #[test]
    fn test_isa_constraint_yields_both_directions() {
        let constraint = Constraint::Isa {
            instance: Var::from("x"),
            type_var: Var::from("y"),
        };
        let set = candidates_for(&constraint, &conjunction(vec![constraint.clone()]), &catalog())
            .unwrap();
        assert_eq!(set.fragments().len(), 2);
        assert!(set
            .fragments()
            .iter()
            .any(|f| matches!(f, Fragment::OutIsa { .. })));
        assert!(set
            .fragments()
            .iter()
            .any(|f| matches!(f, Fragment::InIsa { fan_out: None, .. })));
    }

    #[test]
    fn test_label_on_type_side_becomes_fan_out_hint() {
        let isa = Constraint::Isa {
            instance: Var::from("x"),
            type_var: Var::from("y"),
        };
        let label = Constraint::Label {
            var: Var::from("y"),
            label: Label::from("movie"),
        };
        let set = candidates_for(&isa, &conjunction(vec![isa.clone(), label]), &catalog()).unwrap();
        assert!(set
            .fragments()
            .iter()
            .any(|f| matches!(f, Fragment::InIsa { fan_out: Some(1), .. })));
    }

    #[test]
    fn test_unknown_role_label_is_unresolvable() {
        let constraint = Constraint::RolePlayer {
            relation: Var::from("r"),
            player: Var::from("x"),
            role: Some(Label::from("captain")),
        };
        let result = candidates_for(&constraint, &conjunction(vec![constraint.clone()]), &catalog());
        assert!(matches!(
            result,
            Err(PlanError::UnresolvableConstraint(_))
        ));
    }
}
