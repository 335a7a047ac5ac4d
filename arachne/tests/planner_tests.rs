//! Traversal planner behavior tests
//!
//! Covers relative cost ordering of hand-built traversals, ordering
//! enumeration, near-optimality of the greedy search against the
//! exhaustive reference planner, the shortcut rewrite, and failure
//! handling for unplannable patterns.

use arachne::{
    and, or, plan, var, ConceptId, Conjunction, ConjunctionQuery, Fragment, MemoryCatalog,
    Pattern, PlanError, ReferencePlanner, TraversalPlan, TraversalPlanner, ValuePredicate, Var,
};
use std::collections::BTreeSet;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Schema fixture: flat types, so every subtype closure is the type
/// itself.
fn catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert_type("movie");
    catalog.insert_type("person");
    catalog.insert_type("title");
    catalog.insert_type("marriage");
    catalog.insert_type("wife");
    catalog.insert_type("husband");
    catalog
}

fn id(var_name: &str, concept: &str) -> Fragment {
    Fragment::Id {
        var: Var::from(var_name),
        id: ConceptId::from(concept),
    }
}

fn value_gt(var_name: &str, value: i64) -> Fragment {
    Fragment::Value {
        var: Var::from(var_name),
        predicate: ValuePredicate::gt(value),
    }
}

fn out_isa(instance: &str, type_var: &str) -> Fragment {
    Fragment::OutIsa {
        instance: Var::from(instance),
        type_var: Var::from(type_var),
    }
}

fn in_isa(type_var: &str, instance: &str) -> Fragment {
    Fragment::InIsa {
        type_var: Var::from(type_var),
        instance: Var::from(instance),
        fan_out: None,
    }
}

fn out_relates(relation: &str, role: &str) -> Fragment {
    Fragment::OutRelates {
        relation: Var::from(relation),
        role: Var::from(role),
    }
}

fn in_relates(role: &str, relation: &str) -> Fragment {
    Fragment::InRelates {
        role: Var::from(role),
        relation: Var::from(relation),
    }
}

fn out_role_player(relation: &str, player: &str) -> Fragment {
    Fragment::OutRolePlayer {
        relation: Var::from(relation),
        player: Var::from(player),
        role: None,
    }
}

fn in_role_player(player: &str, relation: &str) -> Fragment {
    Fragment::InRolePlayer {
        player: Var::from(player),
        relation: Var::from(relation),
        role: None,
    }
}

fn traversal(fragments: Vec<Fragment>) -> TraversalPlan {
    TraversalPlan::new([fragments])
}

fn assert_faster(fast: &TraversalPlan, slow: &TraversalPlan) {
    let fast_complexity = fast.complexity();
    let slow_complexity = slow.complexity();
    assert!(
        fast_complexity < slow_complexity,
        "expected\n{}:\t{}\nto be faster than\n{}:\t{}",
        fast_complexity,
        fast,
        slow_complexity,
        slow
    );
}

fn assert_nearly_optimal(pattern: impl Into<Pattern>) {
    let pattern = pattern.into();
    let greedy = plan(&pattern, &catalog()).unwrap();
    let optimum = ReferencePlanner::new()
        .optimal(&pattern, &catalog())
        .unwrap();
    let complexity = greedy.complexity();
    let global_complexity = optimum.complexity();
    // Compared on a log scale: same order of magnitude passes
    assert!(
        complexity.ln() < global_complexity.ln() * 2.0,
        "expected\n {}:\t{}\nto be similar speed to\n {}:\t{}",
        complexity,
        greedy,
        global_complexity,
        optimum
    );
}

fn only_conjunction(pattern: impl Into<Pattern>) -> Conjunction {
    let dnf = pattern.into().disjunctive_normal_form().unwrap();
    assert_eq!(dnf.len(), 1);
    dnf.into_iter().next().unwrap()
}

// --- relative cost of hand-built traversals ---

#[test]
fn test_index_lookup_is_faster_than_isa_scan() {
    let index = traversal(vec![id("x", "Titanic")]);
    let isa_scan = traversal(vec![id("y", "movie"), in_isa("y", "x")]);
    assert_faster(&index, &isa_scan);
}

#[test]
fn test_isa_from_bound_type_is_faster_than_isa_from_unbound_instance() {
    let from_type = traversal(vec![id("y", "movie"), in_isa("y", "x")]);
    let from_instance = traversal(vec![out_isa("x", "y"), id("y", "movie")]);
    assert_faster(&from_type, &from_instance);
}

#[test]
fn test_connected_sequence_is_faster_than_restarting() {
    let connected = traversal(vec![out_isa("x", "y"), out_isa("y", "z")]);
    let disconnected = traversal(vec![out_isa("x", "y"), in_isa("z", "y")]);
    assert_faster(&connected, &disconnected);
}

#[test]
fn test_globally_optimal_ordering_beats_locally_optimal() {
    let locally_optimal = traversal(vec![id("y", "movie"), in_isa("y", "x"), id("x", "Titanic")]);
    let globally_optimal = traversal(vec![id("x", "Titanic"), out_isa("x", "y"), id("y", "movie")]);
    assert_faster(&globally_optimal, &locally_optimal);
}

#[test]
fn test_relates_is_faster_from_the_role_type() {
    let from_relation_type = traversal(vec![id("y", "V1"), out_relates("y", "x"), id("x", "V2")]);
    let from_role_type = traversal(vec![id("x", "V2"), in_relates("x", "y"), id("y", "V1")]);
    assert_faster(&from_role_type, &from_relation_type);
}

#[test]
fn test_value_filtering_beats_a_non_filtering_start() {
    let value_filter_first = traversal(vec![
        value_gt("x", 1),
        in_role_player("x", "b"),
        out_role_player("b", "y"),
        out_isa("y", "z"),
    ]);
    let hops_first = traversal(vec![
        out_isa("y", "z"),
        in_role_player("y", "b"),
        out_role_player("b", "x"),
        value_gt("x", 1),
    ]);
    assert_faster(&value_filter_first, &hops_first);
}

// --- ordering enumeration ---

#[test]
fn test_simple_query_has_exactly_twelve_valid_orderings() {
    let conjunction = only_conjunction(var("x").id("Titanic").isa(var("y").id("movie")));
    let query = ConjunctionQuery::new(conjunction, &catalog()).unwrap();
    let orderings: BTreeSet<Vec<Fragment>> = query.orderings().collect();

    let x_id = || id("x", "Titanic");
    let y_id = || id("y", "movie");
    let x_isa_y = || out_isa("x", "y");
    let y_type_of_x = || in_isa("y", "x");
    let expected: BTreeSet<Vec<Fragment>> = [
        vec![x_id(), x_isa_y(), y_id()],
        vec![x_id(), y_type_of_x(), y_id()],
        vec![x_id(), y_id(), x_isa_y()],
        vec![x_id(), y_id(), y_type_of_x()],
        vec![x_isa_y(), x_id(), y_id()],
        vec![x_isa_y(), y_id(), x_id()],
        vec![y_type_of_x(), x_id(), y_id()],
        vec![y_type_of_x(), y_id(), x_id()],
        vec![y_id(), x_id(), x_isa_y()],
        vec![y_id(), x_id(), y_type_of_x()],
        vec![y_id(), x_isa_y(), x_id()],
        vec![y_id(), y_type_of_x(), x_id()],
    ]
    .into_iter()
    .collect();

    assert_eq!(orderings.len(), 12);
    assert_eq!(orderings, expected);
}

// --- near-optimality of the greedy search ---

#[test]
fn test_greedy_is_nearly_optimal_for_a_short_query() {
    init_logs();
    assert_nearly_optimal(var("x").isa(var("y").id("movie")));
}

#[test]
fn test_greedy_is_nearly_optimal_with_both_ids_bound() {
    assert_nearly_optimal(var("x").id("Titanic").isa(var("y").id("movie")));
}

#[test]
fn test_greedy_is_nearly_optimal_with_a_value_constraint() {
    assert_nearly_optimal(
        var("x")
            .value(ValuePredicate::eq("hello"))
            .isa(var("y").id("movie")),
    );
}

#[test]
fn test_greedy_is_nearly_optimal_for_an_attached_attribute() {
    init_logs();
    assert_nearly_optimal(
        var("r")
            .rel(var("x").isa(var("y").id("movie")))
            .rel(
                var("z")
                    .value(ValuePredicate::eq("Titanic"))
                    .isa(var("a").id("title")),
            ),
    );
}

// --- relative cost of produced plans ---

#[test]
fn test_planned_id_lookup_is_cheaper_than_planned_type_scan() {
    let by_id = plan(&Pattern::from(var("x").id("V1")), &catalog()).unwrap();
    let by_membership = plan(&Pattern::from(var("x").isa(var("y"))), &catalog()).unwrap();
    assert!(by_id.complexity() < by_membership.complexity());
}

#[test]
fn test_connected_constraints_plan_cheaper_than_disconnected() {
    // Same two constraints; only the shared variable differs
    let connected = plan(&Pattern::from(var("x").id("V1").isa(var("y"))), &catalog()).unwrap();
    let disconnected = plan(
        &and([
            Pattern::from(var("x").id("V1")),
            Pattern::from(var("z").isa(var("w"))),
        ]),
        &catalog(),
    )
    .unwrap();
    assert!(connected.complexity() < disconnected.complexity());
}

#[test]
fn test_optimal_plan_starts_with_the_identifier_lookup() {
    let pattern = Pattern::from(var("x").id("Titanic").isa(var("y").id("movie")));
    let optimum = ReferencePlanner::new().optimal(&pattern, &catalog()).unwrap();
    let greedy = plan(&pattern, &catalog()).unwrap();
    for produced in [optimum, greedy] {
        let first = &produced.sequences().next().unwrap()[0];
        match first {
            Fragment::Id { var, .. } => assert_eq!(var, &Var::from("x")),
            other => panic!("expected an id lookup first, got {}", other),
        }
    }
}

#[test]
fn test_planned_relates_walks_from_the_role_type() {
    let produced = plan(
        &Pattern::from(var("m").label("marriage").relates(var("w").label("wife"))),
        &catalog(),
    )
    .unwrap();
    let sequence = produced.sequences().next().unwrap();
    assert!(matches!(sequence.last(), Some(Fragment::InRelates { .. })));
    assert_eq!(
        produced.to_string(),
        "{$m[label:marriage] $w[label:wife]<-[relates]-$m}"
    );
}

// --- the shortcut rewrite ---

#[test]
fn test_unary_relation_plans_a_role_player_edge() {
    let produced = plan(&Pattern::from(var("x").rel(var("y"))), &catalog()).unwrap();
    assert_eq!(produced.to_string(), "{$x-[role-player]->$y}");
}

#[test]
fn test_binary_relation_plans_a_shortcut_with_a_distinctness_guard() {
    init_logs();
    let produced = plan(
        &Pattern::from(var("x").rel(var("y")).rel(var("z"))),
        &catalog(),
    )
    .unwrap();
    let expected =
        regex::Regex::new(r"^\{\$(y|z)-\[shortcut:\$x]->\$(y|z) \$y\[neq:\$z]}$").unwrap();
    let rendering = produced.to_string();
    assert!(expected.is_match(&rendering), "unexpected plan: {}", rendering);
}

#[test]
fn test_typed_binary_relation_carries_the_relation_filter() {
    let produced = plan(
        &Pattern::from(
            var("x")
                .rel(var("y"))
                .rel(var("z"))
                .isa(var("t").label("marriage")),
        ),
        &catalog(),
    )
    .unwrap();
    let expected = regex::Regex::new(
        r"^\{\$(y|z)-\[shortcut:\$x rels:marriage]->\$(y|z) \$y\[neq:\$z]}$",
    )
    .unwrap();
    let rendering = produced.to_string();
    assert!(expected.is_match(&rendering), "unexpected plan: {}", rendering);
    // The isa chain is absorbed, leaving just the hop and the guard
    assert_eq!(produced.sequences().next().unwrap().len(), 2);
}

#[test]
fn test_role_restricted_relation_carries_the_role_filter() {
    let produced = plan(
        &Pattern::from(var("x").rel(var("y")).rel_role("wife", var("z"))),
        &catalog(),
    )
    .unwrap();
    let rendering = produced.to_string();
    assert!(rendering.contains("shortcut"), "unexpected plan: {}", rendering);
    assert!(rendering.contains("roles:wife"), "unexpected plan: {}", rendering);
}

#[test]
fn test_stated_distinctness_is_not_checked_twice() {
    let produced = plan(
        &and([
            Pattern::from(var("x").rel(var("y")).rel(var("z"))),
            Pattern::from(var("y").neq(var("z"))),
        ]),
        &catalog(),
    )
    .unwrap();
    let sequence = produced.sequences().next().unwrap();
    let checks = sequence
        .iter()
        .filter(|fragment| matches!(fragment, Fragment::Neq { .. }))
        .count();
    assert_eq!(checks, 1);
    assert_eq!(produced.to_string(), "{$y-[shortcut:$x]->$z $y[neq:$z]}");
}

#[test]
fn test_relation_used_elsewhere_is_not_merged_away() {
    let produced = plan(
        &Pattern::from(var("x").rel(var("y")).rel(var("z")).id("V123")),
        &catalog(),
    )
    .unwrap();
    let rendering = produced.to_string();
    assert!(!rendering.contains("shortcut"), "unexpected plan: {}", rendering);
    assert!(rendering.contains("role-player"), "unexpected plan: {}", rendering);
}

#[test]
fn test_ternary_relation_is_not_merged_away() {
    let produced = plan(
        &Pattern::from(var("x").rel(var("a")).rel(var("b")).rel(var("c"))),
        &catalog(),
    )
    .unwrap();
    let rendering = produced.to_string();
    assert!(!rendering.contains("shortcut"), "unexpected plan: {}", rendering);
}

#[test]
fn test_merged_plans_still_satisfy_dependencies() {
    let produced = plan(
        &Pattern::from(var("x").rel(var("y")).rel_role("wife", var("z"))),
        &catalog(),
    )
    .unwrap();
    assert_dependency_validity(&produced);
}

// --- plan-wide properties ---

fn assert_dependency_validity(produced: &TraversalPlan) {
    for sequence in produced.sequences() {
        let mut bound: BTreeSet<&Var> = BTreeSet::new();
        for fragment in sequence {
            for dep in fragment.dependencies() {
                assert!(
                    bound.contains(dep),
                    "fragment {} depends on unbound {} in {}",
                    fragment,
                    dep,
                    produced
                );
            }
            bound.extend(fragment.binds());
        }
    }
}

#[test]
fn test_every_produced_sequence_satisfies_dependencies() {
    let patterns: Vec<Pattern> = vec![
        var("x").id("Titanic").isa(var("y").id("movie")).into(),
        var("x").rel(var("y")).rel(var("z")).into(),
        and([
            Pattern::from(var("x").id("V1")),
            Pattern::from(var("y").id("V2")),
            Pattern::from(var("x").neq(var("y"))),
        ]),
        or([
            Pattern::from(var("x").id("V1")),
            Pattern::from(var("y").label("movie")),
        ]),
    ];
    for pattern in patterns {
        let produced = plan(&pattern, &catalog()).unwrap();
        assert_dependency_validity(&produced);
    }
}

#[test]
fn test_planning_twice_renders_byte_identical_plans() {
    let pattern = Pattern::from(var("x").id("Titanic").isa(var("y").id("movie")));
    let first = plan(&pattern, &catalog()).unwrap();
    let second = plan(&pattern, &catalog()).unwrap();
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first, second);
}

#[test]
fn test_disjunct_order_does_not_change_the_plan() {
    let a = Pattern::from(var("x").id("V1"));
    let b = Pattern::from(var("y").label("movie"));
    let forward = plan(&or([a.clone(), b.clone()]), &catalog()).unwrap();
    let backward = plan(&or([b, a]), &catalog()).unwrap();
    assert_eq!(forward.to_string(), backward.to_string());
}

#[test]
fn test_disjunction_produces_one_sequence_per_disjunct() {
    let disjuncts = [
        Pattern::from(var("x").id("V1")),
        Pattern::from(var("y").label("movie")),
        Pattern::from(var("z").value(ValuePredicate::gt(5i64))),
    ];
    let combined = plan(&or(disjuncts.clone()), &catalog()).unwrap();
    assert_eq!(combined.sequence_count(), 3);

    let product: f64 = disjuncts
        .iter()
        .map(|p| plan(p, &catalog()).unwrap().complexity())
        .product();
    let combined_complexity = combined.complexity();
    assert!(
        (combined_complexity - product).abs() <= product * 1e-12,
        "expected complexity {} to equal the product {}",
        combined_complexity,
        product
    );
}

// --- failure handling ---

#[test]
fn test_unknown_role_label_is_unresolvable() {
    let result = plan(
        &Pattern::from(var("x").rel_role("captain", var("y"))),
        &catalog(),
    );
    assert!(matches!(result, Err(PlanError::UnresolvableConstraint(_))));
}

#[test]
fn test_unknown_type_label_is_unresolvable() {
    let result = plan(&Pattern::from(var("x").label("starship")), &catalog());
    assert!(matches!(result, Err(PlanError::UnresolvableConstraint(_))));
}

#[test]
fn test_distinctness_alone_is_unresolvable() {
    // Nothing can ever bind either side of the check
    let result = plan(&Pattern::from(var("x").neq(var("y"))), &catalog());
    assert!(matches!(result, Err(PlanError::UnresolvableConstraint(_))));
}

#[test]
fn test_negation_is_malformed() {
    let inner = Pattern::from(var("x").id("V1"));
    let result = plan(&Pattern::Not(Box::new(inner)), &catalog());
    assert!(matches!(result, Err(PlanError::MalformedPattern(_))));
}

#[test]
fn test_empty_combinators_are_malformed() {
    assert!(matches!(
        plan(&Pattern::And(vec![]), &catalog()),
        Err(PlanError::MalformedPattern(_))
    ));
    assert!(matches!(
        plan(&Pattern::Or(vec![]), &catalog()),
        Err(PlanError::MalformedPattern(_))
    ));
}

#[test]
fn test_failures_are_reported_before_any_plan_is_built() {
    // One bad disjunct poisons the whole pattern
    let good = Pattern::from(var("x").id("V1"));
    let bad = Pattern::from(var("y").label("starship"));
    let result = plan(&or([good, bad]), &catalog());
    assert!(matches!(result, Err(PlanError::UnresolvableConstraint(_))));
}

// --- planner configuration ---

#[test]
fn test_tuned_config_changes_costs_but_not_validity() {
    let mut config = arachne::CostConfig::default();
    config.graph_size_estimate = 100.0;
    // An unbound membership scan restarts against the whole graph, so
    // the estimate is a factor of the planned cost
    let pattern = Pattern::from(var("x").isa(var("y")));
    let tuned = TraversalPlanner::with_config(config)
        .plan(&pattern, &catalog())
        .unwrap();
    let stock = TraversalPlanner::new().plan(&pattern, &catalog()).unwrap();
    assert_dependency_validity(&tuned);
    assert!(tuned.complexity() < stock.complexity());
}
