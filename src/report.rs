use log::warn;
use std::collections::BTreeMap;

use crate::data::{AssignmentEdge, AssignmentResult, Conflict, ConflictKind, ConstraintPair};
use crate::graph::ConstraintGraph;
use crate::instance::Instance;
use crate::solver::PartialResult;

/// Projects the solved graph into the final result. `findings` are the
/// validator's issues; the builder's conflicts are appended after them.
pub fn report(
    instance: &Instance,
    graph: &ConstraintGraph,
    partial: &PartialResult,
    findings: Vec<Conflict>,
) -> AssignmentResult {
    let assignments: Vec<AssignmentEdge> = graph
        .edges()
        .iter()
        .zip(&partial.allocations)
        .filter(|(_, hours)| **hours > 0)
        .map(|(e, &hours)| AssignmentEdge {
            assistant: e.assistant,
            course: e.course,
            hours,
        })
        .collect();

    let mut covered = vec![0u64; instance.n_courses()];
    for edge in &assignments {
        covered[edge.course] += edge.hours as u64;
    }
    let unmet_demand: BTreeMap<_, _> = instance
        .courses()
        .map(|c| {
            let unmet = (instance.hours(c) as u64).saturating_sub(covered[c]);
            (c, unmet as u32)
        })
        .collect();

    let mut conflicts = findings;
    conflicts.extend(graph.conflicts().iter().cloned());

    for &pair in instance.required() {
        let honoured = assignments
            .iter()
            .any(|e| e.assistant == pair.assistant && e.course == pair.course);
        let explained = conflicts
            .iter()
            .any(|c| c.concerns(pair) && c.kind != ConflictKind::CapacityInfeasible);
        if !honoured && !explained {
            warn!("Required pair {} ended without hours.", pair);
            conflicts.push(Conflict::for_pair(
                ConflictKind::RequiredUnsatisfied,
                pair,
                format!("Required pair {} received no hours.", pair),
            ));
        }
    }

    let total_allocated = assignments.iter().map(|e| e.hours as u64).sum();
    let reused_assignments = assignments
        .iter()
        .filter(|e| instance.old_assignment(e.assistant) == Some(e.course))
        .count();

    AssignmentResult {
        assignments,
        unmet_demand,
        conflicts,
        total_allocated,
        reused_assignments,
        cost: partial.cost,
    }
}

/// Required pairs that the result does not cover with positive hours.
pub fn unsatisfied_required(instance: &Instance, result: &AssignmentResult) -> Vec<ConstraintPair> {
    instance
        .required()
        .iter()
        .copied()
        .filter(|&pair| result.hours_for(pair) == 0)
        .collect()
}

/// Checks a result against the hard invariants of the instance and returns a
/// description of every violation found.
pub fn verify(instance: &Instance, result: &AssignmentResult) -> Vec<String> {
    let mut violations = Vec::new();

    for edge in &result.assignments {
        if edge.assistant >= instance.n_assistants() || edge.course >= instance.n_courses() {
            violations.push(format!("edge {:?} is out of range", edge));
            continue;
        }
        if !instance.is_eligible(edge.assistant, edge.course) {
            violations.push(format!(
                "assistant {} is not eligible for course {}",
                edge.assistant, edge.course
            ));
        }
        if instance.is_forbidden(edge.assistant, edge.course) {
            violations.push(format!(
                "assistant {} is forbidden on course {}",
                edge.assistant, edge.course
            ));
        }
    }

    for a in instance.assistants() {
        let allocated = result.allocated_to_assistant(a);
        if allocated > instance.max_hours(a) as u64 {
            violations.push(format!(
                "assistant {} works {} hours, capacity {}",
                a,
                allocated,
                instance.max_hours(a)
            ));
        }
    }

    for c in instance.courses() {
        let allocated = result.allocated_to_course(c);
        let demand = instance.hours(c) as u64;
        if allocated > demand {
            violations.push(format!("course {} gets {} hours, demand {}", c, allocated, demand));
        }
        let unmet = result.unmet_demand.get(&c).copied().unwrap_or(0) as u64;
        if unmet != demand.saturating_sub(allocated) {
            violations.push(format!(
                "course {} reports {} unmet hours, expected {}",
                c,
                unmet,
                demand.saturating_sub(allocated)
            ));
        }
    }

    if result.conflicts.is_empty() {
        for pair in unsatisfied_required(instance, result) {
            violations.push(format!("required pair {} is missing without a conflict", pair));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::solver::solve_flow;
    use crate::validator::validate;

    fn run(instance: &Instance) -> AssignmentResult {
        let findings = validate(instance).into_issues();
        let graph = ConstraintGraph::build(instance);
        let partial = solve_flow(&graph, &SolverConfig::default());
        report(instance, &graph, &partial, findings)
    }

    #[test]
    fn lists_unmet_demand_for_every_course() {
        let instance = Instance::new(
            vec![2],
            vec![3, 0, 4],
            vec![vec![0], vec![0], vec![]],
            vec![],
            vec![],
            vec![None],
        )
        .unwrap();
        let result = run(&instance);
        assert_eq!(
            result.assignments,
            vec![AssignmentEdge {
                assistant: 0,
                course: 0,
                hours: 2
            }]
        );
        assert_eq!(result.unmet_demand.len(), 3);
        assert_eq!(result.unmet_demand[&0], 1);
        assert_eq!(result.unmet_demand[&1], 0);
        assert_eq!(result.unmet_demand[&2], 4);
        assert_eq!(result.total_allocated, 2);
        assert!(result.conflicts_of(ConflictKind::UnstaffableCourse).count() == 1);
        assert!(verify(&instance, &result).is_empty());
    }

    #[test]
    fn overcommitted_pair_is_not_reported_twice() {
        let instance = Instance::new(
            vec![1],
            vec![2, 2],
            vec![vec![0], vec![0]],
            vec![ConstraintPair::new(0, 0), ConstraintPair::new(0, 1)],
            vec![],
            vec![None],
        )
        .unwrap();
        let result = run(&instance);
        assert_eq!(result.conflicts_of(ConflictKind::MandatoryOvercommit).count(), 1);
        assert_eq!(result.conflicts_of(ConflictKind::RequiredUnsatisfied).count(), 0);
        assert_eq!(
            unsatisfied_required(&instance, &result),
            vec![ConstraintPair::new(0, 1)]
        );
    }

    #[test]
    fn counts_reused_assignments() {
        let instance = Instance::new(
            vec![2, 2],
            vec![2, 2],
            vec![vec![0, 1], vec![0, 1]],
            vec![],
            vec![],
            vec![Some(0), Some(0)],
        )
        .unwrap();
        let result = run(&instance);
        assert_eq!(result.reused_assignments, 1);
        assert_eq!(result.total_unmet(), 0);
    }

    #[test]
    fn verify_flags_broken_results() {
        let instance = Instance::new(
            vec![1],
            vec![1],
            vec![vec![0]],
            vec![],
            vec![ConstraintPair::new(0, 0)],
            vec![None],
        )
        .unwrap();
        let bogus = AssignmentResult {
            assignments: vec![AssignmentEdge {
                assistant: 0,
                course: 0,
                hours: 2,
            }],
            unmet_demand: BTreeMap::from([(0, 1)]),
            conflicts: vec![],
            total_allocated: 2,
            reused_assignments: 0,
            cost: 0,
        };
        let violations = verify(&instance, &bogus);
        assert_eq!(violations.len(), 4);
    }
}
