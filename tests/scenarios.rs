use ta_solver::report::verify;
use ta_solver::{
    AssignmentEdge, ConflictKind, ConstraintPair, Engine, EngineConfig, EngineError, Instance,
    InstanceInput, solve, validate,
};

fn edge(assistant: usize, course: usize, hours: u32) -> AssignmentEdge {
    AssignmentEdge {
        assistant,
        course,
        hours,
    }
}

fn pairs(list: &[(usize, usize)]) -> Vec<ConstraintPair> {
    list.iter().copied().map(ConstraintPair::from).collect()
}

#[test]
fn previous_holder_is_filled_before_newcomer() {
    let instance = Instance::new(
        vec![5, 5],
        vec![8],
        vec![vec![0, 1]],
        vec![],
        vec![],
        vec![Some(0), None],
    )
    .unwrap();
    let result = solve(&instance).unwrap();
    assert_eq!(result.assignments, vec![edge(0, 0, 5), edge(1, 0, 3)]);
    assert_eq!(result.unmet_demand[&0], 0);
    assert!(result.conflicts.is_empty());
    assert_eq!(result.reused_assignments, 1);
    assert!(verify(&instance, &result).is_empty());
}

#[test]
fn required_pair_beyond_capacity_degrades_gracefully() {
    let instance = Instance::new(
        vec![3],
        vec![5],
        vec![vec![0]],
        pairs(&[(0, 0)]),
        vec![],
        vec![None],
    )
    .unwrap();
    let result = solve(&instance).unwrap();
    assert_eq!(result.assignments, vec![edge(0, 0, 3)]);
    assert_eq!(result.unmet_demand[&0], 2);
    assert_eq!(result.conflicts_of(ConflictKind::CapacityInfeasible).count(), 1);
    assert!(verify(&instance, &result).is_empty());
}

#[test]
fn contradictory_pair_stops_before_solving() {
    let instance = Instance::new(
        vec![3],
        vec![3],
        vec![vec![0]],
        pairs(&[(0, 0)]),
        pairs(&[(0, 0)]),
        vec![None],
    )
    .unwrap();
    let report = validate(&instance);
    assert!(report.has_errors());
    assert!(report.contains(ConflictKind::ContradictoryConstraint));
    assert!(matches!(solve(&instance), Err(EngineError::Invalid(_))));
}

#[test]
fn more_reused_pairs_win_between_symmetric_assignments() {
    // Three assistants, three courses, everyone eligible everywhere and each
    // course needs exactly one assistant's hours.
    let instance = Instance::new(
        vec![2, 2, 2],
        vec![2, 2, 2],
        vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2]],
        vec![],
        vec![],
        vec![Some(2), Some(0), Some(1)],
    )
    .unwrap();
    let result = solve(&instance).unwrap();
    assert_eq!(
        result.assignments,
        vec![edge(0, 2, 2), edge(1, 0, 2), edge(2, 1, 2)]
    );
    assert_eq!(result.reused_assignments, 3);
    assert_eq!(result.cost, 0);
}

#[test]
fn forbidden_pair_is_never_used() {
    let instance = Instance::new(
        vec![10, 1],
        vec![4],
        vec![vec![0, 1]],
        vec![],
        pairs(&[(0, 0)]),
        vec![Some(0), None],
    )
    .unwrap();
    let result = solve(&instance).unwrap();
    assert_eq!(result.assignments, vec![edge(1, 0, 1)]);
    assert_eq!(result.unmet_demand[&0], 3);
    assert!(verify(&instance, &result).is_empty());
}

#[test]
fn required_pair_is_honoured_even_when_history_points_elsewhere() {
    let instance = Instance::new(
        vec![4, 4],
        vec![4, 4],
        vec![vec![0, 1], vec![0, 1]],
        pairs(&[(1, 0)]),
        vec![],
        vec![Some(0), Some(1)],
    )
    .unwrap();
    let result = solve(&instance).unwrap();
    assert!(result.hours_for(ConstraintPair::new(1, 0)) > 0);
    assert!(result.conflicts.is_empty());
    assert_eq!(result.total_unmet(), 0);
}

#[test]
fn unstaffable_course_keeps_full_demand() {
    let instance = Instance::new(
        vec![6],
        vec![3, 2],
        vec![vec![0], vec![]],
        vec![],
        vec![],
        vec![None],
    )
    .unwrap();
    let result = solve(&instance).unwrap();
    assert_eq!(result.unmet_demand[&1], 2);
    assert_eq!(result.unmet_demand[&0], 0);
    assert_eq!(result.conflicts_of(ConflictKind::UnstaffableCourse).count(), 1);
}

#[test]
fn strict_policy_is_a_boundary_choice() {
    let instance = Instance::new(
        vec![2],
        vec![1, 1, 1],
        vec![vec![0], vec![0], vec![0]],
        pairs(&[(0, 0), (0, 1), (0, 2)]),
        vec![],
        vec![None],
    )
    .unwrap();
    let lenient = solve(&instance).unwrap();
    assert_eq!(lenient.conflicts_of(ConflictKind::MandatoryOvercommit).count(), 1);
    assert_eq!(lenient.total_allocated, 2);

    let strict = Engine::new(EngineConfig::strict()).unwrap();
    match strict.solve(&instance) {
        Err(EngineError::RequiredUnsatisfied(missing)) => {
            assert_eq!(missing, vec![ConstraintPair::new(0, 2)]);
        }
        other => panic!("expected strict failure, got {other:?}"),
    }
}

#[test]
fn json_instance_solves_end_to_end() {
    let json = r#"{
        "nAssistants": 3,
        "nCourses": 2,
        "maxHours": [10, 4, 6],
        "hours": [8, 9],
        "courseAssistants": [[0, 1], [0, 2]],
        "required": [[1, 0]],
        "forbidden": [[2, 0]],
        "oldAssignments": [1, null, 1]
    }"#;
    let input: InstanceInput = serde_json::from_str(json).unwrap();
    let instance = Instance::try_from(input).unwrap();
    let result = solve(&instance).unwrap();

    assert!(result.hours_for(ConstraintPair::new(1, 0)) > 0);
    assert_eq!(result.total_allocated, 17);
    assert_eq!(result.total_unmet(), 0);
    // Course 0 is covered by newcomers only (the required pair plus assistant
    // 0), course 1 is shared between its two previous holders.
    assert_eq!(result.hours_for(ConstraintPair::new(0, 0)), 4);
    assert_eq!(result.hours_for(ConstraintPair::new(0, 1)), 6);
    assert_eq!(result.hours_for(ConstraintPair::new(2, 1)), 3);
    assert_eq!(result.cost, 8);
    assert!(verify(&instance, &result).is_empty());
}
