//! The residual transportation problem as a linear program, solved with
//! HiGHS through `good_lp`.
//!
//! The constraint matrix is totally unimodular, so an optimal vertex is
//! integral and rounding is exact. Ties between equally good assignments are
//! left to HiGHS; only the flow backend guarantees the assistant/course
//! tie-break.

use good_lp::{
    Expression, ProblemVariables, Solution, SolverModel, Variable, constraint, default_solver,
    variable,
};
use itertools::Itertools;
use log::{info, trace};

use crate::config::SolverConfig;
use crate::data::Hours;
use crate::error::EngineError;
use crate::graph::ConstraintGraph;

use super::PartialResult;

pub fn solve_lp(
    graph: &ConstraintGraph,
    config: &SolverConfig,
) -> Result<PartialResult, EngineError> {
    if config.load_balance_weight > 0 {
        return Err(EngineError::Backend(
            "load balancing needs the flow backend".to_string(),
        ));
    }

    let mut problem = ProblemVariables::new();
    let vars: Vec<Variable> = problem.add_vector(variable().min(0), graph.edges().len());

    // Coverage outweighs any saving in change cost: one extra hour can
    // displace at most one hour per edge on an alternating path.
    let path_bound = (graph.n_assistants() + graph.n_courses() + 1) as f64;
    let coverage_weight = config.change_cost as f64 * path_bound + 1.0;

    let objective: Expression = graph
        .edges()
        .iter()
        .zip(&vars)
        .map(|(e, &v)| {
            let cost = if e.continuity { 0.0 } else { config.change_cost as f64 };
            (coverage_weight - cost) * v
        })
        .sum();

    info!(
        "Setting up LP with {} edge variables over {} assistants and {} courses...",
        vars.len(),
        graph.n_assistants(),
        graph.n_courses()
    );
    let mut model = problem
        .maximise(objective)
        .using(default_solver)
        .set_option("threads", 1) // single thread keeps runs reproducible
        .set_option("random_seed", 1234)
        .set_option("log_to_console", "false");

    let by_assistant = graph
        .edges()
        .iter()
        .zip(&vars)
        .map(|(e, &v)| (e.assistant, v))
        .into_group_map();
    for (assistant, assistant_vars) in by_assistant.into_iter().sorted_by_key(|(a, _)| *a) {
        let load: Expression = assistant_vars.into_iter().sum();
        let capacity = graph.remaining_capacity(assistant) as f64;
        model.add_constraint(constraint!(load <= capacity));
    }

    let by_course = graph
        .edges()
        .iter()
        .zip(&vars)
        .map(|(e, &v)| (e.course, v))
        .into_group_map();
    for (course, course_vars) in by_course.into_iter().sorted_by_key(|(c, _)| *c) {
        let covered: Expression = course_vars.into_iter().sum();
        let demand = graph.remaining_demand(course) as f64;
        model.add_constraint(constraint!(covered <= demand));
    }

    let solution = model
        .solve()
        .map_err(|e| EngineError::Backend(e.to_string()))?;

    let allocations: Vec<Hours> = graph
        .edges()
        .iter()
        .zip(&vars)
        .map(|(e, &v)| {
            let value = solution.value(v).round().max(0.0) as Hours;
            trace!("LP value for {}: {}", e.pair(), value);
            e.preallocated + value
        })
        .collect();

    Ok(PartialResult::new(graph, allocations, 0, config))
}
