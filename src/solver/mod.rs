pub mod flow;
#[cfg(feature = "lp")]
pub mod lp;

use log::info;
use std::time::Instant;

use crate::config::{Backend, MAX_LOAD_BALANCED_HOURS, SolverConfig};
use crate::data::Hours;
use crate::error::EngineError;
use crate::graph::ConstraintGraph;

pub use flow::solve_flow;

/// Hours per graph edge after solving, aligned with
/// [`ConstraintGraph::edges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    pub allocations: Vec<Hours>,
    /// Hours placed by the solver on top of the mandatory pre-allocation.
    pub flow: u64,
    /// Continuity cost of all allocated hours plus the load term.
    pub cost: i64,
    pub augmentations: usize,
}

impl PartialResult {
    pub fn new(
        graph: &ConstraintGraph,
        allocations: Vec<Hours>,
        augmentations: usize,
        config: &SolverConfig,
    ) -> Self {
        let preallocated: u64 = graph.edges().iter().map(|e| e.preallocated as u64).sum();
        let total: u64 = allocations.iter().map(|&h| h as u64).sum();
        let cost = objective(graph, &allocations, config);
        Self {
            allocations,
            flow: total - preallocated,
            cost,
            augmentations,
        }
    }
}

/// Value of the minimised objective for a set of allocations. Saturates at
/// `i64::MAX` instead of overflowing.
pub fn objective(graph: &ConstraintGraph, allocations: &[Hours], config: &SolverConfig) -> i64 {
    let change: i128 = graph
        .edges()
        .iter()
        .zip(allocations)
        .filter(|(e, _)| !e.continuity)
        .map(|(_, &h)| h as i128 * config.change_cost as i128)
        .sum();
    let mut per_assistant = vec![0i128; graph.n_assistants()];
    for (edge, &h) in graph.edges().iter().zip(allocations) {
        per_assistant[edge.assistant] += h as i128;
    }
    let load: i128 = per_assistant
        .iter()
        .map(|&h| config.load_balance_weight as i128 * h * (h - 1).max(0) / 2)
        .sum();
    i64::try_from(change + load).unwrap_or(i64::MAX)
}

/// Solves the graph with the configured backend.
pub fn solve(graph: &ConstraintGraph, config: &SolverConfig) -> Result<PartialResult, EngineError> {
    config.validate()?;
    if config.load_balance_weight > 0 {
        let hours = flow::load_balanced_hours(graph);
        if hours > MAX_LOAD_BALANCED_HOURS {
            return Err(EngineError::LoadBalanceTooLarge {
                hours,
                limit: MAX_LOAD_BALANCED_HOURS,
            });
        }
    }
    let start_time = Instant::now();
    let partial = match config.backend {
        Backend::Flow => solve_flow(graph, config),
        #[cfg(feature = "lp")]
        Backend::Lp => lp::solve_lp(graph, config)?,
        #[cfg(not(feature = "lp"))]
        Backend::Lp => {
            return Err(EngineError::Backend(
                "crate was built without the `lp` feature".to_string(),
            ));
        }
    };
    info!(
        "Solved in {:.2?}: {} hours placed, cost {}, {} augmentation(s).",
        start_time.elapsed(),
        partial.flow,
        partial.cost,
        partial.augmentations
    );
    Ok(partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::instance::Instance;

    fn single(max_hours: Hours, hours: Hours) -> ConstraintGraph {
        let instance = Instance::new(
            vec![max_hours],
            vec![hours],
            vec![vec![0]],
            vec![],
            vec![],
            vec![None],
        )
        .unwrap();
        ConstraintGraph::build(&instance)
    }

    #[test]
    fn objective_counts_changes_and_load() {
        let instance = Instance::new(
            vec![4, 4],
            vec![4],
            vec![vec![0, 1]],
            vec![],
            vec![],
            vec![Some(0), None],
        )
        .unwrap();
        let graph = ConstraintGraph::build(&instance);
        let config = SolverConfig {
            change_cost: 3,
            load_balance_weight: 2,
            ..SolverConfig::default()
        };
        // Assistant 0 keeps its course for 1 hour, assistant 1 changes for 3.
        // Load: 2 * (0) + 2 * (3 * 2 / 2).
        assert_eq!(objective(&graph, &[1, 3], &config), 9 + 6);
    }

    #[cfg(not(feature = "lp"))]
    #[test]
    fn lp_backend_needs_the_feature() {
        let graph = single(1, 1);
        let config = SolverConfig {
            backend: Backend::Lp,
            ..SolverConfig::default()
        };
        assert!(matches!(solve(&graph, &config), Err(EngineError::Backend(_))));
    }

    #[test]
    fn rejects_invalid_config() {
        let graph = single(1, 1);
        let config = SolverConfig {
            change_cost: -1,
            ..SolverConfig::default()
        };
        assert!(matches!(solve(&graph, &config), Err(EngineError::Config(_))));
    }

    #[test]
    fn objective_saturates_instead_of_overflowing() {
        let graph = single(u32::MAX, u32::MAX);
        let config = SolverConfig {
            change_cost: i64::MAX / 2,
            load_balance_weight: i64::MAX / 2,
            ..SolverConfig::default()
        };
        assert_eq!(objective(&graph, &[u32::MAX], &config), i64::MAX);
    }

    #[test]
    fn huge_change_cost_is_rejected_before_solving() {
        let graph = single(5, 5);
        let config = SolverConfig {
            change_cost: i64::MAX / 2,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve(&graph, &config),
            Err(EngineError::Config(ConfigError::ChangeCostTooLarge(_)))
        ));
    }

    #[test]
    fn large_load_balanced_solve_is_refused() {
        let graph = single(u32::MAX, u32::MAX);
        let config = SolverConfig {
            load_balance_weight: 1,
            ..SolverConfig::default()
        };
        assert!(matches!(
            solve(&graph, &config),
            Err(EngineError::LoadBalanceTooLarge { hours, .. }) if hours == u32::MAX as u64
        ));
        // Without load balancing the same graph is a single augmentation.
        let partial = solve(&graph, &SolverConfig::default()).unwrap();
        assert_eq!(partial.flow, u32::MAX as u64);
        assert_eq!(partial.augmentations, 1);
    }
}
