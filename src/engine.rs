use log::{debug, error, info, warn};
use std::time::Instant;

use crate::config::{EngineConfig, RequiredPolicy};
use crate::data::AssignmentResult;
use crate::error::EngineError;
use crate::graph::ConstraintGraph;
use crate::instance::Instance;
use crate::report;
use crate::solver;
use crate::validator::{self, ValidationReport};

/// Runs validation, graph construction, solving and reporting for one
/// instance at a time. Holds no per-solve state, so one engine can serve
/// many threads.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn validate(&self, instance: &Instance) -> ValidationReport {
        validator::validate(instance)
    }

    pub fn solve(&self, instance: &Instance) -> Result<AssignmentResult, EngineError> {
        let start_time = Instant::now();
        info!(
            "Solving instance with {} assistants ({} hours) and {} courses ({} hours)...",
            instance.n_assistants(),
            instance.total_capacity(),
            instance.n_courses(),
            instance.total_demand()
        );

        let validation = self.validate(instance);
        if validation.has_errors() {
            if !self.config.proceed_on_errors {
                error!("Instance rejected; solver not invoked.");
                return Err(EngineError::Invalid(validation));
            }
            warn!("Proceeding despite validation errors.");
        }

        let graph = ConstraintGraph::build(instance);
        let partial = solver::solve(&graph, &self.config.solver)?;
        let result = report::report(instance, &graph, &partial, validation.into_issues());

        let violations = report::verify(instance, &result);
        for violation in &violations {
            error!("Invariant violated: {}", violation);
        }
        debug_assert!(violations.is_empty(), "{violations:?}");

        if self.config.required_policy == RequiredPolicy::Strict {
            let missing = report::unsatisfied_required(instance, &result);
            if !missing.is_empty() {
                error!(
                    "{} required pair(s) unsatisfied under the strict policy.",
                    missing.len()
                );
                return Err(EngineError::RequiredUnsatisfied(missing));
            }
        }

        debug!("Result: {:?}", result);
        if result.is_complete() {
            debug!("Every course is fully staffed and no constraint was broken.");
        }
        info!(
            "Assignment done in {:.2?}: {} edges, {} hours, {} unmet, {} conflict(s).",
            start_time.elapsed(),
            result.assignments.len(),
            result.total_allocated,
            result.total_unmet(),
            result.conflicts.len()
        );
        Ok(result)
    }
}

/// Solves with the default configuration.
pub fn solve(instance: &Instance) -> Result<AssignmentResult, EngineError> {
    Engine::default().solve(instance)
}
