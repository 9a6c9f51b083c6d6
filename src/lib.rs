//! Assignment of teaching assistants to courses.
//!
//! An [`Instance`] is validated, turned into a [`ConstraintGraph`] and solved
//! as a min-cost max-flow problem. The result covers as much course demand
//! as the capacities allow while keeping assistants on their previous
//! courses where possible, and lists every constraint it could not honour.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod graph;
pub mod instance;
pub mod report;
pub mod server;
pub mod solver;
pub mod validator;

pub use config::{Backend, EngineConfig, RequiredPolicy, ServerConfig, SolverConfig};
pub use data::{
    AssignmentEdge, AssignmentResult, AssistantId, Conflict, ConflictKind, ConstraintPair,
    CourseId, Hours, InstanceInput, Severity, SolveRequest,
};
pub use engine::{Engine, solve};
pub use error::{ConfigError, EngineError, InstanceError};
pub use graph::ConstraintGraph;
pub use instance::{EligibilityIndex, Instance};
pub use validator::{ValidationReport, validate};
