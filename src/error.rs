use thiserror::Error;

use crate::data::{AssistantId, ConstraintPair, CourseId};
use crate::validator::ValidationReport;

/// Structural problems that stop an [`crate::Instance`] from being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("{field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(
        "course {course} lists assistant {assistant}, but there are only {n_assistants} assistants"
    )]
    AssistantOutOfRange {
        course: CourseId,
        assistant: AssistantId,
        n_assistants: usize,
    },
    #[error("course {course} lists assistant {assistant} more than once")]
    DuplicateEligibility {
        course: CourseId,
        assistant: AssistantId,
    },
    #[error("{list} pair {pair} is out of range ({n_assistants} assistants, {n_courses} courses)")]
    PairOutOfRange {
        list: &'static str,
        pair: ConstraintPair,
        n_assistants: usize,
        n_courses: usize,
    },
    #[error("assistant {assistant} previously held course {course}, but only {n_courses} exist")]
    OldAssignmentOutOfRange {
        assistant: AssistantId,
        course: CourseId,
        n_courses: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("change cost must be positive (found {0})")]
    NonPositiveChangeCost(i64),
    #[error(
        "change cost must be at most {max} (found {0})",
        max = crate::config::MAX_WEIGHT
    )]
    ChangeCostTooLarge(i64),
    #[error("load balance weight must not be negative (found {0})")]
    NegativeLoadWeight(i64),
    #[error(
        "load balance weight must be at most {max} (found {0})",
        max = crate::config::MAX_WEIGHT
    )]
    LoadWeightTooLarge(i64),
    #[error("invalid server address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("instance failed validation with {} error(s)", .0.errors().count())]
    Invalid(ValidationReport),
    #[error("{} required pair(s) cannot be honoured under the strict policy", .0.len())]
    RequiredUnsatisfied(Vec<ConstraintPair>),
    #[error("load balancing would place up to {hours} hours, more than the limit of {limit}")]
    LoadBalanceTooLarge { hours: u64, limit: u64 },
    #[error("LP backend failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_entities() {
        let err = InstanceError::LengthMismatch {
            field: "maxHours",
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "maxHours has 2 entries, expected 3");

        let err = InstanceError::PairOutOfRange {
            list: "forbidden",
            pair: ConstraintPair::new(4, 1),
            n_assistants: 2,
            n_courses: 2,
        };
        assert!(err.to_string().contains("(assistant 4, course 1)"));
    }

    #[test]
    fn strict_error_counts_pairs() {
        let err = EngineError::RequiredUnsatisfied(vec![
            ConstraintPair::new(0, 0),
            ConstraintPair::new(1, 0),
        ]);
        assert_eq!(
            err.to_string(),
            "2 required pair(s) cannot be honoured under the strict policy"
        );
    }
}
