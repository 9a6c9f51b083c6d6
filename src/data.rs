use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::EngineConfig;

// Type aliases for clarity
pub type AssistantId = usize;
pub type CourseId = usize;
pub type Hours = u32;

/// An `(assistant, course)` pair used by the required and forbidden lists.
///
/// On the wire a pair is a two element array `[assistant, course]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(from = "(AssistantId, CourseId)", into = "(AssistantId, CourseId)")]
pub struct ConstraintPair {
    pub assistant: AssistantId,
    pub course: CourseId,
}

impl ConstraintPair {
    pub const fn new(assistant: AssistantId, course: CourseId) -> Self {
        Self { assistant, course }
    }
}

impl From<(AssistantId, CourseId)> for ConstraintPair {
    fn from((assistant, course): (AssistantId, CourseId)) -> Self {
        Self { assistant, course }
    }
}

impl From<ConstraintPair> for (AssistantId, CourseId) {
    fn from(pair: ConstraintPair) -> Self {
        (pair.assistant, pair.course)
    }
}

impl fmt::Display for ConstraintPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(assistant {}, course {})", self.assistant, self.course)
    }
}

/// Raw problem description as received from a loader or the HTTP boundary.
///
/// Nothing here is checked; convert it into an [`crate::Instance`] with
/// `Instance::try_from`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInput {
    pub n_assistants: usize,
    pub n_courses: usize,
    pub max_hours: Vec<Hours>,
    pub hours: Vec<Hours>,
    pub course_assistants: Vec<Vec<AssistantId>>,
    #[serde(default)]
    pub required: Vec<ConstraintPair>,
    #[serde(default)]
    pub forbidden: Vec<ConstraintPair>,
    /// Previous course per assistant, `null` for none. An empty list means
    /// no assistant has a previous assignment.
    #[serde(default)]
    pub old_assignments: Vec<Option<CourseId>>,
}

/// Body of a solve request: the instance plus optional engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub instance: InstanceInput,
    #[serde(default)]
    pub config: EngineConfig,
}

/// A single chosen `(assistant, course, hours)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEdge {
    pub assistant: AssistantId,
    pub course: CourseId,
    pub hours: Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// A required pair whose assistant is not eligible for the course.
    RequiredIneligible,
    /// A pair that is both required and forbidden.
    ContradictoryConstraint,
    /// Courses only one assistant can staff exceed that assistant's hours.
    CapacityInfeasible,
    /// A course nobody is eligible for.
    UnstaffableCourse,
    /// Total assistant capacity is below total course demand.
    InsufficientCapacity,
    /// Required pairs alone need more than an assistant or course can give.
    MandatoryOvercommit,
    /// A required pair that ended up without any hours.
    RequiredUnsatisfied,
}

impl ConflictKind {
    /// Kinds that make an instance unsolvable as stated.
    pub const fn default_severity(self) -> Severity {
        match self {
            ConflictKind::RequiredIneligible | ConflictKind::ContradictoryConstraint => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ConflictKind::RequiredIneligible => "required-but-ineligible",
            ConflictKind::ContradictoryConstraint => "contradictory-constraint",
            ConflictKind::CapacityInfeasible => "capacity-infeasible",
            ConflictKind::UnstaffableCourse => "unstaffable-course",
            ConflictKind::InsufficientCapacity => "insufficient-capacity",
            ConflictKind::MandatoryOvercommit => "mandatory-overcommit",
            ConflictKind::RequiredUnsatisfied => "required-unsatisfied",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hard constraint that could not be honoured, or a finding that explains
/// why the assignment falls short.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub assistant: Option<AssistantId>,
    pub course: Option<CourseId>,
    pub message: String,
}

impl Conflict {
    pub fn new(
        kind: ConflictKind,
        assistant: Option<AssistantId>,
        course: Option<CourseId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            assistant,
            course,
            message: message.into(),
        }
    }

    pub fn for_pair(kind: ConflictKind, pair: ConstraintPair, message: impl Into<String>) -> Self {
        Self::new(kind, Some(pair.assistant), Some(pair.course), message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// True if this conflict names the given pair.
    pub fn concerns(&self, pair: ConstraintPair) -> bool {
        self.assistant == Some(pair.assistant) && self.course == Some(pair.course)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.severity, self.kind, self.message)
    }
}

/// The final output of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    /// Edges with positive hours, ordered by assistant then course.
    pub assignments: Vec<AssignmentEdge>,
    /// Uncovered hours for every course, zero included.
    pub unmet_demand: BTreeMap<CourseId, Hours>,
    pub conflicts: Vec<Conflict>,
    pub total_allocated: u64,
    /// Number of edges that repeat an assistant's previous course.
    pub reused_assignments: usize,
    /// Objective value of the flow part (continuity and load costs).
    pub cost: i64,
}

impl AssignmentResult {
    pub fn allocated_to_assistant(&self, assistant: AssistantId) -> u64 {
        self.assignments
            .iter()
            .filter(|e| e.assistant == assistant)
            .map(|e| e.hours as u64)
            .sum()
    }

    pub fn allocated_to_course(&self, course: CourseId) -> u64 {
        self.assignments
            .iter()
            .filter(|e| e.course == course)
            .map(|e| e.hours as u64)
            .sum()
    }

    pub fn hours_for(&self, pair: ConstraintPair) -> Hours {
        self.assignments
            .iter()
            .find(|e| e.assistant == pair.assistant && e.course == pair.course)
            .map_or(0, |e| e.hours)
    }

    pub fn conflicts_of(&self, kind: ConflictKind) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(move |c| c.kind == kind)
    }

    pub fn total_unmet(&self) -> u64 {
        self.unmet_demand.values().map(|&h| h as u64).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.conflicts.is_empty() && self.total_unmet() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_serializes_as_array() {
        let pair = ConstraintPair::new(2, 7);
        assert_eq!(serde_json::to_string(&pair).unwrap(), "[2,7]");
        let back: ConstraintPair = serde_json::from_str("[2,7]").unwrap();
        assert_eq!(back, pair);
    }

    #[test]
    fn instance_input_uses_camel_case_and_defaults() {
        let json = r#"{
            "nAssistants": 2,
            "nCourses": 1,
            "maxHours": [5, 5],
            "hours": [8],
            "courseAssistants": [[0, 1]],
            "oldAssignments": [0, null]
        }"#;
        let input: InstanceInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.n_assistants, 2);
        assert!(input.required.is_empty());
        assert!(input.forbidden.is_empty());
        assert_eq!(input.old_assignments, vec![Some(0), None]);
    }

    #[test]
    fn conflict_severity_follows_kind() {
        let c = Conflict::new(ConflictKind::ContradictoryConstraint, Some(0), Some(0), "x");
        assert!(c.is_error());
        let w = Conflict::new(ConflictKind::UnstaffableCourse, None, Some(3), "y");
        assert!(!w.is_error());
        assert_eq!(w.to_string(), "[warning unstaffable-course] y");
    }

    #[test]
    fn conflict_kind_serializes_kebab_case() {
        let s = serde_json::to_string(&ConflictKind::MandatoryOvercommit).unwrap();
        assert_eq!(s, "\"mandatory-overcommit\"");
    }
}
