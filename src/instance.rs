//! Immutable description of an assignment problem.
//!
//! An [`Instance`] is checked once at construction and never mutated
//! afterwards. Anything that needs a different shape of the same data
//! (for example the courses only one assistant can staff) builds a derived
//! index such as [`EligibilityIndex`].

use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};

use crate::data::{AssistantId, ConstraintPair, CourseId, Hours, InstanceInput};
use crate::error::InstanceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    max_hours: Vec<Hours>,
    hours: Vec<Hours>,
    course_assistants: Vec<BTreeSet<AssistantId>>,
    required: BTreeSet<ConstraintPair>,
    forbidden: BTreeSet<ConstraintPair>,
    old_assignments: Vec<Option<CourseId>>,
}

impl Instance {
    /// Builds an instance, taking the number of assistants from `max_hours`
    /// and the number of courses from `course_assistants`.
    pub fn new(
        max_hours: Vec<Hours>,
        hours: Vec<Hours>,
        course_assistants: Vec<Vec<AssistantId>>,
        required: Vec<ConstraintPair>,
        forbidden: Vec<ConstraintPair>,
        old_assignments: Vec<Option<CourseId>>,
    ) -> Result<Self, InstanceError> {
        let n_assistants = max_hours.len();
        let n_courses = course_assistants.len();

        check_len("hours", n_courses, hours.len())?;
        check_len("oldAssignments", n_assistants, old_assignments.len())?;

        let mut eligible = Vec::with_capacity(n_courses);
        for (course, list) in course_assistants.into_iter().enumerate() {
            let mut set = BTreeSet::new();
            for assistant in list {
                if assistant >= n_assistants {
                    return Err(InstanceError::AssistantOutOfRange {
                        course,
                        assistant,
                        n_assistants,
                    });
                }
                if !set.insert(assistant) {
                    return Err(InstanceError::DuplicateEligibility { course, assistant });
                }
            }
            eligible.push(set);
        }

        let required = collect_pairs("required", required, n_assistants, n_courses)?;
        let forbidden = collect_pairs("forbidden", forbidden, n_assistants, n_courses)?;

        for (assistant, old) in old_assignments.iter().enumerate() {
            if let Some(course) = *old {
                if course >= n_courses {
                    return Err(InstanceError::OldAssignmentOutOfRange {
                        assistant,
                        course,
                        n_courses,
                    });
                }
            }
        }

        Ok(Self {
            max_hours,
            hours,
            course_assistants: eligible,
            required,
            forbidden,
            old_assignments,
        })
    }

    #[inline]
    pub fn n_assistants(&self) -> usize {
        self.max_hours.len()
    }

    #[inline]
    pub fn n_courses(&self) -> usize {
        self.hours.len()
    }

    pub fn assistants(&self) -> std::ops::Range<AssistantId> {
        0..self.n_assistants()
    }

    pub fn courses(&self) -> std::ops::Range<CourseId> {
        0..self.n_courses()
    }

    #[inline]
    pub fn max_hours(&self, assistant: AssistantId) -> Hours {
        self.max_hours[assistant]
    }

    #[inline]
    pub fn hours(&self, course: CourseId) -> Hours {
        self.hours[course]
    }

    pub fn eligible(&self, course: CourseId) -> &BTreeSet<AssistantId> {
        &self.course_assistants[course]
    }

    pub fn is_eligible(&self, assistant: AssistantId, course: CourseId) -> bool {
        self.course_assistants
            .get(course)
            .is_some_and(|set| set.contains(&assistant))
    }

    /// Required pairs in ascending `(assistant, course)` order.
    pub fn required(&self) -> &BTreeSet<ConstraintPair> {
        &self.required
    }

    pub fn forbidden(&self) -> &BTreeSet<ConstraintPair> {
        &self.forbidden
    }

    pub fn is_required(&self, assistant: AssistantId, course: CourseId) -> bool {
        self.required.contains(&ConstraintPair::new(assistant, course))
    }

    pub fn is_forbidden(&self, assistant: AssistantId, course: CourseId) -> bool {
        self.forbidden.contains(&ConstraintPair::new(assistant, course))
    }

    #[inline]
    pub fn old_assignment(&self, assistant: AssistantId) -> Option<CourseId> {
        self.old_assignments[assistant]
    }

    pub fn total_capacity(&self) -> u64 {
        self.max_hours.iter().map(|&h| h as u64).sum()
    }

    pub fn total_demand(&self) -> u64 {
        self.hours.iter().map(|&h| h as u64).sum()
    }

    pub fn eligibility_index(&self) -> EligibilityIndex {
        EligibilityIndex::new(self)
    }
}

impl TryFrom<InstanceInput> for Instance {
    type Error = InstanceError;

    fn try_from(input: InstanceInput) -> Result<Self, Self::Error> {
        check_len("maxHours", input.n_assistants, input.max_hours.len())?;
        check_len("courseAssistants", input.n_courses, input.course_assistants.len())?;
        let old_assignments = if input.old_assignments.is_empty() {
            vec![None; input.n_assistants]
        } else {
            input.old_assignments
        };
        Self::new(
            input.max_hours,
            input.hours,
            input.course_assistants,
            input.required,
            input.forbidden,
            old_assignments,
        )
    }
}

impl From<&Instance> for InstanceInput {
    fn from(instance: &Instance) -> Self {
        Self {
            n_assistants: instance.n_assistants(),
            n_courses: instance.n_courses(),
            max_hours: instance.max_hours.clone(),
            hours: instance.hours.clone(),
            course_assistants: instance
                .course_assistants
                .iter()
                .map(|set| set.iter().copied().collect())
                .collect(),
            required: instance.required.iter().copied().collect(),
            forbidden: instance.forbidden.iter().copied().collect(),
            old_assignments: instance.old_assignments.clone(),
        }
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), InstanceError> {
    if expected != actual {
        return Err(InstanceError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn collect_pairs(
    list: &'static str,
    pairs: Vec<ConstraintPair>,
    n_assistants: usize,
    n_courses: usize,
) -> Result<BTreeSet<ConstraintPair>, InstanceError> {
    pairs
        .into_iter()
        .map(|pair| {
            if pair.assistant >= n_assistants || pair.course >= n_courses {
                Err(InstanceError::PairOutOfRange {
                    list,
                    pair,
                    n_assistants,
                    n_courses,
                })
            } else {
                Ok(pair)
            }
        })
        .collect()
}

/// Eligibility looked up by assistant instead of by course: for each
/// assistant, the courses it alone is eligible for.
#[derive(Debug, Clone, Default)]
pub struct EligibilityIndex {
    sole_candidate: HashMap<AssistantId, Vec<CourseId>>,
}

impl EligibilityIndex {
    pub fn new(instance: &Instance) -> Self {
        let sole_candidate = instance
            .courses()
            .filter_map(|c| match instance.eligible(c).iter().exactly_one() {
                Ok(&a) => Some((a, c)),
                Err(_) => None,
            })
            .into_group_map();
        Self { sole_candidate }
    }

    /// Courses for which the assistant is the only eligible candidate.
    pub fn sole_candidate_courses(&self, assistant: AssistantId) -> &[CourseId] {
        self.sole_candidate
            .get(&assistant)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
