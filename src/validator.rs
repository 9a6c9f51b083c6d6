use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::data::{Conflict, ConflictKind};
use crate::instance::Instance;

/// Everything the validator found, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    issues: Vec<Conflict>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[Conflict] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Conflict> {
        self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Conflict> {
        self.issues.iter().filter(|c| c.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Conflict> {
        self.issues.iter().filter(|c| !c.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Conflict::is_error)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn contains(&self, kind: ConflictKind) -> bool {
        self.issues.iter().any(|c| c.kind == kind)
    }

    fn push(&mut self, conflict: Conflict) {
        debug!("validation: {}", conflict);
        self.issues.push(conflict);
    }
}

/// Runs every consistency check on the instance and collects all findings.
pub fn validate(instance: &Instance) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_required_eligible(instance, &mut report);
    check_contradictions(instance, &mut report);
    check_sole_candidate_capacity(instance, &mut report);
    check_staffable(instance, &mut report);
    check_total_capacity(instance, &mut report);

    if !report.is_clean() {
        warn!(
            "Validation found {} error(s) and {} warning(s).",
            report.errors().count(),
            report.warnings().count()
        );
    }
    report
}

fn check_required_eligible(instance: &Instance, report: &mut ValidationReport) {
    for &pair in instance.required() {
        if !instance.is_eligible(pair.assistant, pair.course) {
            report.push(Conflict::for_pair(
                ConflictKind::RequiredIneligible,
                pair,
                format!(
                    "Assistant {} is required on course {} but is not eligible for it.",
                    pair.assistant, pair.course
                ),
            ));
        }
    }
}

fn check_contradictions(instance: &Instance, report: &mut ValidationReport) {
    for &pair in instance.required().intersection(instance.forbidden()) {
        report.push(Conflict::for_pair(
            ConflictKind::ContradictoryConstraint,
            pair,
            format!(
                "Assistant {} is both required and forbidden on course {}.",
                pair.assistant, pair.course
            ),
        ));
    }
}

// Courses only one assistant can staff must fit into that assistant's hours.
fn check_sole_candidate_capacity(instance: &Instance, report: &mut ValidationReport) {
    let index = instance.eligibility_index();
    for assistant in instance.assistants() {
        let courses = index.sole_candidate_courses(assistant);
        let needed: u64 = courses.iter().map(|&c| instance.hours(c) as u64).sum();
        let available = instance.max_hours(assistant) as u64;
        if needed > available {
            report.push(Conflict::new(
                ConflictKind::CapacityInfeasible,
                Some(assistant),
                courses.first().copied().filter(|_| courses.len() == 1),
                format!(
                    "Assistant {} alone can staff courses {:?} needing {} hours, but has only {}.",
                    assistant, courses, needed, available
                ),
            ));
        }
    }
}

fn check_staffable(instance: &Instance, report: &mut ValidationReport) {
    for course in instance.courses() {
        if instance.eligible(course).is_empty() {
            report.push(Conflict::new(
                ConflictKind::UnstaffableCourse,
                None,
                Some(course),
                format!(
                    "Course {} has no eligible assistants; its {} hours stay uncovered.",
                    course,
                    instance.hours(course)
                ),
            ));
        }
    }
}

fn check_total_capacity(instance: &Instance, report: &mut ValidationReport) {
    let capacity = instance.total_capacity();
    let demand = instance.total_demand();
    if capacity < demand {
        report.push(Conflict::new(
            ConflictKind::InsufficientCapacity,
            None,
            None,
            format!(
                "Assistants provide {} hours in total but courses need {}.",
                capacity, demand
            ),
        ));
    }
}
