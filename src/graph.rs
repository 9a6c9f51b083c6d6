//! Capacitated bipartite graph between assistants and courses.
//!
//! Forbidden and ineligible pairs never become edges. Required pairs are
//! pre-saturated: their hours are taken out of the assistant's capacity and
//! the course's demand before the solver sees the graph.

use log::{debug, trace, warn};

use crate::data::{AssistantId, Conflict, ConflictKind, ConstraintPair, CourseId, Hours};
use crate::instance::Instance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub assistant: AssistantId,
    pub course: CourseId,
    /// The assistant held this course before.
    pub continuity: bool,
    /// Set for required pairs that received a reservation.
    pub mandatory: bool,
    /// Hours fixed before solving.
    pub preallocated: Hours,
}

impl GraphEdge {
    pub fn pair(&self) -> ConstraintPair {
        ConstraintPair::new(self.assistant, self.course)
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    capacity: Vec<Hours>,
    demand: Vec<Hours>,
    /// Sorted by assistant, then course.
    edges: Vec<GraphEdge>,
    conflicts: Vec<Conflict>,
}

impl ConstraintGraph {
    pub fn build(instance: &Instance) -> Self {
        let mut edges: Vec<GraphEdge> = instance
            .courses()
            .flat_map(|c| instance.eligible(c).iter().map(move |&a| (a, c)))
            .filter(|&(a, c)| !instance.is_forbidden(a, c))
            .map(|(assistant, course)| GraphEdge {
                assistant,
                course,
                continuity: instance.old_assignment(assistant) == Some(course),
                mandatory: false,
                preallocated: 0,
            })
            .collect();
        edges.sort_by_key(|e| (e.assistant, e.course));

        let mut graph = Self {
            capacity: instance.assistants().map(|a| instance.max_hours(a)).collect(),
            demand: instance.courses().map(|c| instance.hours(c)).collect(),
            edges,
            conflicts: Vec::new(),
        };
        graph.saturate_required(instance);

        debug!(
            "Built graph: {} assistants, {} courses, {} edges ({} mandatory), {} conflict(s).",
            graph.n_assistants(),
            graph.n_courses(),
            graph.edges.len(),
            graph.mandatory().count(),
            graph.conflicts.len()
        );
        graph
    }

    // Two passes: every satisfiable required pair first gets one hour, then
    // each is topped up as far as both endpoints allow.
    fn saturate_required(&mut self, instance: &Instance) {
        let mut reserved = Vec::new();
        for &pair in instance.required() {
            let Some(idx) = self.edge_index(pair.assistant, pair.course) else {
                warn!(
                    "Required pair {} has no edge (ineligible or forbidden); skipped.",
                    pair
                );
                continue;
            };
            let capacity = self.capacity[pair.assistant];
            let demand = self.demand[pair.course];
            if capacity == 0 || demand == 0 {
                let reason = if capacity == 0 {
                    format!(
                        "assistant {} has no hours left ({} in total) after other required pairs",
                        pair.assistant,
                        instance.max_hours(pair.assistant)
                    )
                } else {
                    format!(
                        "course {} has no demand left ({} in total) after other required pairs",
                        pair.course,
                        instance.hours(pair.course)
                    )
                };
                warn!("Mandatory overcommit on {}: {}.", pair, reason);
                self.conflicts.push(Conflict::for_pair(
                    ConflictKind::MandatoryOvercommit,
                    pair,
                    format!(
                        "Required pair {} cannot be given any hours: {}.",
                        pair, reason
                    ),
                ));
                continue;
            }
            self.reserve(idx, 1);
            reserved.push(idx);
        }

        for idx in reserved {
            let edge = self.edges[idx];
            let top_up = self.capacity[edge.assistant].min(self.demand[edge.course]);
            self.reserve(idx, top_up);
            trace!(
                "Required pair {} pre-allocated {} hours.",
                edge.pair(),
                self.edges[idx].preallocated
            );
        }
    }

    fn reserve(&mut self, idx: usize, hours: Hours) {
        let edge = &mut self.edges[idx];
        edge.mandatory = true;
        edge.preallocated += hours;
        self.capacity[edge.assistant] -= hours;
        self.demand[edge.course] -= hours;
    }

    #[inline]
    pub fn n_assistants(&self) -> usize {
        self.capacity.len()
    }

    #[inline]
    pub fn n_courses(&self) -> usize {
        self.demand.len()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.mandatory)
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Capacity left after mandatory pre-allocation.
    #[inline]
    pub fn remaining_capacity(&self, assistant: AssistantId) -> Hours {
        self.capacity[assistant]
    }

    /// Demand left after mandatory pre-allocation.
    #[inline]
    pub fn remaining_demand(&self, course: CourseId) -> Hours {
        self.demand[course]
    }

    pub fn edges_of_assistant(&self, assistant: AssistantId) -> &[GraphEdge] {
        let start = self.edges.partition_point(|e| e.assistant < assistant);
        let end = self.edges.partition_point(|e| e.assistant <= assistant);
        &self.edges[start..end]
    }

    pub fn edge_index(&self, assistant: AssistantId, course: CourseId) -> Option<usize> {
        self.edges
            .binary_search_by_key(&(assistant, course), |e| (e.assistant, e.course))
            .ok()
    }

    pub fn edge(&self, assistant: AssistantId, course: CourseId) -> Option<&GraphEdge> {
        self.edge_index(assistant, course).map(|idx| &self.edges[idx])
    }

    pub fn preallocated_of_assistant(&self, assistant: AssistantId) -> Hours {
        self.edges_of_assistant(assistant)
            .iter()
            .map(|e| e.preallocated)
            .sum()
    }
}
