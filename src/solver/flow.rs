//! Min-cost max-flow by successive shortest augmenting paths.
//!
//! Dijkstra runs on reduced costs (Johnson potentials), so every arc cost
//! must be non-negative when the network is built. Labels are compared
//! lexicographically as `(distance, first assistant, first course)`, which
//! makes the chosen augmenting path unique among equal-cost candidates.
//!
//! Load balancing uses one convex arc per assistant instead of one arc per
//! hour: its cost is the marginal cost of the next hour and moves by the
//! weight each time an hour is pushed or pulled back. Paths through a convex
//! arc carry a single hour.

use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::SolverConfig;
use crate::data::Hours;
use crate::graph::ConstraintGraph;

use super::PartialResult;

type Flow = i64;
type Cost = i64;

// Per-edge capacity between an assistant and a course is bounded by the
// source and sink arcs anyway.
const UNBOUNDED: Flow = Flow::MAX / 4;

#[derive(Debug, Clone, Copy)]
struct Arc {
    to: usize,
    cap: Flow,
    cost: Cost,
    /// Marginal cost change per unit moved. Zero for linear arcs; shared by
    /// both directions of a convex arc.
    step: Cost,
    rev: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NodeKind {
    Source,
    Assistant(usize),
    Course(usize),
    Sink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Label {
    dist: Cost,
    assistant: Option<usize>,
    course: Option<usize>,
}

impl Label {
    const START: Label = Label {
        dist: 0,
        assistant: None,
        course: None,
    };

    fn extend(self, cost: Cost, kind: NodeKind) -> Label {
        let mut next = Label {
            dist: self.dist + cost,
            ..self
        };
        match kind {
            NodeKind::Assistant(a) if next.assistant.is_none() => next.assistant = Some(a),
            NodeKind::Course(c) if next.course.is_none() => next.course = Some(c),
            _ => {}
        }
        next
    }
}

/// Residual network: source, one node per assistant, one per course, sink.
#[derive(Debug, Clone)]
struct FlowNetwork {
    n_assistants: usize,
    n_courses: usize,
    arcs: Vec<Arc>,
    adjacency: Vec<Vec<usize>>,
}

impl FlowNetwork {
    fn new(n_assistants: usize, n_courses: usize) -> Self {
        Self {
            n_assistants,
            n_courses,
            arcs: Vec::new(),
            adjacency: vec![Vec::new(); n_assistants + n_courses + 2],
        }
    }

    #[inline]
    fn source(&self) -> usize {
        0
    }

    #[inline]
    fn sink(&self) -> usize {
        self.n_assistants + self.n_courses + 1
    }

    #[inline]
    fn assistant(&self, a: usize) -> usize {
        1 + a
    }

    #[inline]
    fn course(&self, c: usize) -> usize {
        1 + self.n_assistants + c
    }

    #[inline]
    fn n_nodes(&self) -> usize {
        self.adjacency.len()
    }

    fn kind(&self, node: usize) -> NodeKind {
        if node == self.source() {
            NodeKind::Source
        } else if node == self.sink() {
            NodeKind::Sink
        } else if node <= self.n_assistants {
            NodeKind::Assistant(node - 1)
        } else {
            NodeKind::Course(node - 1 - self.n_assistants)
        }
    }

    /// Adds a forward arc and its zero-capacity reverse; returns the index of
    /// the forward arc.
    fn add_arc(&mut self, from: usize, to: usize, cap: Flow, cost: Cost) -> usize {
        self.add_convex_arc(from, to, cap, cost, 0)
    }

    /// Arc whose k-th unit (from zero) costs `cost + k * step`. The reverse
    /// arc always refunds the cost of the last unit pushed.
    fn add_convex_arc(
        &mut self,
        from: usize,
        to: usize,
        cap: Flow,
        cost: Cost,
        step: Cost,
    ) -> usize {
        let idx = self.arcs.len();
        self.arcs.push(Arc {
            to,
            cap,
            cost,
            step,
            rev: idx + 1,
        });
        self.arcs.push(Arc {
            to: from,
            cap: 0,
            cost: step - cost,
            step,
            rev: idx,
        });
        self.adjacency[from].push(idx);
        self.adjacency[to].push(idx + 1);
        idx
    }

    /// Flow currently pushed through a forward arc.
    fn flow_on(&self, arc: usize) -> Flow {
        self.arcs[self.arcs[arc].rev].cap
    }

    fn shortest_path(
        &self,
        potential: &[Cost],
        labels: &mut [Option<Label>],
        via: &mut [Option<usize>],
    ) {
        labels.fill(None);
        via.fill(None);
        let mut heap = BinaryHeap::new();
        labels[self.source()] = Some(Label::START);
        heap.push(Reverse((Label::START, self.source())));

        while let Some(Reverse((label, node))) = heap.pop() {
            if labels[node] != Some(label) {
                continue;
            }
            for &idx in &self.adjacency[node] {
                let arc = self.arcs[idx];
                if arc.cap <= 0 {
                    continue;
                }
                let reduced = arc.cost + potential[node] - potential[arc.to];
                debug_assert!(reduced >= 0, "negative reduced cost {reduced}");
                let candidate = label.extend(reduced, self.kind(arc.to));
                if labels[arc.to].is_none_or(|current| candidate < current) {
                    labels[arc.to] = Some(candidate);
                    via[arc.to] = Some(idx);
                    heap.push(Reverse((candidate, arc.to)));
                }
            }
        }
    }

    /// Pushes flow until the sink is unreachable. Returns the number of
    /// augmentations performed.
    fn run(&mut self) -> usize {
        let n = self.n_nodes();
        let (source, sink) = (self.source(), self.sink());
        let mut potential = vec![0; n];
        let mut labels = vec![None; n];
        let mut via = vec![None; n];
        let mut augmentations = 0;

        loop {
            self.shortest_path(&potential, &mut labels, &mut via);
            if labels[sink].is_none() {
                break;
            }
            for (p, label) in potential.iter_mut().zip(&labels) {
                if let Some(label) = label {
                    *p += label.dist;
                }
            }

            let mut path = Vec::new();
            let mut node = sink;
            while node != source {
                let Some(idx) = via[node] else { break };
                path.push(idx);
                node = self.arcs[self.arcs[idx].rev].to;
            }
            let mut amount = path
                .iter()
                .map(|&idx| self.arcs[idx].cap)
                .min()
                .unwrap_or(0);
            if path.iter().any(|&idx| self.arcs[idx].step != 0) {
                amount = amount.min(1);
            }
            if amount <= 0 {
                break;
            }
            for &idx in &path {
                let rev = self.arcs[idx].rev;
                self.arcs[idx].cap -= amount;
                self.arcs[rev].cap += amount;
                let step = self.arcs[idx].step;
                self.arcs[idx].cost += step;
                self.arcs[rev].cost -= step;
            }
            augmentations += 1;
            trace!(
                "Augmentation {}: {} hours along {} arcs (reduced distance to sink {}).",
                augmentations,
                amount,
                path.len(),
                potential[sink]
            );
        }
        augmentations
    }
}

/// Upper bound on the hours a solve can place: each assistant's remaining
/// capacity, capped by the remaining demand of the courses it can reach.
pub fn load_balanced_hours(graph: &ConstraintGraph) -> u64 {
    (0..graph.n_assistants())
        .map(|a| {
            let reachable: u64 = graph
                .edges_of_assistant(a)
                .iter()
                .map(|e| graph.remaining_demand(e.course) as u64)
                .sum();
            reachable.min(graph.remaining_capacity(a) as u64)
        })
        .sum()
}

/// Solves the residual problem left by the graph builder and returns the
/// final hours per graph edge, mandatory pre-allocation included.
pub fn solve_flow(graph: &ConstraintGraph, config: &SolverConfig) -> PartialResult {
    let mut network = FlowNetwork::new(graph.n_assistants(), graph.n_courses());

    for a in 0..graph.n_assistants() {
        let capacity = graph.remaining_capacity(a) as Flow;
        if capacity == 0 {
            continue;
        }
        let (source, node) = (network.source(), network.assistant(a));
        if config.load_balance_weight > 0 {
            let weight = config.load_balance_weight;
            let used = graph.preallocated_of_assistant(a) as Cost;
            network.add_convex_arc(source, node, capacity, weight * used, weight);
        } else {
            network.add_arc(source, node, capacity, 0);
        }
    }

    let edge_arcs: Vec<usize> = graph
        .edges()
        .iter()
        .map(|e| {
            let cost = if e.continuity { 0 } else { config.change_cost };
            let (from, to) = (network.assistant(e.assistant), network.course(e.course));
            network.add_arc(from, to, UNBOUNDED, cost)
        })
        .collect();

    for c in 0..graph.n_courses() {
        let demand = graph.remaining_demand(c) as Flow;
        if demand > 0 {
            let (node, sink) = (network.course(c), network.sink());
            network.add_arc(node, sink, demand, 0);
        }
    }

    debug!(
        "Flow network: {} nodes, {} arcs.",
        network.n_nodes(),
        network.arcs.len() / 2
    );
    let augmentations = network.run();

    let allocations: Vec<Hours> = graph
        .edges()
        .iter()
        .zip(&edge_arcs)
        .map(|(edge, &arc)| edge.preallocated + network.flow_on(arc) as Hours)
        .collect();

    PartialResult::new(graph, allocations, augmentations, config)
}
