// SPDX-License-Identifier: Apache-2.0

//! Min-cost flow on a directed graph with integral capacities and costs.
//!
//! Supply is injected at a single source and withdrawn at a single drain. The
//! solver runs successive shortest paths: Bellman-Ford establishes initial
//! node potentials (so negative arc costs are allowed), then every
//! augmentation uses Dijkstra on reduced costs. All lower bounds are zero.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub type NodeId = usize;
pub type ArcId = usize;

/// Largest accepted magnitude of an arc cost. Path lengths over any simple
/// path stay far below the distance sentinel.
pub const MAX_ARC_COST: i64 = 1 << 40;

const INFINITE_DISTANCE: i64 = i64::MAX / 4;

#[derive(Debug, Clone)]
struct Arc {
    from: NodeId,
    to: NodeId,
    capacity: i64,
    cost: i64,
}

/// Arc list of a flow problem.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    num_nodes: usize,
    arcs: Vec<Arc>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> NodeId {
        self.num_nodes += 1;
        self.num_nodes - 1
    }

    /// Adds an arc with lower bound 0, upper bound `capacity` and per-unit
    /// `cost`.
    pub fn add_arc(&mut self, from: NodeId, to: NodeId, capacity: i64, cost: i64) -> ArcId {
        assert!(
            from < self.num_nodes && to < self.num_nodes,
            "Arc {from} -> {to} refers to a missing node ({} nodes)",
            self.num_nodes
        );
        assert!(capacity >= 0, "Arc {from} -> {to} has negative capacity {capacity}");
        assert!(
            cost.abs() <= MAX_ARC_COST,
            "Arc {from} -> {to} has cost {cost} beyond {MAX_ARC_COST}"
        );
        self.arcs.push(Arc {
            from,
            to,
            capacity,
            cost,
        });
        self.arcs.len() - 1
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn capacity(&self, arc: ArcId) -> i64 {
        self.arcs[arc].capacity
    }

    pub fn cost(&self, arc: ArcId) -> i64 {
        self.arcs[arc].cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// All supply was routed at minimum total cost.
    Optimal,
    /// The supply cannot be routed within the arc capacities.
    Infeasible,
    /// A negative-cost cycle with residual capacity is reachable from the
    /// source.
    Unbounded,
}

#[derive(Debug, Clone)]
pub struct FlowSolution {
    status: SolveStatus,
    flows: Vec<i64>,
    total_cost: i64,
}

impl FlowSolution {
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    pub fn flow(&self, arc: ArcId) -> i64 {
        self.flows[arc]
    }

    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }
}

/// Residual edge. Edge `2 * a` is the forward copy of arc `a`, `2 * a + 1` its
/// reverse.
#[derive(Debug, Clone)]
struct ResidualEdge {
    to: NodeId,
    residual: i64,
    cost: i64,
}

struct Residual {
    edges: Vec<ResidualEdge>,
    adjacency: Vec<Vec<usize>>,
}

impl Residual {
    fn new(graph: &FlowGraph) -> Self {
        let mut edges = Vec::with_capacity(graph.arcs.len() * 2);
        let mut adjacency = vec![Vec::new(); graph.num_nodes];
        for arc in &graph.arcs {
            adjacency[arc.from].push(edges.len());
            edges.push(ResidualEdge {
                to: arc.to,
                residual: arc.capacity,
                cost: arc.cost,
            });
            adjacency[arc.to].push(edges.len());
            edges.push(ResidualEdge {
                to: arc.from,
                residual: 0,
                cost: -arc.cost,
            });
        }
        Residual { edges, adjacency }
    }

    /// Shortest distances from `source` over edges with residual capacity.
    /// Returns `None` if a negative cycle is reachable.
    fn bellman_ford(&self, source: NodeId) -> Option<Vec<i64>> {
        let num_nodes = self.adjacency.len();
        let mut dist = vec![INFINITE_DISTANCE; num_nodes];
        dist[source] = 0;
        for round in 0..=num_nodes {
            let mut changed = false;
            for from in 0..num_nodes {
                if dist[from] == INFINITE_DISTANCE {
                    continue;
                }
                for &e in &self.adjacency[from] {
                    let edge = &self.edges[e];
                    if edge.residual > 0 && dist[from] + edge.cost < dist[edge.to] {
                        dist[edge.to] = dist[from] + edge.cost;
                        changed = true;
                    }
                }
            }
            if !changed {
                return Some(dist);
            }
            if round == num_nodes {
                break;
            }
        }
        None
    }

    /// Dijkstra on reduced costs. Returns distances and, per node, the edge
    /// used to reach it.
    fn dijkstra(&self, source: NodeId, potential: &[i64]) -> (Vec<i64>, Vec<Option<usize>>) {
        let num_nodes = self.adjacency.len();
        let mut dist = vec![INFINITE_DISTANCE; num_nodes];
        let mut via = vec![None; num_nodes];
        let mut heap = BinaryHeap::new();
        dist[source] = 0;
        heap.push(Reverse((0i64, source)));

        while let Some(Reverse((d, node))) = heap.pop() {
            if d > dist[node] {
                continue;
            }
            for &e in &self.adjacency[node] {
                let edge = &self.edges[e];
                if edge.residual <= 0 {
                    continue;
                }
                let reduced = edge.cost + potential[node] - potential[edge.to];
                debug_assert!(reduced >= 0, "Negative reduced cost {reduced}");
                let next = d + reduced;
                if next < dist[edge.to] {
                    dist[edge.to] = next;
                    via[edge.to] = Some(e);
                    heap.push(Reverse((next, edge.to)));
                }
            }
        }
        (dist, via)
    }

    /// Tail node of residual edge `e`.
    fn tail(&self, e: usize) -> NodeId {
        self.edges[e ^ 1].to
    }
}

/// Routes `supply` units from `source` to `drain` at minimum cost.
pub fn solve(graph: &FlowGraph, source: NodeId, drain: NodeId, supply: i64) -> FlowSolution {
    assert!(
        source < graph.num_nodes && drain < graph.num_nodes,
        "Source {source} or drain {drain} is not a node of the graph"
    );
    let mut residual = Residual::new(graph);
    let finish = |residual: &Residual, status: SolveStatus| {
        let flows = (0..graph.arcs.len())
            .map(|a| residual.edges[2 * a + 1].residual)
            .collect::<Vec<_>>();
        let total_cost = flows
            .iter()
            .zip(&graph.arcs)
            .map(|(flow, arc)| flow * arc.cost)
            .sum();
        FlowSolution {
            status,
            flows,
            total_cost,
        }
    };

    let Some(mut potential) = residual.bellman_ford(source) else {
        return finish(&residual, SolveStatus::Unbounded);
    };
    // nodes unreachable now stay unreachable; any finite potential works
    for p in potential.iter_mut() {
        if *p == INFINITE_DISTANCE {
            *p = 0;
        }
    }

    let mut remaining = supply;
    while remaining > 0 {
        let (dist, via) = residual.dijkstra(source, &potential);
        if dist[drain] == INFINITE_DISTANCE {
            return finish(&residual, SolveStatus::Infeasible);
        }
        for (p, d) in potential.iter_mut().zip(&dist) {
            if *d != INFINITE_DISTANCE {
                *p += d;
            }
        }

        let mut bottleneck = remaining;
        let mut node = drain;
        while node != source {
            let e = via[node].unwrap_or_else(|| panic!("Broken shortest path at node {node}"));
            bottleneck = bottleneck.min(residual.edges[e].residual);
            node = residual.tail(e);
        }

        let mut node = drain;
        while node != source {
            let e = via[node].unwrap_or_else(|| panic!("Broken shortest path at node {node}"));
            residual.edges[e].residual -= bottleneck;
            residual.edges[e ^ 1].residual += bottleneck;
            node = residual.tail(e);
        }
        remaining -= bottleneck;
    }

    finish(&residual, SolveStatus::Optimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_cheaper_path() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let a = graph.add_node();
        let b = graph.add_node();
        let t = graph.add_node();
        let sa = graph.add_arc(s, a, 2, 1);
        let sb = graph.add_arc(s, b, 2, 5);
        let at = graph.add_arc(a, t, 1, 1);
        let bt = graph.add_arc(b, t, 2, 1);
        let ab = graph.add_arc(a, b, 1, 1);

        let solution = solve(&graph, s, t, 3);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.flow(sa), 2);
        assert_eq!(solution.flow(sb), 1);
        assert_eq!(solution.flow(at), 1);
        assert_eq!(solution.flow(ab), 1);
        assert_eq!(solution.flow(bt), 2);
        // s-a-t (2) + s-a-b-t (3) + s-b-t (6)
        assert_eq!(solution.total_cost(), 11);
    }

    #[test]
    fn rerouting_through_reverse_edges() {
        // Greedy would send instance 0 to site 0 and strand instance 1.
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let i0 = graph.add_node();
        let i1 = graph.add_node();
        let s0 = graph.add_node();
        let s1 = graph.add_node();
        let t = graph.add_node();
        graph.add_arc(s, i0, 1, 0);
        graph.add_arc(s, i1, 1, 0);
        let i0s0 = graph.add_arc(i0, s0, 1, 1);
        let i0s1 = graph.add_arc(i0, s1, 1, 2);
        let i1s0 = graph.add_arc(i1, s0, 1, 1);
        let i1s1 = graph.add_arc(i1, s1, 1, 10);
        graph.add_arc(s0, t, 1, 0);
        graph.add_arc(s1, t, 1, 0);

        let solution = solve(&graph, s, t, 2);
        assert!(solution.is_optimal());
        assert_eq!(solution.flow(i0s0), 0);
        assert_eq!(solution.flow(i0s1), 1);
        assert_eq!(solution.flow(i1s0), 1);
        assert_eq!(solution.flow(i1s1), 0);
        assert_eq!(solution.total_cost(), 3);
    }

    #[test]
    fn insufficient_capacity_is_infeasible() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let t = graph.add_node();
        graph.add_arc(s, t, 2, 1);
        let solution = solve(&graph, s, t, 3);
        assert_eq!(solution.status(), SolveStatus::Infeasible);
    }

    #[test]
    fn zero_supply_is_trivially_optimal() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let t = graph.add_node();
        let arc = graph.add_arc(s, t, 2, 1);
        let solution = solve(&graph, s, t, 0);
        assert!(solution.is_optimal());
        assert_eq!(solution.flow(arc), 0);
        assert_eq!(solution.total_cost(), 0);
    }

    #[test]
    fn negative_costs_without_cycles() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let a = graph.add_node();
        let t = graph.add_node();
        let direct = graph.add_arc(s, t, 1, 0);
        let sa = graph.add_arc(s, a, 1, -3);
        graph.add_arc(a, t, 1, 1);
        let solution = solve(&graph, s, t, 1);
        assert!(solution.is_optimal());
        assert_eq!(solution.flow(sa), 1);
        assert_eq!(solution.flow(direct), 0);
        assert_eq!(solution.total_cost(), -2);
    }

    #[test]
    fn negative_cycle_is_unbounded() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let a = graph.add_node();
        let b = graph.add_node();
        let t = graph.add_node();
        graph.add_arc(s, a, 1, 0);
        graph.add_arc(a, b, 5, -2);
        graph.add_arc(b, a, 5, 1);
        graph.add_arc(b, t, 1, 0);
        let solution = solve(&graph, s, t, 1);
        assert_eq!(solution.status(), SolveStatus::Unbounded);
    }

    #[test]
    #[should_panic(expected = "beyond")]
    fn arc_cost_is_bounded() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        let t = graph.add_node();
        graph.add_arc(s, t, 1, MAX_ARC_COST + 1);
    }

    #[test]
    #[should_panic(expected = "refers to a missing node")]
    fn arc_to_missing_node() {
        let mut graph = FlowGraph::new();
        let s = graph.add_node();
        graph.add_arc(s, 4, 1, 0);
    }
}
