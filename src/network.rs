// SPDX-License-Identifier: Apache-2.0

use log::{error, warn};

use crate::mcf::{self, ArcId, FlowGraph, FlowSolution, MAX_ARC_COST, NodeId};
use crate::{
    InstanceId, LegalizeError, Location, Point, SiteCatalog, SiteOccupancy, SiteResourceIndex,
};

/// Scaled and truncated Manhattan distance between an instance position and
/// a site center. Non-finite distances truncate to 0 or saturate, so callers
/// check positions first.
pub fn assignment_cost(position: &Point, site_center: &Point, cost_scale: i64) -> i64 {
    (position.manhattan_distance(site_center) * cost_scale as f64) as i64
}

/// Outcome of claiming slots for fixed instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub claimed: usize,
    pub skipped: Vec<InstanceId>,
}

/// Claims the slots of fixed instances. A fixed instance whose location is
/// not on an eligible site, or whose slot is out of range or already taken,
/// is reported and skipped.
pub fn seed_fixed_instances(
    catalog: &impl SiteCatalog,
    index: &SiteResourceIndex,
    fixed: &[InstanceId],
    locations: &[Location],
    occupancy: &mut SiteOccupancy,
) -> SeedReport {
    let mut report = SeedReport::default();
    for &inst in fixed {
        let location = &locations[inst.0];
        let Some(site) = index.site_at(catalog, &location.point()) else {
            warn!(
                "fixed instance {}({}, {}, {}) is not on a site with resource {}",
                inst,
                location.x,
                location.y,
                location.z,
                index.resource()
            );
            report.skipped.push(inst);
            continue;
        };
        match occupancy.claim(site, location.z, inst) {
            Ok(()) => report.claimed += 1,
            Err(err) => {
                error!(
                    "fixed instance {}({}, {}, {}) on site {}: {}",
                    inst, location.x, location.y, location.z, site, err
                );
                report.skipped.push(inst);
            }
        }
    }
    report
}

/// What an arc of the network stands for. Instance and site fields are
/// positions in the movable list and in the eligible site list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcRole {
    Supply { instance: usize },
    Drain { site: usize },
    Assign { instance: usize, site: usize },
}

/// Source → instances → sites → drain network of one legalization run.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: FlowGraph,
    roles: Vec<ArcRole>,
    source: NodeId,
    drain: NodeId,
    supply: u64,
    capacity: u64,
}

impl FlowNetwork {
    /// Builds the network for `movable` instances at `positions`. Site→drain
    /// capacities are the slots left free in `occupancy`.
    ///
    /// Fails with [`LegalizeError::Infeasible`] if there are more movable
    /// instances than free slots, and with
    /// [`LegalizeError::PositionOutOfRange`] if a position is not finite or
    /// its cost to some site exceeds [`MAX_ARC_COST`].
    pub fn build(
        catalog: &impl SiteCatalog,
        index: &SiteResourceIndex,
        occupancy: &SiteOccupancy,
        movable: &[InstanceId],
        positions: &[Point],
        cost_scale: i64,
    ) -> Result<Self, LegalizeError> {
        let mut graph = FlowGraph::new();
        let mut roles = Vec::new();
        let source = graph.add_node();
        let drain = graph.add_node();

        let instance_nodes = (0..movable.len())
            .map(|instance| {
                let node = graph.add_node();
                graph.add_arc(source, node, 1, 0);
                roles.push(ArcRole::Supply { instance });
                node
            })
            .collect::<Vec<_>>();
        let supply = movable.len() as u64;

        let mut capacity = 0u64;
        let site_nodes = index
            .sites()
            .iter()
            .enumerate()
            .map(|(site, site_id)| {
                let node = graph.add_node();
                let free = occupancy.free(*site_id);
                graph.add_arc(node, drain, free as i64, 0);
                roles.push(ArcRole::Drain { site });
                capacity += free as u64;
                node
            })
            .collect::<Vec<_>>();

        if supply > capacity {
            return Err(LegalizeError::Infeasible { supply, capacity });
        }

        let centers = index
            .sites()
            .iter()
            .map(|site| catalog.site_bbox(*site).center())
            .collect::<Vec<_>>();
        for (instance, inst) in movable.iter().enumerate() {
            let position = &positions[inst.0];
            if !position.x.is_finite() || !position.y.is_finite() {
                return Err(LegalizeError::PositionOutOfRange { instance: *inst });
            }
            for (site, center) in centers.iter().enumerate() {
                let cost = assignment_cost(position, center, cost_scale);
                if cost > MAX_ARC_COST {
                    return Err(LegalizeError::PositionOutOfRange { instance: *inst });
                }
                graph.add_arc(instance_nodes[instance], site_nodes[site], 1, cost);
                roles.push(ArcRole::Assign { instance, site });
            }
        }

        Ok(FlowNetwork {
            graph,
            roles,
            source,
            drain,
            supply,
            capacity,
        })
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn drain(&self) -> NodeId {
        self.drain
    }

    /// Number of movable instances.
    pub fn supply(&self) -> u64 {
        self.supply
    }

    /// Free slots over all eligible sites.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn role(&self, arc: ArcId) -> ArcRole {
        self.roles[arc]
    }

    pub fn arcs(&self) -> impl Iterator<Item = (ArcId, ArcRole)> + '_ {
        self.roles.iter().copied().enumerate()
    }

    pub fn solve(&self) -> FlowSolution {
        mcf::solve(&self.graph, self.source, self.drain, self.supply as i64)
    }
}
