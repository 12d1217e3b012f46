// SPDX-License-Identifier: Apache-2.0

use fixedbitset::FixedBitSet;
use log::{debug, info};

use crate::mcf::FlowSolution;
use crate::network::{ArcRole, FlowNetwork};
use crate::{
    InstanceId, Location, Placement, Point, SiteCatalog, SiteId, SiteOccupancy,
    SiteResourceIndex,
};

/// Final site and slot of one movable instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub instance: InstanceId,
    pub site: SiteId,
    pub slot: u32,
    /// Scaled arc cost of the assignment.
    pub cost: i64,
}

/// Unscaled displacement statistics over all assignments.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostSummary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub max: f64,
}

impl CostSummary {
    pub fn from_costs(costs: impl IntoIterator<Item = f64>) -> Self {
        let costs = costs.into_iter().collect::<Vec<_>>();
        if costs.is_empty() {
            return CostSummary::default();
        }
        let total = costs.iter().sum::<f64>();
        CostSummary {
            count: costs.len(),
            total,
            average: total / costs.len() as f64,
            max: costs.iter().copied().fold(f64::MIN, f64::max),
        }
    }
}

/// Writes the solved flow back into `placement`. Each instance with flow to a
/// site takes the site's lowest free slot and is positioned at the site's
/// lower-left corner plus half its footprint.
///
/// Panics if the flow disagrees with the network (routed flow differs from
/// supply, an instance is assigned zero or several times, or a site runs out
/// of slots).
#[allow(clippy::too_many_arguments)]
pub fn materialize(
    catalog: &impl SiteCatalog,
    index: &SiteResourceIndex,
    network: &FlowNetwork,
    solution: &FlowSolution,
    movable: &[InstanceId],
    occupancy: &mut SiteOccupancy,
    placement: &mut Placement,
    cost_scale: i64,
    log_assignments: bool,
) -> (Vec<Assignment>, CostSummary) {
    let routed = network
        .arcs()
        .filter(|(_, role)| matches!(role, ArcRole::Drain { .. }))
        .map(|(arc, _)| solution.flow(arc))
        .sum::<i64>();
    if routed != network.supply() as i64 {
        panic!(
            "Flow into drain is {routed} but supply is {}",
            network.supply()
        );
    }

    let mut assignments = Vec::with_capacity(movable.len());
    let mut assigned = FixedBitSet::with_capacity(movable.len());
    for (arc, role) in network.arcs() {
        let ArcRole::Assign { instance, site } = role else {
            continue;
        };
        if solution.flow(arc) <= 0 {
            continue;
        }
        if assigned.put(instance) {
            panic!("Instance {} was assigned more than once", movable[instance]);
        }
        let inst = movable[instance];
        let site = index.sites()[site];
        let anchor = catalog.site_bbox(site).anchor();
        let half = placement.footprints[inst.0].half();
        let position = Point::new(anchor.x + half.x, anchor.y + half.y);
        let slot = occupancy
            .claim_first_free(site, inst)
            .unwrap_or_else(|| panic!("No free slot left on site {site} for instance {inst}"));

        if log_assignments {
            let from = placement.positions[inst.0];
            debug!(
                "movable instance {}({}, {}) -> site {} slot {} ({}, {})",
                inst, from.x, from.y, site, slot, position.x, position.y
            );
        }
        placement.positions[inst.0] = position;
        placement.locations[inst.0] = Location::new(position.x, position.y, slot);
        assignments.push(Assignment {
            instance: inst,
            site,
            slot,
            cost: network.graph().cost(arc),
        });
    }

    if assignments.len() != movable.len() {
        panic!(
            "{} of {} movable instances received a site",
            assignments.len(),
            movable.len()
        );
    }

    let summary = CostSummary::from_costs(
        assignments
            .iter()
            .map(|a| a.cost as f64 / cost_scale as f64),
    );
    info!("total cost: {}", summary.total);
    info!("average cost: {}", summary.average);
    info!("max cost: {}", summary.max);

    (assignments, summary)
}
