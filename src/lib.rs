// SPDX-License-Identifier: Apache-2.0

//! Site and slot legalization of placed instances by min-cost flow.
//!
//! A run takes the movable instances that demand one resource, the fixed
//! instances already sitting on that resource's sites, and a site catalog.
//! Fixed instances claim their slots first. The remaining free slots become
//! drain capacities of a bipartite flow network whose instance→site arcs cost
//! the scaled Manhattan distance from each instance to each site center. The
//! optimal flow is then turned into concrete `(x, y, z)` locations.

mod batch;
mod error;
mod geometry;
mod layout;
mod legalizer;
mod materialize;
mod mcf;
mod network;
mod occupancy;
mod options;
mod placement;
mod resource_index;

pub use batch::{AreaTypeOutcome, InstanceRanges};
pub use error::LegalizeError;
pub use geometry::{BoundingBox, Footprint, Point};
pub use layout::{
    AreaTypeId, Layout, Resource, ResourceId, Site, SiteCatalog, SiteId, SiteType, SiteTypeId,
};
pub use legalizer::{LegalizeOutcome, LegalizeReport, LegalizeRequest, SiteLegalizer};
pub use materialize::{Assignment, CostSummary, materialize};
pub use mcf::{
    ArcId, FlowGraph, FlowSolution, MAX_ARC_COST, NodeId, SolveStatus,
    solve as solve_min_cost_flow,
};
pub use network::{ArcRole, FlowNetwork, SeedReport, assignment_cost, seed_fixed_instances};
pub use occupancy::{ClaimError, SiteOccupancy, SlotBucket};
pub use options::{LegalizerOptions, MIN_COST_SCALE};
pub use placement::{InstanceId, Location, Placement};
pub use resource_index::{ResourceSelector, SiteResourceIndex, select_resource};
