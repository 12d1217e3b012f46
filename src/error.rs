// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;
use std::fmt;

use crate::{AreaTypeId, InstanceId, ResourceId, SiteId};

/// Reasons a legalization run is rejected. Internal consistency failures are
/// not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegalizeError {
    /// More than one resource lists the area type.
    AmbiguousAreaType {
        area_type: AreaTypeId,
        resources: Vec<ResourceId>,
    },
    /// No resource lists the area type.
    UnmappedAreaType { area_type: AreaTypeId },
    /// The resource id is not in the catalog.
    UnknownResource { resource: ResourceId, num_resources: usize },
    /// Eligible sites disagree on the capacity offered for the resource.
    NonUniformCapacity {
        resource: ResourceId,
        site: SiteId,
        expected: u32,
        found: u32,
    },
    /// The cost scale is too small to keep sub-unit precision.
    InvalidCostScale { cost_scale: i64, minimum: i64 },
    /// An instance was submitted under more than one area type in a batch.
    InstanceInMultipleGroups {
        instance: InstanceId,
        area_types: Vec<AreaTypeId>,
    },
    /// Two area types of a batch resolve to the same resource.
    SharedResource {
        resource: ResourceId,
        area_types: Vec<AreaTypeId>,
    },
    /// An instance is listed more than once in a request.
    DuplicateInstance { instance: InstanceId },
    /// An instance is listed as both movable and fixed.
    MovableAndFixed { instance: InstanceId },
    /// A movable instance has a non-finite position, or one too far from the
    /// sites for its distance to be costed.
    PositionOutOfRange { instance: InstanceId },
    /// More movable instances than free slots.
    Infeasible { supply: u64, capacity: u64 },
}

impl fmt::Display for LegalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegalizeError::AmbiguousAreaType {
                area_type,
                resources,
            } => write!(
                f,
                "area type {area_type} maps to multiple resources ({})",
                join_ids(resources)
            ),
            LegalizeError::UnmappedAreaType { area_type } => {
                write!(f, "area type {area_type} does not map to any resource")
            }
            LegalizeError::UnknownResource {
                resource,
                num_resources,
            } => write!(
                f,
                "resource {resource} is out of range ({num_resources} resources available)"
            ),
            LegalizeError::NonUniformCapacity {
                resource,
                site,
                expected,
                found,
            } => write!(
                f,
                "site {site} offers {found} slots of resource {resource}, expected {expected}"
            ),
            LegalizeError::InvalidCostScale {
                cost_scale,
                minimum,
            } => write!(f, "cost scale {cost_scale} is below the minimum of {minimum}"),
            LegalizeError::InstanceInMultipleGroups {
                instance,
                area_types,
            } => write!(
                f,
                "instance {instance} is requested under multiple area types ({})",
                join_ids(area_types)
            ),
            LegalizeError::SharedResource {
                resource,
                area_types,
            } => write!(
                f,
                "area types ({}) all resolve to resource {resource}",
                join_ids(area_types)
            ),
            LegalizeError::DuplicateInstance { instance } => {
                write!(f, "instance {instance} is listed more than once")
            }
            LegalizeError::MovableAndFixed { instance } => {
                write!(f, "instance {instance} is listed as both movable and fixed")
            }
            LegalizeError::PositionOutOfRange { instance } => write!(
                f,
                "position of instance {instance} is not finite or too far from the sites"
            ),
            LegalizeError::Infeasible { supply, capacity } => write!(
                f,
                "cannot legalize {supply} instances into {capacity} free slots"
            ),
        }
    }
}

impl std::error::Error for LegalizeError {}

fn join_ids<T: fmt::Display>(ids: &[T]) -> String {
    ids.iter().join(", ")
}
