// SPDX-License-Identifier: Apache-2.0

use fixedbitset::FixedBitSet;
use log::{error, info};

use crate::materialize::{self, Assignment, CostSummary};
use crate::mcf::SolveStatus;
use crate::network::{self, FlowNetwork, SeedReport};
use crate::{
    InstanceId, LegalizeError, LegalizerOptions, Placement, ResourceId, ResourceSelector,
    SiteCatalog, SiteOccupancy, SiteResourceIndex, select_resource,
};

/// Instances to legalize for one resource.
///
/// An instance must not appear in requests for two different resources of
/// the same placement: each run only knows about its own resource's fixed
/// instances.
#[derive(Debug, Clone)]
pub struct LegalizeRequest<'a> {
    pub target: ResourceSelector,
    pub movable: &'a [InstanceId],
    pub fixed: &'a [InstanceId],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegalizeReport {
    pub resource: ResourceId,
    pub assignments: Vec<Assignment>,
    /// Sum of scaled assignment costs; minimal over all feasible assignments.
    pub total_cost: i64,
    pub summary: CostSummary,
    pub seed: SeedReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegalizeOutcome {
    /// Nothing to move; the placement is untouched.
    NoMovableInstances,
    Assigned(LegalizeReport),
}

impl LegalizeOutcome {
    pub fn report(&self) -> Option<&LegalizeReport> {
        match self {
            LegalizeOutcome::NoMovableInstances => None,
            LegalizeOutcome::Assigned(report) => Some(report),
        }
    }
}

/// Assigns movable instances to sites and slots of one resource by min-cost
/// flow.
pub struct SiteLegalizer<'a, C: SiteCatalog> {
    pub(crate) catalog: &'a C,
    pub(crate) options: LegalizerOptions,
}

impl<'a, C: SiteCatalog> SiteLegalizer<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        SiteLegalizer {
            catalog,
            options: LegalizerOptions::default(),
        }
    }

    pub fn with_options(catalog: &'a C, options: LegalizerOptions) -> Self {
        SiteLegalizer { catalog, options }
    }

    pub fn options(&self) -> &LegalizerOptions {
        &self.options
    }

    /// Moves every instance of `request.movable` onto a free slot of a site
    /// offering the requested resource, minimizing total Manhattan
    /// displacement from the current positions to site centers.
    ///
    /// Every id may appear once across `movable` and `fixed`.
    ///
    /// On error the placement is left unchanged. Panics if an instance id is
    /// out of range of the placement, or if the flow solution is inconsistent
    /// with the network.
    pub fn legalize(
        &self,
        request: &LegalizeRequest,
        placement: &mut Placement,
    ) -> Result<LegalizeOutcome, LegalizeError> {
        self.options.validate()?;
        for &inst in request.movable.iter().chain(request.fixed) {
            placement.check_instance(inst);
        }
        check_distinct(request, placement.len())?;

        let resource = select_resource(self.catalog, request.target)?;
        let index = SiteResourceIndex::new(self.catalog, resource)?;

        if let ResourceSelector::AreaType(area_type) = request.target {
            info!(
                "area type: {}({})",
                self.catalog.area_type_name(area_type).unwrap_or("?"),
                area_type
            );
        }
        info!(
            "resource type: {}({})",
            self.catalog.resource_name(resource).unwrap_or("?"),
            resource
        );
        info!("#movable insts: {}", request.movable.len());
        info!("#fixed insts: {}", request.fixed.len());
        info!("#sites with resource {}: {}", resource, index.len());
        info!("site capacity of resource {}: {}", resource, index.capacity());

        if request.movable.is_empty() {
            info!("no movable instances");
            return Ok(LegalizeOutcome::NoMovableInstances);
        }

        let mut occupancy = SiteOccupancy::new(index.capacity());
        let seed = network::seed_fixed_instances(
            self.catalog,
            &index,
            request.fixed,
            &placement.locations,
            &mut occupancy,
        );

        let network = FlowNetwork::build(
            self.catalog,
            &index,
            &occupancy,
            request.movable,
            &placement.positions,
            self.options.cost_scale,
        )
        .inspect_err(|err| {
            if let LegalizeError::Infeasible { supply, capacity } = err {
                error!("total supply {supply} exceeds total capacity {capacity}");
            }
        })?;
        info!("total supply: {}", network.supply());
        info!("total capacity: {}", network.capacity());

        let solution = network.solve();
        match solution.status() {
            SolveStatus::Optimal => (),
            status => panic!(
                "Flow solve returned {status:?} for supply {} and capacity {}",
                network.supply(),
                network.capacity()
            ),
        }

        let (assignments, summary) = materialize::materialize(
            self.catalog,
            &index,
            &network,
            &solution,
            request.movable,
            &mut occupancy,
            placement,
            self.options.cost_scale,
            self.options.log_assignments,
        );

        Ok(LegalizeOutcome::Assigned(LegalizeReport {
            resource,
            assignments,
            total_cost: solution.total_cost(),
            summary,
            seed,
        }))
    }
}

fn check_distinct(request: &LegalizeRequest, num_insts: usize) -> Result<(), LegalizeError> {
    let mut movable = FixedBitSet::with_capacity(num_insts);
    for &inst in request.movable {
        if movable.put(inst.0) {
            return Err(LegalizeError::DuplicateInstance { instance: inst });
        }
    }
    let mut fixed = FixedBitSet::with_capacity(num_insts);
    for &inst in request.fixed {
        if movable.contains(inst.0) {
            return Err(LegalizeError::MovableAndFixed { instance: inst });
        }
        if fixed.put(inst.0) {
            return Err(LegalizeError::DuplicateInstance { instance: inst });
        }
    }
    Ok(())
}
