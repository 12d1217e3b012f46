// SPDX-License-Identifier: Apache-2.0

use std::ops::Range;

use indexmap::IndexMap;
use itertools::Itertools;
use log::info;

use crate::{
    AreaTypeId, InstanceId, LegalizeError, LegalizeOutcome, LegalizeRequest, Placement,
    ResourceSelector, SiteCatalog, SiteLegalizer, select_resource,
};

/// Instance id ranges of a placement. Ids in neither range (fillers, for
/// example) are ignored by batch legalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRanges {
    pub movable: Range<usize>,
    pub fixed: Range<usize>,
}

impl InstanceRanges {
    /// Splits `insts` into movable and fixed ids, preserving the order of
    /// first occurrence and dropping repeats. An id in both ranges counts as
    /// movable.
    pub fn partition(&self, insts: &[InstanceId]) -> (Vec<InstanceId>, Vec<InstanceId>) {
        let movable = insts
            .iter()
            .copied()
            .unique()
            .filter(|inst| self.movable.contains(&inst.0))
            .collect();
        let fixed = insts
            .iter()
            .copied()
            .unique()
            .filter(|inst| self.fixed.contains(&inst.0) && !self.movable.contains(&inst.0))
            .collect();
        (movable, fixed)
    }
}

/// Result of legalizing one area type within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaTypeOutcome {
    pub area_type: AreaTypeId,
    pub num_movable: usize,
    pub num_fixed: usize,
    pub outcome: LegalizeOutcome,
}

impl<C: SiteCatalog> SiteLegalizer<'_, C> {
    /// Legalizes several area types one after another over the same
    /// placement. Each group lists the instances of one area type.
    ///
    /// The groups are checked up front: an instance listed under two area
    /// types, or two area types resolving to the same resource, rejects the
    /// whole batch before anything moves. A failure while legalizing a group
    /// stops the batch; groups already legalized keep their new positions.
    pub fn legalize_area_types(
        &self,
        groups: &[(AreaTypeId, Vec<InstanceId>)],
        ranges: &InstanceRanges,
        placement: &mut Placement,
    ) -> Result<Vec<AreaTypeOutcome>, LegalizeError> {
        self.check_groups(groups)?;

        let mut outcomes = Vec::with_capacity(groups.len());
        for (area_type, insts) in groups {
            let (movable, fixed) = ranges.partition(insts);
            info!(
                "legalization: area type: {}({}) movable: {} fixed: {}",
                self.catalog.area_type_name(*area_type).unwrap_or("?"),
                area_type,
                movable.len(),
                fixed.len()
            );
            let outcome = self.legalize(
                &LegalizeRequest {
                    target: ResourceSelector::AreaType(*area_type),
                    movable: &movable,
                    fixed: &fixed,
                },
                placement,
            )?;
            outcomes.push(AreaTypeOutcome {
                area_type: *area_type,
                num_movable: movable.len(),
                num_fixed: fixed.len(),
                outcome,
            });
        }
        Ok(outcomes)
    }

    fn check_groups(&self, groups: &[(AreaTypeId, Vec<InstanceId>)]) -> Result<(), LegalizeError> {
        let mut owners: IndexMap<InstanceId, Vec<AreaTypeId>> = IndexMap::new();
        for (area_type, insts) in groups {
            for inst in insts.iter().unique() {
                owners.entry(*inst).or_default().push(*area_type);
            }
        }
        if let Some((instance, area_types)) = owners.into_iter().find(|(_, ats)| ats.len() > 1) {
            return Err(LegalizeError::InstanceInMultipleGroups {
                instance,
                area_types,
            });
        }

        let mut by_resource = IndexMap::new();
        for (area_type, _) in groups {
            let resource = select_resource(self.catalog, ResourceSelector::AreaType(*area_type))?;
            by_resource
                .entry(resource)
                .or_insert_with(Vec::new)
                .push(*area_type);
        }
        if let Some((resource, area_types)) = by_resource.into_iter().find(|(_, ats)| ats.len() > 1)
        {
            return Err(LegalizeError::SharedResource {
                resource,
                area_types,
            });
        }
        Ok(())
    }
}
