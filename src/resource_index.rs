// SPDX-License-Identifier: Apache-2.0

use rstar::{AABB, RTree, RTreeObject};

use crate::{AreaTypeId, LegalizeError, Point, ResourceId, SiteCatalog, SiteId};

/// What a legalization run targets: a resource directly, or the area type
/// whose (single) resource should be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSelector {
    Resource(ResourceId),
    AreaType(AreaTypeId),
}

/// Resolves a selector to exactly one resource.
pub fn select_resource(
    catalog: &impl SiteCatalog,
    selector: ResourceSelector,
) -> Result<ResourceId, LegalizeError> {
    let num_resources = catalog.num_resources();
    match selector {
        ResourceSelector::Resource(resource) => {
            if resource.0 < num_resources {
                Ok(resource)
            } else {
                Err(LegalizeError::UnknownResource {
                    resource,
                    num_resources,
                })
            }
        }
        ResourceSelector::AreaType(area_type) => {
            let matches = (0..num_resources)
                .map(ResourceId)
                .filter(|&resource| catalog.resource_area_types(resource).contains(&area_type))
                .collect::<Vec<_>>();
            match matches.len() {
                0 => Err(LegalizeError::UnmappedAreaType { area_type }),
                1 => Ok(matches[0]),
                _ => Err(LegalizeError::AmbiguousAreaType {
                    area_type,
                    resources: matches,
                }),
            }
        }
    }
}

struct SiteEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for SiteEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Sites offering a resource, in catalog order, with their shared capacity.
pub struct SiteResourceIndex {
    resource: ResourceId,
    sites: Vec<SiteId>,
    capacity: u32,
    rtree: RTree<SiteEnvelope>,
}

impl SiteResourceIndex {
    pub fn new(catalog: &impl SiteCatalog, resource: ResourceId) -> Result<Self, LegalizeError> {
        let mut sites = Vec::new();
        let mut capacity = None;
        for site in (0..catalog.num_sites()).map(SiteId) {
            let site_capacity = catalog.site_capacity(site, resource);
            if site_capacity == 0 {
                continue;
            }
            match capacity {
                None => capacity = Some(site_capacity),
                Some(expected) if expected != site_capacity => {
                    return Err(LegalizeError::NonUniformCapacity {
                        resource,
                        site,
                        expected,
                        found: site_capacity,
                    });
                }
                Some(_) => (),
            }
            sites.push(site);
        }

        let rtree = RTree::bulk_load(
            sites
                .iter()
                .enumerate()
                .map(|(position, site)| SiteEnvelope {
                    position,
                    envelope: catalog.site_bbox(*site).to_aabb(),
                })
                .collect::<Vec<_>>(),
        );

        Ok(SiteResourceIndex {
            resource,
            sites,
            capacity: capacity.unwrap_or(0),
            rtree,
        })
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Slots per site. Zero when no site offers the resource.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Eligible site containing `point`, using half-open box bounds. If boxes
    /// overlap, the site earliest in catalog order is returned.
    pub fn site_at(&self, catalog: &impl SiteCatalog, point: &Point) -> Option<SiteId> {
        // the rtree reports closed-interval hits, so shared edges are
        // filtered with the exact box test below
        self.rtree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .map(|candidate| candidate.position)
            .filter(|&position| {
                catalog
                    .site_bbox(self.sites[position])
                    .contains_half_open(point)
            })
            .min()
            .map(|position| self.sites[position])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, Layout};

    fn io_layout() -> (Layout, AreaTypeId, ResourceId) {
        let mut layout = Layout::new();
        let io_at = layout.add_area_type("IO");
        let lut_at = layout.add_area_type("LUT");
        let io = layout.add_resource("IO", &[io_at]);
        let lut = layout.add_resource("LUT", &[lut_at]);
        let iob = layout.add_site_type("IOB", &[(io, 2)]);
        let slice = layout.add_site_type("SLICE", &[(lut, 8)]);
        layout.add_site(iob, BoundingBox::unit(0, 0));
        layout.add_site(slice, BoundingBox::unit(1, 0));
        layout.add_site(iob, BoundingBox::unit(2, 0));
        (layout, io_at, io)
    }

    #[test]
    fn area_type_selects_single_resource() {
        let (layout, io_at, io) = io_layout();
        assert_eq!(
            select_resource(&layout, ResourceSelector::AreaType(io_at)),
            Ok(io)
        );
        assert_eq!(
            select_resource(&layout, ResourceSelector::Resource(io)),
            Ok(io)
        );
    }

    #[test]
    fn area_type_shared_by_two_resources_is_rejected() {
        let mut layout = Layout::new();
        let io_at = layout.add_area_type("IO");
        let a = layout.add_resource("IOA", &[io_at]);
        let b = layout.add_resource("IOB", &[io_at]);
        assert_eq!(
            select_resource(&layout, ResourceSelector::AreaType(io_at)),
            Err(LegalizeError::AmbiguousAreaType {
                area_type: io_at,
                resources: vec![a, b]
            })
        );
    }

    #[test]
    fn unknown_selectors_are_rejected() {
        let mut layout = Layout::new();
        let orphan = layout.add_area_type("ORPHAN");
        assert_eq!(
            select_resource(&layout, ResourceSelector::AreaType(orphan)),
            Err(LegalizeError::UnmappedAreaType { area_type: orphan })
        );
        assert_eq!(
            select_resource(&layout, ResourceSelector::Resource(ResourceId(0))),
            Err(LegalizeError::UnknownResource {
                resource: ResourceId(0),
                num_resources: 0
            })
        );
    }

    #[test]
    fn eligible_sites_in_catalog_order() {
        let (layout, _, io) = io_layout();
        let index = SiteResourceIndex::new(&layout, io).unwrap();
        assert_eq!(index.sites(), &[SiteId(0), SiteId(2)]);
        assert_eq!(index.capacity(), 2);
    }

    #[test]
    fn non_uniform_capacity_is_rejected() {
        let (mut layout, _, io) = io_layout();
        let big_iob = layout.add_site_type("BIG_IOB", &[(io, 4)]);
        layout.add_site(big_iob, BoundingBox::unit(3, 0));
        assert_eq!(
            SiteResourceIndex::new(&layout, io).err(),
            Some(LegalizeError::NonUniformCapacity {
                resource: io,
                site: SiteId(3),
                expected: 2,
                found: 4
            })
        );
    }

    #[test]
    fn site_lookup_by_point() {
        let (layout, _, io) = io_layout();
        let index = SiteResourceIndex::new(&layout, io).unwrap();
        assert_eq!(index.site_at(&layout, &Point::new(0.0, 0.0)), Some(SiteId(0)));
        assert_eq!(index.site_at(&layout, &Point::new(2.5, 0.5)), Some(SiteId(2)));
        // shared edge with the slice site, which is not eligible
        assert_eq!(index.site_at(&layout, &Point::new(1.0, 0.0)), None);
        assert_eq!(index.site_at(&layout, &Point::new(3.0, 0.0)), None);
    }
}
