// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

use crate::BoundingBox;

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(&self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_id!(
    /// Index of a resource (functional capacity offered by sites).
    ResourceId
);
catalog_id!(
    /// Index of an area type (resource demand class of an instance).
    AreaTypeId
);
catalog_id!(SiteTypeId);
catalog_id!(
    /// Index of a site in catalog order.
    SiteId
);

/// Read-only queries the legalizer makes against the layout database.
pub trait SiteCatalog {
    fn num_resources(&self) -> usize;

    /// Area types served by a resource.
    fn resource_area_types(&self, resource: ResourceId) -> &[AreaTypeId];

    fn num_sites(&self) -> usize;

    fn site_bbox(&self, site: SiteId) -> BoundingBox;

    /// Number of slots of `resource` offered by `site`; zero if none.
    fn site_capacity(&self, site: SiteId, resource: ResourceId) -> u32;

    fn area_type_name(&self, _area_type: AreaTypeId) -> Option<&str> {
        None
    }

    fn resource_name(&self, _resource: ResourceId) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub area_types: Vec<AreaTypeId>,
}

#[derive(Debug, Clone)]
pub struct SiteType {
    pub name: String,
    capacities: IndexMap<ResourceId, u32>,
}

impl SiteType {
    pub fn capacity(&self, resource: ResourceId) -> u32 {
        self.capacities.get(&resource).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Site {
    pub bbox: BoundingBox,
    pub site_type: SiteTypeId,
}

/// In-memory site catalog.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    area_types: IndexMap<String, AreaTypeId>,
    resources: Vec<Resource>,
    site_types: IndexMap<String, SiteType>,
    sites: Vec<Site>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an area type. Panics if the name is already taken.
    pub fn add_area_type(&mut self, name: impl AsRef<str>) -> AreaTypeId {
        let name = name.as_ref();
        if self.area_types.contains_key(name) {
            panic!("Area type {name} already exists");
        }
        let id = AreaTypeId(self.area_types.len());
        self.area_types.insert(name.to_string(), id);
        id
    }

    pub fn add_resource(&mut self, name: impl AsRef<str>, area_types: &[AreaTypeId]) -> ResourceId {
        for area_type in area_types {
            if area_type.0 >= self.area_types.len() {
                panic!(
                    "Resource {} refers to unknown area type {}",
                    name.as_ref(),
                    area_type
                );
            }
        }
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource {
            name: name.as_ref().to_string(),
            area_types: area_types.to_vec(),
        });
        id
    }

    pub fn add_site_type(
        &mut self,
        name: impl AsRef<str>,
        capacities: &[(ResourceId, u32)],
    ) -> SiteTypeId {
        let name = name.as_ref();
        if self.site_types.contains_key(name) {
            panic!("Site type {name} already exists");
        }
        let mut table = IndexMap::new();
        for &(resource, capacity) in capacities {
            if resource.0 >= self.resources.len() {
                panic!("Site type {name} refers to unknown resource {resource}");
            }
            table.insert(resource, capacity);
        }
        let id = SiteTypeId(self.site_types.len());
        self.site_types.insert(
            name.to_string(),
            SiteType {
                name: name.to_string(),
                capacities: table,
            },
        );
        id
    }

    pub fn add_site(&mut self, site_type: SiteTypeId, bbox: BoundingBox) -> SiteId {
        if site_type.0 >= self.site_types.len() {
            panic!("Unknown site type {site_type}");
        }
        let id = SiteId(self.sites.len());
        self.sites.push(Site { bbox, site_type });
        id
    }

    pub fn area_type_by_name(&self, name: &str) -> Option<AreaTypeId> {
        self.area_types.get(name).copied()
    }

    pub fn site(&self, site: SiteId) -> &Site {
        &self.sites[site.0]
    }

    pub fn site_type(&self, site: SiteId) -> &SiteType {
        &self.site_types[self.sites[site.0].site_type.0]
    }

    pub fn resource(&self, resource: ResourceId) -> &Resource {
        &self.resources[resource.0]
    }
}

impl SiteCatalog for Layout {
    fn num_resources(&self) -> usize {
        self.resources.len()
    }

    fn resource_area_types(&self, resource: ResourceId) -> &[AreaTypeId] {
        &self.resources[resource.0].area_types
    }

    fn num_sites(&self) -> usize {
        self.sites.len()
    }

    fn site_bbox(&self, site: SiteId) -> BoundingBox {
        self.sites[site.0].bbox
    }

    fn site_capacity(&self, site: SiteId, resource: ResourceId) -> u32 {
        self.site_type(site).capacity(resource)
    }

    fn area_type_name(&self, area_type: AreaTypeId) -> Option<&str> {
        self.area_types
            .get_index(area_type.0)
            .map(|(name, _)| name.as_str())
    }

    fn resource_name(&self, resource: ResourceId) -> Option<&str> {
        self.resources.get(resource.0).map(|r| r.name.as_str())
    }
}
