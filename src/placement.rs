// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::{Footprint, Point};

/// Index of an instance into the [`Placement`] arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

impl InstanceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position plus slot index within the site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: u32,
}

impl Location {
    pub fn new(x: f64, y: f64, z: u32) -> Self {
        Location { x, y, z }
    }

    pub fn point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

/// Caller-owned per-instance arrays, indexed by [`InstanceId`].
///
/// `locations` is read for fixed instances and written for movable instances
/// that receive an assignment; `positions` is read as the starting point of
/// movable instances and overwritten on assignment.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub positions: Vec<Point>,
    pub locations: Vec<Location>,
    pub footprints: Vec<Footprint>,
}

impl Placement {
    /// Placement of `num_insts` instances at the origin with unit footprints.
    pub fn new(num_insts: usize) -> Self {
        Placement {
            positions: vec![Point::default(); num_insts],
            locations: vec![Location::default(); num_insts],
            footprints: vec![Footprint::new(1.0, 1.0); num_insts],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub(crate) fn check_instance(&self, inst: InstanceId) {
        let num_insts = self.len();
        if inst.0 >= num_insts
            || inst.0 >= self.locations.len()
            || inst.0 >= self.footprints.len()
        {
            panic!(
                "Instance {inst} is out of range (positions: {num_insts}, locations: {}, footprints: {})",
                self.locations.len(),
                self.footprints.len()
            );
        }
    }
}
