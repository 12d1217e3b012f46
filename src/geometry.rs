// SPDX-License-Identifier: Apache-2.0

use rstar::AABB;

/// Axis-aligned integer box describing the extent of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl BoundingBox {
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        assert!(
            min_x <= max_x && min_y <= max_y,
            "Invalid bounding box ({min_x}, {min_y}, {max_x}, {max_y})"
        );
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Unit box whose lower-left corner is at `(x, y)`.
    pub fn unit(x: i64, y: i64) -> Self {
        BoundingBox::new(x, y, x + 1, y + 1)
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    /// Lower-left corner. Instances placed on the site are anchored here.
    pub fn anchor(&self) -> Point {
        Point {
            x: self.min_x as f64,
            y: self.min_y as f64,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) as f64 * 0.5,
            y: (self.min_y + self.max_y) as f64 * 0.5,
        }
    }

    /// Returns `true` if the point lies in `[min, max)` along both axes, so
    /// that a point on a shared edge belongs to exactly one of two abutted
    /// boxes.
    pub fn contains_half_open(&self, point: &Point) -> bool {
        (self.min_x as f64) <= point.x
            && point.x < (self.max_x as f64)
            && (self.min_y as f64) <= point.y
            && point.y < (self.max_y as f64)
    }

    pub(crate) fn to_aabb(self) -> AABB<[f64; 2]> {
        AABB::from_corners(
            [self.min_x as f64, self.min_y as f64],
            [self.max_x as f64, self.max_y as f64],
        )
    }
}

/// Continuous position on the layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn manhattan_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// Width and height of an instance. Instances are centered on
/// `anchor + footprint / 2` when placed on a site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    pub fn new(width: f64, height: f64) -> Self {
        Footprint { width, height }
    }

    pub fn half(&self) -> Point {
        Point {
            x: self.width * 0.5,
            y: self.height * 0.5,
        }
    }
}
