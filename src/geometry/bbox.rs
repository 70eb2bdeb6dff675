// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    /// True until at least one point has been included
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Overlap test with an open interior: boxes that only touch do not intersect
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min - other.min).amax() < tolerance && (self.max - other.max).amax() < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let mut bbox = BoundingBox::empty();
        assert!(bbox.is_empty());
        bbox.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        bbox.expand_to_include(&Point3::new(-1.0, -2.0, -3.0));

        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.volume(), 48.0);
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = BoundingBox::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));

        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(!a.intersects(&BoundingBox::empty()));
    }
}
