// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Swept tool volume for one straight cutting segment
//!
//! The cylindrical tool's capsule-shaped sweep is approximated by a
//! rectangular prism: the footprint is offset sideways by the tool radius
//! and extruded up to a fixed plunge height that clears the stock. Corners
//! are square rather than rounded.

use super::{primitives, Solid, EPSILON};
use nalgebra::{Point3, Vector3};

/// Builds sweep solids for a fixed tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepVolumeBuilder {
    tool_radius: f64,
    plunge_height: f64,
}

impl SweepVolumeBuilder {
    pub fn new(tool_radius: f64, plunge_height: f64) -> Self {
        Self {
            tool_radius,
            plunge_height,
        }
    }

    pub fn tool_radius(&self) -> f64 {
        self.tool_radius
    }

    pub fn plunge_height(&self) -> f64 {
        self.plunge_height
    }

    /// Solid swept by the tool travelling from `p1` to `p2`
    ///
    /// Returns an empty solid when the sweep would have no volume: a tool
    /// without radius, or a segment whose bottom is not below the plunge
    /// height.
    pub fn build(&self, p1: &Point3<f64>, p2: &Point3<f64>) -> Solid {
        match self.corners(p1, p2) {
            Some(corners) => Solid::from_polygons(primitives::hexahedron(&corners)),
            None => {
                tracing::debug!(?p1, ?p2, "degenerate sweep, nothing to remove");
                Solid::empty()
            }
        }
    }

    /// The eight hexahedron corners, bottom four first
    pub fn corners(&self, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<[Point3<f64>; 8]> {
        let radius = self.tool_radius;
        if !(radius > 0.0) || !radius.is_finite() {
            return None;
        }
        if p1.z.max(p2.z) >= self.plunge_height - EPSILON {
            return None;
        }

        let travel = p2 - p1;
        let cross = travel.cross(&Vector3::z());

        let bottom = if cross.x.abs() < 1e-9 && cross.y.abs() < 1e-9 {
            // Plunge or retract: square footprint around the end point
            [
                Point3::new(p2.x - radius, p2.y - radius, p2.z),
                Point3::new(p2.x + radius, p2.y - radius, p2.z),
                Point3::new(p2.x + radius, p2.y + radius, p2.z),
                Point3::new(p2.x - radius, p2.y + radius, p2.z),
            ]
        } else {
            let offset = cross.normalize() * radius;
            [p1 - offset, p1 + offset, p2 + offset, p2 - offset]
        };

        let top = bottom.map(|p| Point3::new(p.x, p.y, self.plunge_height));

        Some([
            bottom[0], bottom[1], bottom[2], bottom[3], top[0], top[1], top[2], top[3],
        ])
    }
}

/// Sweep solid for a single segment
pub fn build_sweep(p1: &Point3<f64>, p2: &Point3<f64>, tool_radius: f64, plunge_height: f64) -> Solid {
    SweepVolumeBuilder::new(tool_radius, plunge_height).build(p1, p2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_sweep_volume() {
        let sweep = build_sweep(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(10.0, 0.0, 0.0),
            1.0,
            5.0,
        );
        assert_eq!(sweep.polygon_count(), 6);
        assert_relative_eq!(sweep.volume(), 10.0 * 2.0 * 5.0, epsilon = 1e-9);
        assert!(sweep.contains_point(&Point3::new(5.0, 0.5, 1.0)));
        assert!(!sweep.contains_point(&Point3::new(5.0, 1.5, 1.0)));
    }

    #[test]
    fn test_reverse_direction_keeps_outward_winding() {
        let sweep = build_sweep(
            &Point3::new(10.0, 3.0, 1.0),
            &Point3::new(-2.0, -6.0, 1.0),
            0.5,
            4.0,
        );
        let length = (12.0f64 * 12.0 + 9.0 * 9.0).sqrt();
        assert_relative_eq!(sweep.volume(), length * 1.0 * 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vertical_plunge_uses_square_footprint() {
        let builder = SweepVolumeBuilder::new(2.0, 10.0);
        let corners = builder
            .corners(&Point3::new(5.0, 5.0, 8.0), &Point3::new(5.0, 5.0, 1.0))
            .unwrap();

        assert_eq!(corners[0], Point3::new(3.0, 3.0, 1.0));
        assert_eq!(corners[2], Point3::new(7.0, 7.0, 1.0));
        assert_eq!(corners[6], Point3::new(7.0, 7.0, 10.0));

        let sweep = builder.build(&Point3::new(5.0, 5.0, 8.0), &Point3::new(5.0, 5.0, 1.0));
        assert_relative_eq!(sweep.volume(), 4.0 * 4.0 * 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_length_segment_is_a_plunge() {
        let p = Point3::new(1.0, 1.0, 0.0);
        let sweep = build_sweep(&p, &p, 1.0, 2.0);
        assert_relative_eq!(sweep.volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_sweeps_are_empty() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, 0.0, 0.0);
        assert!(build_sweep(&a, &b, 0.0, 5.0).is_empty());
        assert!(build_sweep(&a, &b, 1.0, 0.0).is_empty());
        assert!(build_sweep(&a, &Point3::new(10.0, 0.0, 6.0), 1.0, 5.0).is_empty());
    }
}
