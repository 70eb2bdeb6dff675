// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Toolpath representation: absolute waypoints tagged jog or move

use crate::geometry::BoundingBox;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// How the tool travels to a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    /// Rapid traversal, never cuts
    Jog,
    /// Cutting traversal
    Move,
}

/// Absolute position the tool passes through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Point3<f64>,
    pub motion: MotionType,
}

impl Waypoint {
    pub fn new(position: Point3<f64>, motion: MotionType) -> Self {
        Self { position, motion }
    }

    pub fn jog(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z), MotionType::Jog)
    }

    pub fn cut(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z), MotionType::Move)
    }
}

/// One travel between consecutive waypoints, tagged with the motion of its end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub motion: MotionType,
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn is_cutting(&self) -> bool {
        self.motion == MotionType::Move
    }
}

/// Ordered waypoints; index 0 is always the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// A path holding only the implicit origin
    pub fn new() -> Self {
        Self {
            waypoints: vec![Waypoint::jog(0.0, 0.0, 0.0)],
        }
    }

    /// Build a path from explicit waypoints; the origin is prepended
    pub fn from_waypoints(waypoints: impl IntoIterator<Item = Waypoint>) -> Self {
        let mut path = Self::new();
        path.waypoints.extend(waypoints);
        path
    }

    pub(crate) fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// True when there is nothing to travel (only the origin)
    pub fn is_empty(&self) -> bool {
        self.waypoints.len() <= 1
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Segment `index` spans waypoints `index` and `index + 1`
    pub fn segment(&self, index: usize) -> Option<Segment> {
        let start = self.waypoints.get(index)?;
        let end = self.waypoints.get(index + 1)?;
        Some(Segment {
            start: start.position,
            end: end.position,
            motion: end.motion,
        })
    }

    /// Every consecutive pair, for drawing jog and move lines
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.waypoints.windows(2).map(|pair| Segment {
            start: pair[0].position,
            end: pair[1].position,
            motion: pair[1].motion,
        })
    }

    /// Total travel length of cutting segments
    pub fn cutting_length(&self) -> f64 {
        self.segments()
            .filter(Segment::is_cutting)
            .map(|s| s.length())
            .sum()
    }

    pub fn bounds(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for waypoint in &self.waypoints {
            bbox.expand_to_include(&waypoint.position);
        }
        bbox
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_path_has_origin() {
        let path = Path::new();
        assert_eq!(path.len(), 1);
        assert!(path.is_empty());
        assert_eq!(path.segment_count(), 0);
        assert_eq!(path.waypoints()[0].position, Point3::origin());
    }

    #[test]
    fn test_segments_take_motion_of_end() {
        let path = Path::from_waypoints([Waypoint::jog(10.0, 0.0, 0.0), Waypoint::cut(10.0, 10.0, 0.0)]);
        let segments: Vec<_> = path.segments().collect();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].motion, MotionType::Jog);
        assert_eq!(segments[1].motion, MotionType::Move);
        assert_eq!(segments[1].start, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(path.segment(1), Some(segments[1]));
        assert_eq!(path.segment(2), None);
        assert_eq!(path.cutting_length(), 10.0);
    }
}
