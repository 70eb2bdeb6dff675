// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tick-driven tool motion along a path
//!
//! The scheduler keeps a cursor `(segment_index, fraction)` into the path.
//! Each tick while playing advances the fraction by `feed_rate * dt / d`,
//! where `d` is the segment length, and reports the interpolated tool
//! position. Reaching the end of a segment resets the fraction, reports a
//! completion for cutting segments and moves to the next segment, or back
//! to idle after the last one.

use crate::error::SimError;
use crate::toolpath::Path;
use nalgebra::Point3;

/// Fractions this close to 1 count as a finished segment
const COMPLETION_EPSILON: f64 = 1e-12;

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not animating, cursor at the start of the path
    Idle,
    Playing,
    /// Stopped part-way; `start` resumes from the cursor
    Paused,
}

/// A cutting segment the tool has just finished
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCompleted {
    pub index: usize,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Interpolated tool position
    pub position: Point3<f64>,
    /// Segment the tick advanced
    pub segment_index: usize,
    /// Fraction reached on that segment, before any reset
    pub fraction: f64,
    pub completed: Option<SegmentCompleted>,
    /// The last segment finished and the scheduler went idle
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotionScheduler {
    segment_index: usize,
    fraction: f64,
    running: bool,
    feed_rate: f64,
}

impl MotionScheduler {
    pub fn new(feed_rate: f64) -> Result<Self, SimError> {
        validate_feed_rate(feed_rate)?;
        Ok(Self {
            segment_index: 0,
            fraction: 0.0,
            running: false,
            feed_rate,
        })
    }

    /// Back to `{0, 0, false}`; required whenever the path is replaced
    pub fn reset(&mut self) {
        self.segment_index = 0;
        self.fraction = 0.0;
        self.running = false;
    }

    /// Begin or resume playing. Returns false for a path with no segments.
    pub fn start(&mut self, path: &Path) -> bool {
        if path.segment_count() == 0 {
            tracing::debug!("start ignored: path has no segments");
            return false;
        }
        if self.segment_index >= path.segment_count() {
            self.reset();
        }
        self.running = true;
        true
    }

    /// Stop issuing motion; the cursor is kept
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Takes effect on the next tick
    pub fn set_feed_rate(&mut self, feed_rate: f64) -> Result<(), SimError> {
        validate_feed_rate(feed_rate)?;
        self.feed_rate = feed_rate;
        Ok(())
    }

    pub fn feed_rate(&self) -> f64 {
        self.feed_rate
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> SchedulerState {
        if self.running {
            SchedulerState::Playing
        } else if self.segment_index == 0 && self.fraction == 0.0 {
            SchedulerState::Idle
        } else {
            SchedulerState::Paused
        }
    }

    /// Tool position at the cursor
    pub fn position(&self, path: &Path) -> Point3<f64> {
        match path.segment(self.segment_index) {
            Some(segment) => segment.start.lerp(&segment.end, self.fraction),
            None => path
                .get(self.segment_index)
                .map_or_else(Point3::origin, |w| w.position),
        }
    }

    /// Advance by `dt` seconds. Returns `None` when not playing.
    pub fn tick(&mut self, path: &Path, dt: f64) -> Option<Tick> {
        if !self.running {
            return None;
        }

        let Some(segment) = path.segment(self.segment_index) else {
            tracing::warn!(
                segment = self.segment_index,
                waypoints = path.len(),
                "cursor outside path, resetting"
            );
            self.reset();
            return None;
        };

        let distance = segment.length();
        self.fraction = if distance > 0.0 {
            let step = self.feed_rate * dt / distance;
            let fraction = (self.fraction + step).clamp(0.0, 1.0);
            if fraction >= 1.0 - COMPLETION_EPSILON {
                1.0
            } else {
                fraction
            }
        } else {
            // Zero-length segment completes immediately
            1.0
        };

        let index = self.segment_index;
        let fraction = self.fraction;
        let position = segment.start.lerp(&segment.end, fraction);
        let mut completed = None;
        let mut finished = false;

        if fraction >= 1.0 {
            self.fraction = 0.0;
            if segment.is_cutting() {
                completed = Some(SegmentCompleted {
                    index,
                    start: segment.start,
                    end: segment.end,
                });
            }
            if index + 2 < path.len() {
                self.segment_index += 1;
            } else {
                self.segment_index = 0;
                self.running = false;
                finished = true;
            }
        }

        Some(Tick {
            position,
            segment_index: index,
            fraction,
            completed,
            finished,
        })
    }
}

fn validate_feed_rate(feed_rate: f64) -> Result<(), SimError> {
    if feed_rate > 0.0 && feed_rate.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidFeedRate(feed_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolpath::Waypoint;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    fn line_path() -> Path {
        Path::from_waypoints([Waypoint::cut(60.0, 0.0, 0.0)])
    }

    #[test]
    fn test_sixty_ticks_finish_segment() {
        let path = line_path();
        let mut scheduler = MotionScheduler::new(60.0).unwrap();
        assert!(scheduler.start(&path));

        for i in 1..60 {
            let tick = scheduler.tick(&path, DT).unwrap();
            assert!(tick.completed.is_none(), "completed early at tick {i}");
            assert_relative_eq!(tick.fraction, i as f64 / 60.0, epsilon = 1e-9);
        }

        let tick = scheduler.tick(&path, DT).unwrap();
        assert_eq!(tick.fraction, 1.0);
        assert_eq!(tick.position, Point3::new(60.0, 0.0, 0.0));
        assert!(tick.finished);
        assert_eq!(
            tick.completed,
            Some(SegmentCompleted {
                index: 0,
                start: Point3::origin(),
                end: Point3::new(60.0, 0.0, 0.0),
            })
        );
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.tick(&path, DT).is_none());
    }

    #[test]
    fn test_degenerate_segment_completes_in_one_tick() {
        let path = Path::from_waypoints([Waypoint::cut(0.0, 0.0, 0.0)]);
        let mut scheduler = MotionScheduler::new(1.0).unwrap();
        scheduler.start(&path);

        let tick = scheduler.tick(&path, DT).unwrap();
        assert_eq!(tick.fraction, 1.0);
        assert!(tick.position.coords.iter().all(|c| c.is_finite()));
        assert!(tick.completed.is_some());
        assert!(tick.finished);
    }

    #[test]
    fn test_jog_does_not_report_completion() {
        let path = Path::from_waypoints([Waypoint::jog(1.0, 0.0, 0.0), Waypoint::cut(2.0, 0.0, 0.0)]);
        let mut scheduler = MotionScheduler::new(600.0).unwrap();
        scheduler.start(&path);

        let first = scheduler.tick(&path, DT).unwrap();
        assert_eq!(first.segment_index, 0);
        assert!(first.completed.is_none());
        assert!(!first.finished);
        assert_eq!(scheduler.segment_index(), 1);

        let second = scheduler.tick(&path, DT).unwrap();
        assert_eq!(second.completed.map(|c| c.index), Some(1));
        assert!(second.finished);
    }

    #[test]
    fn test_start_on_empty_path_is_noop() {
        let path = Path::new();
        let mut scheduler = MotionScheduler::new(10.0).unwrap();
        assert!(!scheduler.start(&path));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.tick(&path, DT).is_none());
    }

    #[test]
    fn test_stop_pauses_and_start_resumes() {
        let path = line_path();
        let mut scheduler = MotionScheduler::new(60.0).unwrap();
        scheduler.start(&path);
        scheduler.tick(&path, DT);
        scheduler.stop();

        assert_eq!(scheduler.state(), SchedulerState::Paused);
        assert!(scheduler.tick(&path, DT).is_none());
        assert_relative_eq!(scheduler.position(&path).x, 1.0, epsilon = 1e-9);

        scheduler.start(&path);
        let tick = scheduler.tick(&path, DT).unwrap();
        assert_relative_eq!(tick.position.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_feed_rate_change_applies_next_tick() {
        let path = line_path();
        let mut scheduler = MotionScheduler::new(60.0).unwrap();
        scheduler.start(&path);
        scheduler.tick(&path, DT);
        scheduler.set_feed_rate(120.0).unwrap();

        let tick = scheduler.tick(&path, DT).unwrap();
        assert_relative_eq!(tick.position.x, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_feed_rate_rejected() {
        assert!(MotionScheduler::new(0.0).is_err());
        let mut scheduler = MotionScheduler::new(1.0).unwrap();
        assert_eq!(
            scheduler.set_feed_rate(-5.0),
            Err(SimError::InvalidFeedRate(-5.0))
        );
        assert!(scheduler.set_feed_rate(f64::NAN).is_err());
        assert_eq!(scheduler.feed_rate(), 1.0);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let path = line_path();
        let mut scheduler = MotionScheduler::new(60.0).unwrap();
        scheduler.start(&path);
        scheduler.tick(&path, DT);
        scheduler.reset();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.fraction(), 0.0);
        assert!(!scheduler.is_running());
    }
}
