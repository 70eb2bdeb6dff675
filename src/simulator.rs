// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Simulation context: path, scheduler, stock and gantry driven by `tick()`
//!
//! A host calls [`Simulator::tick`] once per frame (or [`Simulator::advance`]
//! with the measured frame time). Each tick drains queued commands, advances
//! the scheduler and, when a cutting segment completes, subtracts its sweep
//! from the stock before returning. Readers therefore always observe a tool
//! position and stock mesh from the same tick.

use crate::config::{SimulatorConfig, TickTiming};
use crate::error::SimError;
use crate::geometry::SweepVolumeBuilder;
use crate::io::parse_toolpath;
use crate::machine::Gantry;
use crate::motion::{Command, CommandQueue, MotionScheduler, SchedulerState, SegmentCompleted};
use crate::stock::StockModel;
use crate::toolpath::Path;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tool_position: Point3<f64>,
    pub state: SchedulerState,
    /// Segment advanced by this tick, if the scheduler was playing
    pub segment_index: Option<usize>,
    /// Fraction reached on that segment; 1 when it finished this tick
    pub fraction: f64,
    pub completed: Option<SegmentCompleted>,
    /// A completed cutting segment changed the stock
    pub removed: bool,
    /// The path ran out on this tick
    pub finished: bool,
}

/// Totals for a headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    /// Segments the tool finished
    pub segments: usize,
    pub cutting_segments: usize,
    /// Cutting segments whose sweep reached the stock
    pub removals: usize,
    pub removed_volume: f64,
    pub polygon_count: usize,
    /// False when `max_ticks` ran out first
    pub finished: bool,
}

pub struct Simulator {
    config: SimulatorConfig,
    path: Path,
    scheduler: MotionScheduler,
    sweeps: SweepVolumeBuilder,
    stock: StockModel,
    gantry: Gantry,
    commands: CommandQueue,
    tool_position: Point3<f64>,
    ticks: u64,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut gantry = Gantry::new(&config);
        gantry.follow(&Point3::origin());

        Ok(Self {
            scheduler: MotionScheduler::new(config.feed_rate)?,
            sweeps: SweepVolumeBuilder::new(config.tool_radius(), config.plunge_height),
            stock: StockModel::new(&config),
            path: Path::new(),
            commands: CommandQueue::new(),
            tool_position: Point3::origin(),
            ticks: 0,
            gantry,
            config,
        })
    }

    /// Parse toolpath text and queue it for loading on the next tick
    pub fn load_toolpath(&mut self, source: &str) -> Result<(), SimError> {
        let path = parse_toolpath(source)?;
        tracing::info!(
            waypoints = path.len(),
            cutting_length = path.cutting_length(),
            "toolpath parsed"
        );
        self.submit(Command::LoadPath(path))
    }

    /// Queue a command; invalid feed rates are rejected here
    pub fn submit(&mut self, command: Command) -> Result<(), SimError> {
        if let Command::SetFeedRate(rate) = command {
            if !(rate > 0.0) || !rate.is_finite() {
                return Err(SimError::InvalidFeedRate(rate));
            }
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn start(&mut self) {
        self.commands.push(Command::Start);
    }

    pub fn stop(&mut self) {
        self.commands.push(Command::Stop);
    }

    pub fn set_feed_rate(&mut self, feed_rate: f64) -> Result<(), SimError> {
        self.submit(Command::SetFeedRate(feed_rate))
    }

    /// One fixed step of `1 / tick_rate` seconds
    pub fn tick(&mut self) -> TickReport {
        let dt = 1.0 / self.config.tick_rate;
        self.step(dt)
    }

    /// One step sized by the configured timing mode
    pub fn advance(&mut self, elapsed: Duration) -> TickReport {
        let dt = match self.config.timing {
            TickTiming::Fixed => 1.0 / self.config.tick_rate,
            TickTiming::Elapsed => elapsed.as_secs_f64(),
        };
        self.step(dt)
    }

    fn step(&mut self, dt: f64) -> TickReport {
        self.drain_commands();
        self.ticks += 1;

        let Some(tick) = self.scheduler.tick(&self.path, dt) else {
            return TickReport {
                tool_position: self.tool_position,
                state: self.scheduler.state(),
                segment_index: None,
                fraction: self.scheduler.fraction(),
                completed: None,
                removed: false,
                finished: false,
            };
        };

        let removed = match &tick.completed {
            Some(segment) => {
                let sweep = self.sweeps.build(&segment.start, &segment.end);
                self.stock.apply_removal(&sweep)
            }
            None => false,
        };

        self.tool_position = tick.position;
        self.gantry.follow(&tick.position);

        if tick.finished {
            tracing::info!(ticks = self.ticks, "toolpath finished");
        }

        TickReport {
            tool_position: tick.position,
            state: self.scheduler.state(),
            segment_index: Some(tick.segment_index),
            fraction: tick.fraction,
            completed: tick.completed,
            removed,
            finished: tick.finished,
        }
    }

    fn drain_commands(&mut self) {
        let commands: Vec<Command> = self.commands.drain().collect();
        for command in commands {
            match command {
                Command::LoadPath(path) => {
                    tracing::debug!(waypoints = path.len(), "loading path");
                    self.scheduler.reset();
                    self.path = path;
                    self.tool_position = self.scheduler.position(&self.path);
                    self.gantry.follow(&self.tool_position);
                }
                Command::Start => {
                    if self.scheduler.start(&self.path) {
                        tracing::debug!(segment = self.scheduler.segment_index(), "playing");
                    }
                }
                Command::Stop => {
                    self.scheduler.stop();
                    tracing::debug!(state = ?self.scheduler.state(), "stopped");
                }
                Command::SetFeedRate(rate) => {
                    if let Err(err) = self.scheduler.set_feed_rate(rate) {
                        tracing::warn!(%err, "feed rate ignored");
                    }
                }
            }
        }
    }

    /// Start and tick until the path is done or `max_ticks` have run
    pub fn run_to_completion(&mut self, max_ticks: u64) -> RunSummary {
        self.run_with(max_ticks, |_| {})
    }

    /// [`run_to_completion`](Self::run_to_completion) with a per-tick observer
    pub fn run_with(&mut self, max_ticks: u64, mut on_tick: impl FnMut(&TickReport)) -> RunSummary {
        self.start();

        let mut summary = RunSummary {
            ticks: 0,
            segments: 0,
            cutting_segments: 0,
            removals: 0,
            removed_volume: 0.0,
            polygon_count: 0,
            finished: false,
        };

        while summary.ticks < max_ticks {
            let report = self.tick();
            summary.ticks += 1;
            on_tick(&report);

            if report.segment_index.is_none() {
                // Nothing to play
                summary.finished = true;
                break;
            }
            if report.fraction >= 1.0 {
                summary.segments += 1;
            }
            if report.completed.is_some() {
                summary.cutting_segments += 1;
            }
            if report.removed {
                summary.removals += 1;
            }
            if report.finished {
                summary.finished = true;
                break;
            }
        }

        if !summary.finished {
            tracing::warn!(max_ticks, "run stopped before the path finished");
        }

        summary.removed_volume = self.stock.removed_volume();
        summary.polygon_count = self.stock.polygon_count();
        summary
    }

    pub fn tool_position(&self) -> Point3<f64> {
        self.tool_position
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stock(&self) -> &StockModel {
        &self.stock
    }

    pub fn scheduler(&self) -> &MotionScheduler {
        &self.scheduler
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn gantry(&self) -> &Gantry {
        &self.gantry
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Ticks run since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }
}
