// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Motion module - tick scheduling and control commands

mod command;
mod scheduler;

pub use command::{Command, CommandQueue};
pub use scheduler::{MotionScheduler, SchedulerState, SegmentCompleted, Tick};
