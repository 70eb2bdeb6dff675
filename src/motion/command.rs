// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Control commands and the queue that carries them into the tick loop

use crate::toolpath::Path;
use std::collections::VecDeque;

/// A control request from the driving surface
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the path and reset the scheduler
    LoadPath(Path),
    Start,
    Stop,
    SetFeedRate(f64),
}

/// FIFO of pending commands, drained at the start of each tick
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending command in submission order
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.pending.drain(..)
    }
}
