//! An insertion-ordered queue of steps with an execution cursor.
//!
//! Drives incremental reveal: a scroll or click handler pulls one step per
//! trigger and executes it against the simulation, while `reset` rewinds
//! for a replay. The queue holds plain step data; it never executes
//! anything itself.

use crate::flow::FlowStep;
use serde::{Deserialize, Serialize};

/// A cursor over an ordered list of steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepQueue {
    steps: Vec<FlowStep>,
    cursor: usize,
}

impl StepQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-generated sequence.
    pub fn from_steps(steps: Vec<FlowStep>) -> Self {
        Self { steps, cursor: 0 }
    }

    /// Append a step, keeping insertion order.
    pub fn push(&mut self, step: FlowStep) {
        self.steps.push(step);
    }

    /// The next step, advancing the cursor past it.
    pub fn next_step(&mut self) -> Option<FlowStep> {
        let step = self.steps.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(step)
    }

    /// The next step without advancing.
    pub fn peek(&self) -> Option<&FlowStep> {
        self.steps.get(self.cursor)
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.steps.len()
    }

    /// Rewind the cursor to the start.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Total number of queued steps, executed or not.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the next step to execute.
    pub fn position(&self) -> usize {
        self.cursor
    }
}
