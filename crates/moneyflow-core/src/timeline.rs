//! Relative-time scheduling of generated steps.
//!
//! The real animation library lives outside the core and plugs in through
//! [`TimelineBuilder`]. [`StepTimeline`] is the crate's own schedulable
//! implementation: enough to drive sequences headlessly and in tests.
//! Cancellation belongs to the consumer -- dropping a timeline abandons the
//! steps it had not yet yielded.

use crate::fixed::Fixed64;
use crate::flow::FlowStep;
use serde::{Deserialize, Serialize};

/// Capability to schedule a step at an absolute offset, in seconds.
pub trait TimelineBuilder {
    fn add(&mut self, step: FlowStep, at: Fixed64);
}

/// A step scheduled at an absolute time offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub at: Fixed64,
    pub step: FlowStep,
}

/// An ordered, clock-driven sequence of scheduled steps.
///
/// Entries are appended in nondecreasing time order (which is what
/// [`FlowSimulation::build_timeline`](crate::flow::FlowSimulation::build_timeline)
/// produces); [`advance`](StepTimeline::advance) yields each step once, when
/// the clock passes its offset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepTimeline {
    entries: Vec<TimelineEntry>,
    clock: Fixed64,
    cursor: usize,
}

impl StepTimeline {
    /// Create an empty timeline at clock zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// All scheduled entries, in schedule order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset of the last scheduled step, or zero when empty.
    pub fn total_duration(&self) -> Fixed64 {
        self.entries
            .last()
            .map(|entry| entry.at)
            .unwrap_or(Fixed64::ZERO)
    }

    /// The current clock value, in seconds.
    pub fn clock(&self) -> Fixed64 {
        self.clock
    }

    /// Returns true once every step has been yielded.
    pub fn finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Advance the clock by `dt` seconds and return the steps that became
    /// due, in schedule order.
    pub fn advance(&mut self, dt: Fixed64) -> Vec<FlowStep> {
        self.clock += dt;
        let mut due = Vec::new();
        while self.cursor < self.entries.len() && self.entries[self.cursor].at <= self.clock {
            due.push(self.entries[self.cursor].step);
            self.cursor += 1;
        }
        due
    }

    /// Rewind the clock and cursor to the start.
    pub fn reset(&mut self) {
        self.clock = Fixed64::ZERO;
        self.cursor = 0;
    }
}

impl TimelineBuilder for StepTimeline {
    fn add(&mut self, step: FlowStep, at: Fixed64) {
        self.entries.push(TimelineEntry { at, step });
    }
}
