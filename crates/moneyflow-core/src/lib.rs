//! Moneyflow Core -- the simulation engine behind animated money-flow
//! visuals.
//!
//! This crate models quantized money: indivisible blocks distributed across
//! named destinations, moved along a directed graph of fractional
//! connections, producing ordered step sequences that an animation timeline
//! consumes.
//!
//! # Build, then execute
//!
//! A caller assembles a graph ([`flow::Input`]s,
//! [`destination::Destination`]s, [`flow::Connection`]s), then asks
//! [`flow::FlowSimulation`] for N loop iterations' worth of steps. Step
//! generation is a pure computation; executing a step mutates destination
//! and block state and fires the registered redraw callbacks. Source
//! amounts are read at execution time, so paused or interleaved sequences
//! always apply live values.
//!
//! # Key Types
//!
//! - [`flow::FlowSimulation`] -- graph owner, step generator, and executor.
//! - [`destination::Destination`] -- a named accumulator of blocks on a
//!   deterministic grid.
//! - [`block::World`] -- the per-universe block registry; independent
//!   simulations never share block pools.
//! - [`flow::FlowStep`] -- one executable step, tagged with delay metadata.
//! - [`timeline::StepTimeline`] -- relative-time scheduling of a sequence.
//! - [`queue::StepQueue`] -- cursor-driven incremental execution.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point for deterministic math.

pub mod block;
pub mod destination;
pub mod fixed;
pub mod flow;
pub mod id;
pub mod queue;
pub mod timeline;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
