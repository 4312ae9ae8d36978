//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::destination::Destination;
use crate::fixed::Fixed64;
use crate::flow::{Connection, FlowSimulation, FlowSource, Input};
use crate::id::{ConnectionId, DestinationId, InputId, UniverseId};

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Universe constructors
// ===========================================================================

pub fn uni1() -> UniverseId {
    UniverseId::new("uni1")
}
pub fn uni2() -> UniverseId {
    UniverseId::new("uni2")
}

// ===========================================================================
// Graph builders
// ===========================================================================

/// Add an empty default-config destination to `simulation` in `uni1`.
pub fn stash(simulation: &mut FlowSimulation, name: &str, amount: u32) -> DestinationId {
    let destination = Destination::new(name, amount, uni1(), simulation.world_mut());
    simulation.add_destination(destination)
}

/// Connect with fraction 1.
pub fn connect(
    simulation: &mut FlowSimulation,
    from: FlowSource,
    to: DestinationId,
) -> ConnectionId {
    simulation.add_connection(Connection::new(from, to))
}

/// Connect with an explicit fraction.
pub fn connect_fraction(
    simulation: &mut FlowSimulation,
    from: FlowSource,
    to: DestinationId,
    fraction: f64,
) -> ConnectionId {
    simulation.add_connection(Connection::with_fraction(from, to, fixed(fraction)))
}

/// Build `Input(amount) -> d[0] -> d[1] -> ... -> d[len-1]`, every edge
/// fraction 1. Returns the destination ids in chain order.
pub fn chain(simulation: &mut FlowSimulation, amount: u32, len: usize) -> Vec<DestinationId> {
    let input = simulation.add_input(Input::new(amount));
    let mut destinations = Vec::with_capacity(len);
    for index in 0..len {
        destinations.push(stash(simulation, &format!("chain-{index}"), 0));
    }
    if let Some(&first) = destinations.first() {
        connect(simulation, FlowSource::Input(input), first);
    }
    for pair in destinations.windows(2) {
        connect(simulation, FlowSource::Destination(pair[0]), pair[1]);
    }
    destinations
}

/// Build `Input(amount) -> source -> {children}` with the given fractions.
/// Returns `(source, children)`.
pub fn fan_out(
    simulation: &mut FlowSimulation,
    amount: u32,
    fractions: &[f64],
) -> (DestinationId, Vec<DestinationId>) {
    let input = simulation.add_input(Input::new(amount));
    let source = stash(simulation, "fan-source", 0);
    connect(simulation, FlowSource::Input(input), source);
    let children = fractions
        .iter()
        .enumerate()
        .map(|(index, &fraction)| {
            let child = stash(simulation, &format!("fan-{index}"), 0);
            connect_fraction(simulation, FlowSource::Destination(source), child, fraction);
            child
        })
        .collect();
    (source, children)
}

/// Convenience accessor for a destination's amount.
pub fn amount_of(simulation: &FlowSimulation, id: DestinationId) -> u32 {
    simulation.destination(id).expect("destination exists").amount()
}

/// Convenience constructor for an input id by index.
pub fn input_id(index: u32) -> InputId {
    InputId(index)
}
