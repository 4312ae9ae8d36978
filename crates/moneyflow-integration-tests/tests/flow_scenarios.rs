//! End-to-end flow scenarios exercised through the public API only:
//! conservation, fan-out splits, rounding fixtures, deep chains, identity
//! across transfers, grid determinism, universe isolation, and failure
//! semantics.

use moneyflow_core::block::Position;
use moneyflow_core::destination::{Destination, DestinationConfig, FlowError};
use moneyflow_core::flow::{FlowSimulation, FlowSource, Input};
use moneyflow_core::id::UniverseId;
use moneyflow_core::queue::StepQueue;
use moneyflow_core::test_utils::*;
use std::cell::RefCell;
use std::rc::Rc;

// ===========================================================================
// Conservation & splits
// ===========================================================================

#[test]
fn single_connection_conserves_the_input_amount() {
    let mut simulation = FlowSimulation::new();
    let input = simulation.add_input(Input::new(25));
    let destination = stash(&mut simulation, "D", 0);
    connect(&mut simulation, FlowSource::Input(input), destination);

    let steps = simulation.loop_steps(1);
    simulation.run(&steps).unwrap();

    let held = simulation.destination(destination).unwrap();
    assert_eq!(held.amount(), 25);
    assert_eq!(held.blocks().len(), 25);
    assert_eq!(simulation.world().len(), 25);
}

#[test]
fn fan_out_splits_the_same_captured_amount() {
    let mut simulation = FlowSimulation::new();
    let (source, children) = fan_out(&mut simulation, 10, &[0.7, 0.3]);

    let steps = simulation.loop_steps(1);
    simulation.run(&steps).unwrap();

    assert_eq!(amount_of(&simulation, source), 0);
    assert_eq!(amount_of(&simulation, children[0]), 7);
    assert_eq!(amount_of(&simulation, children[1]), 3);
}

#[test]
fn uneven_splits_round_to_whole_blocks() {
    for (amount, expected) in [(10u32, (7u32, 3u32)), (9, (6, 3)), (8, (6, 2))] {
        let mut simulation = FlowSimulation::new();
        let (source, children) = fan_out(&mut simulation, amount, &[0.7, 0.3]);

        let steps = simulation.loop_steps(1);
        simulation.run(&steps).unwrap();

        assert_eq!(amount_of(&simulation, source), 0, "amount {amount}");
        assert_eq!(
            (
                amount_of(&simulation, children[0]),
                amount_of(&simulation, children[1])
            ),
            expected,
            "amount {amount}"
        );
    }
}

#[test]
fn repeated_loops_accumulate() {
    let mut simulation = FlowSimulation::new();
    let destinations = chain(&mut simulation, 10, 2);

    let steps = simulation.loop_steps(4);
    simulation.run(&steps).unwrap();

    assert_eq!(amount_of(&simulation, destinations[0]), 0);
    assert_eq!(amount_of(&simulation, destinations[1]), 40);
}

#[test]
fn deep_chains_multiply_fractions_downward() {
    // Input 100 -> D1 (1.0) -> {D2: 0.6, D3: 0.4}; D3 -> {D4: 0.25, D5: 0.75}.
    let mut simulation = FlowSimulation::new();
    let input = simulation.add_input(Input::new(100));
    let d1 = stash(&mut simulation, "D1", 0);
    let d2 = stash(&mut simulation, "D2", 0);
    let d3 = stash(&mut simulation, "D3", 0);
    let d4 = stash(&mut simulation, "D4", 0);
    let d5 = stash(&mut simulation, "D5", 0);
    connect(&mut simulation, FlowSource::Input(input), d1);
    connect_fraction(&mut simulation, FlowSource::Destination(d1), d2, 0.6);
    connect_fraction(&mut simulation, FlowSource::Destination(d1), d3, 0.4);
    connect_fraction(&mut simulation, FlowSource::Destination(d3), d4, 0.25);
    connect_fraction(&mut simulation, FlowSource::Destination(d3), d5, 0.75);

    let steps = simulation.loop_steps(1);
    simulation.run(&steps).unwrap();

    assert_eq!(amount_of(&simulation, d1), 0);
    assert_eq!(amount_of(&simulation, d2), 60);
    assert_eq!(amount_of(&simulation, d3), 0);
    assert_eq!(amount_of(&simulation, d4), 10);
    assert_eq!(amount_of(&simulation, d5), 30);
}

// ===========================================================================
// Identity, layout, universes
// ===========================================================================

#[test]
fn block_identity_survives_a_transfer() {
    let mut simulation = FlowSimulation::new();
    let source = stash(&mut simulation, "Source", 1);
    let target = stash(&mut simulation, "Target", 0);
    let original = simulation.destination(source).unwrap().blocks()[0];

    simulation.move_money(source, target, 1).unwrap();

    assert_eq!(simulation.destination(target).unwrap().blocks()[0], original);
    assert!(simulation.world().contains(original));
}

#[test]
fn grid_layout_is_deterministic() {
    let mut world = moneyflow_core::block::World::new();
    let config = DestinationConfig {
        block_size: fixed(10.0),
        blocks_per_row: 2,
        block_gutter: fixed(2.0),
        ..DestinationConfig::default()
    };
    let destination =
        Destination::with_config("Grid", 4, UniverseId::new("grid"), config, &mut world);

    let positions: Vec<Position> = destination
        .blocks()
        .iter()
        .map(|&id| world.block(id).unwrap().position)
        .collect();

    assert_eq!(
        positions,
        vec![
            Position::new(fixed(0.0), fixed(0.0)),
            Position::new(fixed(12.0), fixed(0.0)),
            Position::new(fixed(0.0), fixed(-12.0)),
            Position::new(fixed(12.0), fixed(-12.0)),
        ]
    );
}

#[test]
fn universes_never_share_block_pools() {
    let mut world = moneyflow_core::block::World::new();
    let first = Destination::new("First", 5, uni1(), &mut world);
    let mut second = Destination::new("Second", 5, uni2(), &mut world);

    second.add_money(&mut world, 10);

    assert_eq!(world.blocks_in(&uni1()).len(), 5);
    assert_eq!(world.blocks_in(&uni2()).len(), 15);
    for &id in first.blocks() {
        assert!(!world.blocks_in(&uni2()).contains(&id));
    }
}

#[test]
fn tail_removal_leaves_the_senders_grid_untouched() {
    let mut simulation = FlowSimulation::new();
    let source = stash(&mut simulation, "Source", 4);
    let target = stash(&mut simulation, "Target", 0);

    let before: Vec<Position> = simulation
        .destination(source)
        .unwrap()
        .blocks()
        .iter()
        .map(|&id| simulation.world().block(id).unwrap().position)
        .collect();

    simulation.move_money(source, target, 2).unwrap();

    let survivors = simulation.destination(source).unwrap().blocks().to_vec();
    assert_eq!(survivors.len(), 2);
    for (index, &id) in survivors.iter().enumerate() {
        assert_eq!(
            simulation.world().block(id).unwrap().position,
            before[index],
            "survivor {index} must keep its slot"
        );
    }
}

// ===========================================================================
// Failure semantics
// ===========================================================================

#[test]
fn insufficient_funds_leaves_both_sides_unmodified() {
    let mut simulation = FlowSimulation::new();
    let source = stash(&mut simulation, "Source", 3);
    let target = stash(&mut simulation, "Target", 1);

    let result = simulation.move_money(source, target, 5);

    assert!(matches!(
        result,
        Err(FlowError::InsufficientFunds {
            requested: 5,
            available: 3,
            ..
        })
    ));
    assert_eq!(amount_of(&simulation, source), 3);
    assert_eq!(amount_of(&simulation, target), 1);
    assert_eq!(simulation.world().len(), 4);
}

#[test]
fn a_failed_sequence_keeps_its_earlier_effects() {
    let mut simulation = FlowSimulation::new();
    let input = simulation.add_input(Input::new(10));
    let first = stash(&mut simulation, "First", 0);
    let second = stash(&mut simulation, "Second", 0);
    connect(&mut simulation, FlowSource::Input(input), first);
    // Demands 20 out of 10: the second step must fail.
    connect_fraction(&mut simulation, FlowSource::Destination(first), second, 2.0);

    let steps = simulation.loop_steps(1);
    let result = simulation.run(&steps);

    assert!(matches!(result, Err(FlowError::InsufficientFunds { .. })));
    assert_eq!(amount_of(&simulation, first), 10);
    assert_eq!(amount_of(&simulation, second), 0);
}

// ===========================================================================
// Consumption modes
// ===========================================================================

#[test]
fn a_step_queue_drives_the_sequence_incrementally() {
    let mut simulation = FlowSimulation::new();
    let destinations = chain(&mut simulation, 6, 2);

    let mut queue = StepQueue::from_steps(simulation.loop_steps(1));
    assert_eq!(queue.len(), 2);

    let step = queue.next_step().unwrap();
    simulation.execute(&step).unwrap();
    assert_eq!(amount_of(&simulation, destinations[0]), 6);
    assert_eq!(amount_of(&simulation, destinations[1]), 0);

    let step = queue.next_step().unwrap();
    simulation.execute(&step).unwrap();
    assert_eq!(amount_of(&simulation, destinations[0]), 0);
    assert_eq!(amount_of(&simulation, destinations[1]), 6);
    assert!(!queue.has_next());
}

#[test]
fn a_timeline_drives_the_sequence_on_the_clock() {
    let mut simulation = FlowSimulation::new();
    simulation.set_flow_duration(500);
    let destinations = chain(&mut simulation, 6, 2);

    let mut timeline = simulation.generate_timeline(1);
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.total_duration(), fixed(0.5));

    // t = 0: only the input transfer is due.
    for step in timeline.advance(fixed(0.0)) {
        simulation.execute(&step).unwrap();
    }
    assert_eq!(amount_of(&simulation, destinations[0]), 6);
    assert_eq!(amount_of(&simulation, destinations[1]), 0);

    // Half a second later the forward transfer fires.
    for step in timeline.advance(fixed(0.5)) {
        simulation.execute(&step).unwrap();
    }
    assert_eq!(amount_of(&simulation, destinations[0]), 0);
    assert_eq!(amount_of(&simulation, destinations[1]), 6);
    assert!(timeline.finished());
}

#[test]
fn redraws_fire_per_transfer_and_amounts_stay_live() {
    let mut simulation = FlowSimulation::new();
    let destinations = chain(&mut simulation, 5, 2);

    let redraws = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&redraws);
    simulation.add_redraw_function(Box::new(move || *counter.borrow_mut() += 1));

    // Steps generated before extra funding still move the live amount.
    let steps = simulation.loop_steps(1);
    simulation.add_money(destinations[0], 3).unwrap();
    simulation.run(&steps).unwrap();

    assert_eq!(*redraws.borrow(), 2);
    assert_eq!(amount_of(&simulation, destinations[0]), 0);
    // 5 from the input plus the 3 that were already sitting there.
    assert_eq!(amount_of(&simulation, destinations[1]), 8);
}

// ===========================================================================
// Serialization
// ===========================================================================

#[test]
fn world_and_destinations_round_trip_through_bitcode() {
    let mut simulation = FlowSimulation::new();
    let source = stash(&mut simulation, "Source", 4);
    let target = stash(&mut simulation, "Target", 0);
    simulation.move_money(source, target, 1).unwrap();

    let world_bytes = bitcode::serialize(simulation.world()).expect("serialize world");
    let restored: moneyflow_core::block::World =
        bitcode::deserialize(&world_bytes).expect("deserialize world");
    assert_eq!(restored.len(), 4);
    assert_eq!(restored.blocks_in(&uni1()).len(), 4);

    let destination = simulation.destination(target).unwrap();
    let bytes = bitcode::serialize(destination).expect("serialize destination");
    let revived: Destination = bitcode::deserialize(&bytes).expect("deserialize destination");
    assert_eq!(revived.amount(), 1);
    assert_eq!(revived.blocks(), destination.blocks());
    for &id in revived.blocks() {
        assert!(restored.contains(id));
    }
}
