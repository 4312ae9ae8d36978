//! The flow simulation: inputs, fractional connections, and ordered step
//! generation.
//!
//! A caller builds a directed graph of [`Input`]s and
//! [`Destination`](crate::destination::Destination)s joined by
//! [`Connection`]s, then asks for `iterations` traversals' worth of steps.
//! Steps are plain data ([`FlowStep`]) executed against the simulation with
//! [`FlowSimulation::execute`]; source amounts are read at execution time,
//! not at build time, so a sequence that is paused, resumed, or interleaved
//! with external mutation always applies live values.
//!
//! # Fan-out capture
//!
//! Within one source's fan-out, the first sibling's step captures the
//! source's live amount and every later sibling reuses that captured value:
//! siblings split the *same* amount rather than sequentially depleted ones.
//! Generation keeps a fan-out's sibling steps contiguous, which is what
//! makes the single capture register sound.
//!
//! # Consumption modes
//!
//! - [`FlowSimulation::loop_steps`] returns the flat ordered step list for
//!   synchronous or cursor-driven execution (see
//!   [`StepQueue`](crate::queue::StepQueue)).
//! - [`FlowSimulation::generate_timeline`] schedules the same list onto a
//!   [`StepTimeline`](crate::timeline::StepTimeline), each step offset by
//!   the previous step's delay.

use crate::block::World;
use crate::destination::{Destination, FlowError};
use crate::fixed::{Fixed64, Millis, block_count, ms_to_seconds};
use crate::id::{ConnectionId, DestinationId, InputId};
use crate::timeline::{StepTimeline, TimelineBuilder};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Delay tagged onto spliced insert steps, in milliseconds.
pub const INSERT_DELAY_MS: Millis = 100;

/// Flow duration used for generated steps until
/// [`FlowSimulation::set_flow_duration`] overrides it.
pub const DEFAULT_FLOW_DURATION_MS: Millis = 1_000;

// ---------------------------------------------------------------------------
// Graph elements
// ---------------------------------------------------------------------------

/// A fixed-amount money source with no block backing; the root of a flow
/// graph. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    amount: u32,
}

impl Input {
    pub fn new(amount: u32) -> Self {
        Self { amount }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }
}

/// Either end a connection can flow from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowSource {
    Input(InputId),
    Destination(DestinationId),
}

/// A directed edge carrying a fraction of its source's flow to a
/// destination. Stateless after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: FlowSource,
    pub to: DestinationId,
    /// Fraction of the captured source amount sent along this edge,
    /// expected in (0, 1]. Not validated; out-of-range values are the
    /// caller's responsibility.
    pub fraction: Fixed64,
}

impl Connection {
    /// An unconditional connection (fraction 1).
    pub fn new(from: FlowSource, to: DestinationId) -> Self {
        Self {
            from,
            to,
            fraction: Fixed64::ONE,
        }
    }

    pub fn with_fraction(from: FlowSource, to: DestinationId, fraction: Fixed64) -> Self {
        Self { from, to, fraction }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// What an executed step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    /// Read the source's live amount, stash it as the captured amount for
    /// the current fan-out, then apply the connection with it.
    CaptureAndApply(ConnectionId),
    /// Apply the connection with the currently captured amount.
    ApplyCaptured(ConnectionId),
    /// Run the insert callback registered at this index.
    Insert(usize),
}

/// One executable step of a generated flow sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    pub action: StepAction,
    /// Delay metadata consumed by timeline scheduling.
    pub delay_ms: Millis,
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Invoked once after every executed transfer step.
pub type RedrawFn = Box<dyn FnMut()>;

/// A callback spliced into the step sequence at a loop boundary.
pub type InsertFn = Box<dyn FnMut()>;

/// A function insert: spliced into the step list at the start of loop
/// iteration `at_loop`, optionally retiming every step generated after it.
pub struct FlowInsert {
    pub callback: InsertFn,
    pub at_loop: u32,
    pub new_flow_duration: Option<Millis>,
}

impl std::fmt::Debug for FlowInsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowInsert")
            .field("callback", &"<fn>")
            .field("at_loop", &self.at_loop)
            .field("new_flow_duration", &self.new_flow_duration)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FlowSimulation
// ---------------------------------------------------------------------------

/// Orchestrates a directed graph of inputs, destinations, and connections,
/// and turns it into ordered, executable step sequences.
///
/// Owns the [`World`] its destinations create blocks in.
pub struct FlowSimulation {
    world: World,
    destinations: SlotMap<DestinationId, Destination>,
    inputs: Vec<Input>,
    connections: Vec<Connection>,
    redraw_fns: Vec<RedrawFn>,
    /// Kept sorted by `at_loop`; stable for equal keys.
    inserts: Vec<FlowInsert>,
    flow_duration_ms: Millis,
    /// Amount captured by the most recent `CaptureAndApply` step.
    captured_amount: u32,
}

impl std::fmt::Debug for FlowSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowSimulation")
            .field("world", &self.world)
            .field("destinations", &self.destinations)
            .field("inputs", &self.inputs)
            .field("connections", &self.connections)
            .field("inserts", &self.inserts)
            .field("flow_duration_ms", &self.flow_duration_ms)
            .finish_non_exhaustive()
    }
}

impl Default for FlowSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowSimulation {
    /// Create an empty simulation with its own fresh world.
    pub fn new() -> Self {
        Self::with_world(World::new())
    }

    /// Create a simulation around an existing world.
    pub fn with_world(world: World) -> Self {
        Self {
            world,
            destinations: SlotMap::with_key(),
            inputs: Vec::new(),
            connections: Vec::new(),
            redraw_fns: Vec::new(),
            inserts: Vec::new(),
            flow_duration_ms: DEFAULT_FLOW_DURATION_MS,
            captured_amount: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Graph construction & accessors
    // -----------------------------------------------------------------------

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Register an input. Inputs are traversed in registration order.
    pub fn add_input(&mut self, input: Input) -> InputId {
        let id = InputId(self.inputs.len() as u32);
        self.inputs.push(input);
        id
    }

    pub fn input(&self, id: InputId) -> Option<&Input> {
        self.inputs.get(id.0 as usize)
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Take ownership of a destination. Returns its id for connections.
    pub fn add_destination(&mut self, destination: Destination) -> DestinationId {
        self.destinations.insert(destination)
    }

    pub fn destination(&self, id: DestinationId) -> Option<&Destination> {
        self.destinations.get(id)
    }

    pub fn destination_mut(&mut self, id: DestinationId) -> Option<&mut Destination> {
        self.destinations.get_mut(id)
    }

    pub fn destinations(&self) -> impl Iterator<Item = (DestinationId, &Destination)> {
        self.destinations.iter()
    }

    /// Register a connection. A source's outgoing connections are traversed
    /// in registration order.
    pub fn add_connection(&mut self, connection: Connection) -> ConnectionId {
        let id = ConnectionId(self.connections.len() as u32);
        self.connections.push(connection);
        id
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0 as usize)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    // -----------------------------------------------------------------------
    // Owned-destination mutations
    // -----------------------------------------------------------------------

    /// Add freshly created money to an owned destination.
    pub fn add_money(&mut self, id: DestinationId, amount: u32) -> Result<(), FlowError> {
        let destination = self
            .destinations
            .get_mut(id)
            .ok_or(FlowError::UnknownDestination(id))?;
        destination.add_money(&mut self.world, amount);
        Ok(())
    }

    /// Move money between two owned destinations. Moving a destination onto
    /// itself is a no-op.
    pub fn move_money(
        &mut self,
        from: DestinationId,
        to: DestinationId,
        amount: u32,
    ) -> Result<(), FlowError> {
        if from == to {
            return Ok(());
        }
        if !self.destinations.contains_key(from) {
            return Err(FlowError::UnknownDestination(from));
        }
        let Some([source, target]) = self.destinations.get_disjoint_mut([from, to]) else {
            return Err(FlowError::UnknownDestination(to));
        };
        source.move_to(target, &mut self.world, amount)
    }

    /// Destroy the last `amount` blocks of an owned destination.
    pub fn destroy_blocks(&mut self, id: DestinationId, amount: u32) -> Result<(), FlowError> {
        let destination = self
            .destinations
            .get_mut(id)
            .ok_or(FlowError::UnknownDestination(id))?;
        destination.destroy_blocks(&mut self.world, amount)
    }

    /// Destroy every block of an owned destination.
    pub fn destroy_all_blocks(&mut self, id: DestinationId) -> Result<(), FlowError> {
        let destination = self
            .destinations
            .get_mut(id)
            .ok_or(FlowError::UnknownDestination(id))?;
        destination.destroy_all_blocks(&mut self.world);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Callbacks & timing
    // -----------------------------------------------------------------------

    /// Register a callback invoked once after every executed transfer step.
    pub fn add_redraw_function(&mut self, redraw: RedrawFn) {
        self.redraw_fns.push(redraw);
    }

    /// Set the delay tagged onto subsequently generated steps.
    pub fn set_flow_duration(&mut self, ms: Millis) {
        self.flow_duration_ms = ms;
    }

    pub fn flow_duration(&self) -> Millis {
        self.flow_duration_ms
    }

    /// Register a function insert. Inserts are kept sorted by `at_loop`.
    ///
    /// Insert steps reference the sorted position at generation time, so
    /// step lists generated before a later `add_insert` call must be
    /// regenerated.
    pub fn add_insert(&mut self, insert: FlowInsert) {
        let at = self
            .inserts
            .partition_point(|existing| existing.at_loop <= insert.at_loop);
        self.inserts.insert(at, insert);
    }

    // -----------------------------------------------------------------------
    // Step generation
    // -----------------------------------------------------------------------

    /// Generate the ordered step list for `iterations` full traversals of
    /// the flow graph.
    ///
    /// Each iteration first splices in the inserts registered for it, then
    /// traverses from every input in registration order. Traversal from a
    /// source emits one step per outgoing connection in registration order
    /// (the fan-out), then descends into each connection's target in the
    /// same order. Sources with no outgoing connections generate nothing.
    ///
    /// The returned steps are pure data; nothing is mutated until they are
    /// executed. Graphs with connection cycles are the caller's
    /// responsibility -- generation will not terminate on them.
    pub fn loop_steps(&self, iterations: u32) -> Vec<FlowStep> {
        let mut steps = Vec::new();
        let mut duration = self.flow_duration_ms;

        for i in 0..iterations {
            for (index, insert) in self.inserts.iter().enumerate() {
                if insert.at_loop == i {
                    steps.push(FlowStep {
                        action: StepAction::Insert(index),
                        delay_ms: INSERT_DELAY_MS,
                    });
                    if let Some(ms) = insert.new_flow_duration {
                        duration = ms;
                    }
                }
            }
            for input in 0..self.inputs.len() {
                self.traverse(FlowSource::Input(InputId(input as u32)), duration, &mut steps);
            }
        }

        steps
    }

    fn traverse(&self, source: FlowSource, duration: Millis, steps: &mut Vec<FlowStep>) {
        let outgoing: Vec<ConnectionId> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, connection)| connection.from == source)
            .map(|(index, _)| ConnectionId(index as u32))
            .collect();

        for (sibling, &connection) in outgoing.iter().enumerate() {
            let action = if sibling == 0 {
                StepAction::CaptureAndApply(connection)
            } else {
                StepAction::ApplyCaptured(connection)
            };
            steps.push(FlowStep {
                action,
                delay_ms: duration,
            });
        }

        for &connection in &outgoing {
            let target = self.connections[connection.0 as usize].to;
            self.traverse(FlowSource::Destination(target), duration, steps);
        }
    }

    // -----------------------------------------------------------------------
    // Step execution
    // -----------------------------------------------------------------------

    /// Execute one step against the live simulation state.
    ///
    /// Transfer steps read the source amount now (not when the step was
    /// generated), apply the connection, and fire the redraw callbacks.
    /// An [`FlowError::InsufficientFunds`] from the underlying transfer
    /// propagates unchanged; nothing is rolled back.
    pub fn execute(&mut self, step: &FlowStep) -> Result<(), FlowError> {
        match step.action {
            StepAction::CaptureAndApply(id) => {
                let connection = self.lookup_connection(id)?;
                let amount = self.source_amount(connection.from)?;
                self.captured_amount = amount;
                self.apply(connection, amount)?;
                self.redraw();
            }
            StepAction::ApplyCaptured(id) => {
                let connection = self.lookup_connection(id)?;
                let amount = self.captured_amount;
                self.apply(connection, amount)?;
                self.redraw();
            }
            StepAction::Insert(index) => {
                if let Some(insert) = self.inserts.get_mut(index) {
                    (insert.callback)();
                }
            }
        }
        Ok(())
    }

    /// Execute a whole sequence in order, stopping at the first error.
    /// Already-executed steps stay applied; there is no rollback.
    pub fn run(&mut self, steps: &[FlowStep]) -> Result<(), FlowError> {
        for step in steps {
            self.execute(step)?;
        }
        Ok(())
    }

    fn lookup_connection(&self, id: ConnectionId) -> Result<Connection, FlowError> {
        self.connections
            .get(id.0 as usize)
            .copied()
            .ok_or(FlowError::UnknownConnection(id))
    }

    fn source_amount(&self, source: FlowSource) -> Result<u32, FlowError> {
        match source {
            FlowSource::Input(id) => self
                .inputs
                .get(id.0 as usize)
                .map(Input::amount)
                .ok_or(FlowError::UnknownInput(id)),
            FlowSource::Destination(id) => self
                .destinations
                .get(id)
                .map(Destination::amount)
                .ok_or(FlowError::UnknownDestination(id)),
        }
    }

    fn apply(&mut self, connection: Connection, initial: u32) -> Result<(), FlowError> {
        let amount = block_count(Fixed64::from_num(initial) * connection.fraction);
        match connection.from {
            FlowSource::Input(_) => self.add_money(connection.to, amount),
            FlowSource::Destination(from) => self.move_money(from, connection.to, amount),
        }
    }

    fn redraw(&mut self) {
        for redraw in &mut self.redraw_fns {
            redraw();
        }
    }

    // -----------------------------------------------------------------------
    // Timeline generation
    // -----------------------------------------------------------------------

    /// Schedule `iterations` worth of steps onto `builder`.
    ///
    /// The first step lands at time zero; every later step is offset from
    /// its predecessor by the predecessor's declared delay, converted from
    /// milliseconds to seconds. Each transfer therefore visually follows
    /// the prior one after its duration elapses.
    pub fn build_timeline(&self, iterations: u32, builder: &mut impl TimelineBuilder) {
        let mut at = Fixed64::ZERO;
        let mut previous_delay: Option<Millis> = None;
        for step in self.loop_steps(iterations) {
            if let Some(delay) = previous_delay {
                at += ms_to_seconds(delay);
            }
            builder.add(step, at);
            previous_delay = Some(step.delay_ms);
        }
    }

    /// Generate a ready-to-drive [`StepTimeline`] for `iterations`.
    pub fn generate_timeline(&self, iterations: u32) -> StepTimeline {
        let mut timeline = StepTimeline::new();
        self.build_timeline(iterations, &mut timeline);
        timeline
    }
}
