//! Resolve a scene description into a runnable simulation.

use std::collections::HashMap;

use moneyflow_core::block::{Color, Position};
use moneyflow_core::destination::{Destination, DestinationConfig};
use moneyflow_core::fixed::f64_to_fixed64;
use moneyflow_core::flow::{Connection, FlowSimulation, FlowSource, Input};
use moneyflow_core::id::{DestinationId, InputId, UniverseId};

use crate::error::SceneError;
use crate::scene_schema::{SceneData, SceneDestination};

/// A fully constructed scene ready to generate and run flow steps.
///
/// The id maps let a renderer find the simulation object behind each scene
/// id when drawing labels or wiring scroll triggers.
#[derive(Debug)]
pub struct ActiveScene {
    pub simulation: FlowSimulation,
    pub scene_data: SceneData,
    pub destination_ids: HashMap<String, DestinationId>,
    pub input_ids: HashMap<String, InputId>,
}

impl ActiveScene {
    /// Look up a destination's current amount by scene id.
    pub fn amount_of(&self, scene_id: &str) -> Option<u32> {
        let id = *self.destination_ids.get(scene_id)?;
        self.simulation.destination(id).map(|d| d.amount())
    }
}

fn config_of(destination: &SceneDestination) -> DestinationConfig {
    DestinationConfig {
        block_size: f64_to_fixed64(destination.block_size),
        blocks_per_row: destination.blocks_per_row,
        block_gutter: f64_to_fixed64(destination.block_gutter),
        position: Position::new(
            f64_to_fixed64(destination.position.0),
            f64_to_fixed64(destination.position.1),
        ),
        color: destination.color.map(|(r, g, b)| Color::rgb(r, g, b)),
        image: destination.image.clone(),
        show_blocks: destination.show_blocks,
        scale: f64_to_fixed64(destination.scale),
    }
}

/// Build an active scene from a parsed scene description.
///
/// Destinations are created first (in document order, so their blocks claim
/// world slots deterministically), then inputs, then connections. Every
/// connection endpoint must name a declared element; connection targets
/// must be destinations.
pub fn build_scene(data: &SceneData) -> Result<ActiveScene, SceneError> {
    let mut simulation = FlowSimulation::new();
    simulation.set_flow_duration(data.flow_duration_ms);
    let universe = UniverseId::new(&data.universe);

    let mut destination_ids: HashMap<String, DestinationId> = HashMap::new();
    let mut input_ids: HashMap<String, InputId> = HashMap::new();

    for scene_destination in &data.destinations {
        if destination_ids.contains_key(&scene_destination.id) {
            return Err(SceneError::DuplicateId {
                id: scene_destination.id.clone(),
            });
        }
        let name = scene_destination
            .name
            .clone()
            .unwrap_or_else(|| scene_destination.id.clone());
        let destination = Destination::with_config(
            name,
            scene_destination.amount,
            universe.clone(),
            config_of(scene_destination),
            simulation.world_mut(),
        );
        let id = simulation.add_destination(destination);
        destination_ids.insert(scene_destination.id.clone(), id);
    }

    for scene_input in &data.inputs {
        if destination_ids.contains_key(&scene_input.id) || input_ids.contains_key(&scene_input.id)
        {
            return Err(SceneError::DuplicateId {
                id: scene_input.id.clone(),
            });
        }
        let id = simulation.add_input(Input::new(scene_input.amount));
        input_ids.insert(scene_input.id.clone(), id);
    }

    for scene_connection in &data.connections {
        let from = if let Some(&input) = input_ids.get(&scene_connection.from) {
            FlowSource::Input(input)
        } else if let Some(&destination) = destination_ids.get(&scene_connection.from) {
            FlowSource::Destination(destination)
        } else {
            return Err(SceneError::EndpointNotFound {
                id: scene_connection.from.clone(),
            });
        };
        let to = match destination_ids.get(&scene_connection.to) {
            Some(&destination) => destination,
            None if input_ids.contains_key(&scene_connection.to) => {
                return Err(SceneError::TargetIsInput {
                    id: scene_connection.to.clone(),
                });
            }
            None => {
                return Err(SceneError::EndpointNotFound {
                    id: scene_connection.to.clone(),
                });
            }
        };
        simulation.add_connection(Connection::with_fraction(
            from,
            to,
            f64_to_fixed64(scene_connection.fraction),
        ));
    }

    Ok(ActiveScene {
        simulation,
        scene_data: data.clone(),
        destination_ids,
        input_ids,
    })
}

/// Parse a JSON scene document and build it.
pub fn from_json(json: &str) -> Result<ActiveScene, SceneError> {
    let data: SceneData = serde_json::from_str(json).map_err(|error| SceneError::Parse {
        detail: error.to_string(),
    })?;
    build_scene(&data)
}
