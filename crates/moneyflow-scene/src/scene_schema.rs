//! Serde schema for scene documents.
//!
//! Numeric fields use `f64` at the schema boundary and are converted to
//! [`Fixed64`](moneyflow_core::fixed::Fixed64) when the scene is built, so
//! documents stay plain JSON.

use serde::Deserialize;

/// Top-level scene definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneData {
    pub title: String,
    /// Universe the scene's destinations create their blocks in.
    pub universe: String,
    /// Delay tagged onto generated steps, in milliseconds.
    #[serde(default = "default_flow_duration_ms")]
    pub flow_duration_ms: u32,
    pub destinations: Vec<SceneDestination>,
    #[serde(default)]
    pub inputs: Vec<SceneInput>,
    #[serde(default)]
    pub connections: Vec<SceneConnection>,
}

fn default_flow_duration_ms() -> u32 {
    moneyflow_core::flow::DEFAULT_FLOW_DURATION_MS
}

/// A destination in the scene graph.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDestination {
    /// Unique id within this scene (used by connections).
    pub id: String,
    /// Display label; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Starting block count.
    #[serde(default)]
    pub amount: u32,
    /// Base position of the grid.
    #[serde(default)]
    pub position: (f64, f64),
    #[serde(default = "default_block_size")]
    pub block_size: f64,
    #[serde(default = "default_blocks_per_row")]
    pub blocks_per_row: u32,
    #[serde(default = "default_block_gutter")]
    pub block_gutter: f64,
    /// RGB color applied to created and incoming blocks.
    #[serde(default)]
    pub color: Option<(u8, u8, u8)>,
    /// Asset key of an image drawn behind the grid.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_show_blocks")]
    pub show_blocks: bool,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_block_size() -> f64 {
    10.0
}

fn default_blocks_per_row() -> u32 {
    10
}

fn default_block_gutter() -> f64 {
    2.0
}

fn default_show_blocks() -> bool {
    true
}

fn default_scale() -> f64 {
    1.0
}

/// A fixed-amount input in the scene graph.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneInput {
    pub id: String,
    pub amount: u32,
}

/// A connection between two scene elements, referenced by id.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneConnection {
    pub from: String,
    pub to: String,
    #[serde(default = "default_fraction")]
    pub fraction: f64,
}

fn default_fraction() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_fills_defaults() {
        let json = r#"{
            "title": "Minimal",
            "universe": "uni1",
            "destinations": [{"id": "stash"}]
        }"#;

        let data: SceneData = serde_json::from_str(json).unwrap();

        assert_eq!(data.flow_duration_ms, 1000);
        assert!(data.inputs.is_empty());
        assert!(data.connections.is_empty());

        let stash = &data.destinations[0];
        assert_eq!(stash.amount, 0);
        assert_eq!(stash.block_size, 10.0);
        assert_eq!(stash.blocks_per_row, 10);
        assert_eq!(stash.block_gutter, 2.0);
        assert_eq!(stash.scale, 1.0);
        assert!(stash.show_blocks);
        assert!(stash.name.is_none());
        assert!(stash.color.is_none());
    }

    #[test]
    fn connection_fraction_defaults_to_one() {
        let json = r#"{"from": "a", "to": "b"}"#;
        let connection: SceneConnection = serde_json::from_str(json).unwrap();
        assert_eq!(connection.fraction, 1.0);
    }
}
