//! Declarative flow scenes.
//!
//! A scene is a JSON document describing a flow graph -- destinations with
//! grid configs, inputs, and fractional connections referencing both by
//! string id. [`build_scene`] resolves the names and returns an
//! [`ActiveScene`]: a ready-to-run simulation plus the id maps a renderer
//! needs to label what it draws.

pub mod error;
pub mod scene_builder;
pub mod scene_schema;

pub use error::SceneError;
pub use scene_builder::{ActiveScene, build_scene, from_json};
pub use scene_schema::{SceneConnection, SceneData, SceneDestination, SceneInput};
