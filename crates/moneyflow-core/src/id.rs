use serde::{Serialize, Deserialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a money block in the world registry.
    pub struct BlockId;

    /// Identifies a destination in a flow simulation.
    pub struct DestinationId;
}

/// Identifies an input by registration order. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputId(pub u32);

/// Identifies a connection by registration order.
///
/// Connections are never removed, so the index is stable and doubles as the
/// traversal order within a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

/// Caller-supplied opaque name partitioning block registries.
///
/// Two simulations constructed with different universe ids never share
/// block pools, so independent scenes cannot interact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniverseId(String);

impl UniverseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UniverseId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl std::fmt::Display for UniverseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
