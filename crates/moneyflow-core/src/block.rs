//! Money blocks and the per-universe world registry.
//!
//! A [`Block`] is one discrete visual unit of money. Blocks live in a
//! [`World`]: a single slot map for storage plus per-universe membership
//! lists. The `World` is owned by its simulation (or test) and passed into
//! destination operations, so independent simulations never share block
//! pools and tests never leak state into each other.
//!
//! Field writes on a block are plain writes with no notification; redraw
//! signalling happens once per executed flow step, owned by
//! [`FlowSimulation`](crate::flow::FlowSimulation).

use crate::fixed::Fixed64;
use crate::id::{BlockId, UniverseId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Geometry & color
// ---------------------------------------------------------------------------

/// A 2D position in canvas coordinates. Y grows downward; grid rows stack
/// upward (negative y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: Fixed64,
    pub y: Fixed64,
}

impl Position {
    pub fn new(x: Fixed64, y: Fixed64) -> Self {
        Self { x, y }
    }

    /// The canvas origin.
    pub const ORIGIN: Position = Position {
        x: Fixed64::ZERO,
        y: Fixed64::ZERO,
    };
}

/// An RGBA color applied to a block when it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One discrete unit of money.
///
/// Identity is the [`BlockId`] under which the block is registered and is
/// stable for the block's whole lifetime, including transfers between
/// destinations -- a transfer only mutates position, size, color, and the
/// moving flag. Universe membership is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    universe: UniverseId,
    pub position: Position,
    pub block_size: Fixed64,
    pub color: Color,
    /// Set while an animation is carrying the block to a new grid slot.
    pub moving: bool,
}

impl Block {
    /// The universe this block was created in.
    pub fn universe(&self) -> &UniverseId {
        &self.universe
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Registry of all live blocks, partitioned by universe.
///
/// Storage follows the primary-SlotMap-plus-secondary-structures pattern:
/// block data lives in one `SlotMap` and each universe keeps an ordered
/// membership list of ids. Total length only changes through
/// [`create_block`](World::create_block) and
/// [`destroy_block`](World::destroy_block); transfers between destinations
/// never touch it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    blocks: SlotMap<BlockId, Block>,
    universes: BTreeMap<UniverseId, Vec<BlockId>>,
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block and register it in `universe`. Returns its id.
    pub fn create_block(
        &mut self,
        universe: &UniverseId,
        position: Position,
        block_size: Fixed64,
        color: Color,
    ) -> BlockId {
        let id = self.blocks.insert(Block {
            universe: universe.clone(),
            position,
            block_size,
            color,
            moving: false,
        });
        self.universes.entry(universe.clone()).or_default().push(id);
        id
    }

    /// Remove a block from the registry. A second call for the same id is
    /// a no-op.
    pub fn destroy_block(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.remove(id)
            && let Some(members) = self.universes.get_mut(&block.universe)
        {
            members.retain(|&b| b != id);
        }
    }

    /// All live block ids registered in `universe`, in creation order.
    /// Unknown universes yield an empty slice.
    pub fn blocks_in(&self, universe: &UniverseId) -> &[BlockId] {
        self.universes
            .get(universe)
            .map(|members| members.as_slice())
            .unwrap_or(&[])
    }

    /// Get the block data for a given id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Get mutable block data for a given id.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    /// Returns true if the block is still alive.
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Total number of live blocks across all universes.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no blocks are alive.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over all live blocks and their ids.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter()
    }
}
