//! Destinations: named accumulators of money blocks laid out on a grid.
//!
//! A destination owns an ordered list of block ids; the block data itself
//! lives in the [`World`]. The grid slot of the block at index `i` is
//! deterministic from `i` and the destination's config alone, regardless of
//! whether the block was created here or moved in from elsewhere.
//!
//! Transfers remove blocks from the **tail** of the sender: the remaining
//! blocks keep their grid slots and the sender's grid is never re-packed.

use crate::block::{Color, Position, World};
use crate::fixed::Fixed64;
use crate::id::{BlockId, ConnectionId, DestinationId, InputId, UniverseId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by destination mutations and step execution.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A transfer or destroy asked for more blocks than the holder has.
    /// Raised before any mutation; both sides are left untouched.
    #[error("insufficient funds in '{name}': requested {requested}, available {available}")]
    InsufficientFunds {
        name: String,
        requested: u32,
        available: u32,
    },
    /// A step referenced a destination that was never added to the simulation.
    #[error("unknown destination: {0:?}")]
    UnknownDestination(DestinationId),
    /// A step referenced an input that was never added to the simulation.
    #[error("unknown input: {0:?}")]
    UnknownInput(InputId),
    /// A step referenced a connection that was never added to the simulation.
    #[error("unknown connection: {0:?}")]
    UnknownConnection(ConnectionId),
}

// ---------------------------------------------------------------------------
// DestinationConfig
// ---------------------------------------------------------------------------

/// Read-only grid parameters for a destination.
///
/// Row 0 sits on the base position; later rows stack upward. The cell pitch
/// is `(block_size + block_gutter) * scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub block_size: Fixed64,
    pub blocks_per_row: u32,
    pub block_gutter: Fixed64,
    /// Base position of the grid slot at index 0.
    #[serde(default)]
    pub position: Position,
    /// When set, incoming and freshly created blocks take this color.
    #[serde(default)]
    pub color: Option<Color>,
    /// Asset key of an image drawn behind the grid, if any.
    #[serde(default)]
    pub image: Option<String>,
    /// Display toggle consumed by renderers; the simulation ignores it.
    #[serde(default = "default_show_blocks")]
    pub show_blocks: bool,
    #[serde(default = "default_scale")]
    pub scale: Fixed64,
}

fn default_show_blocks() -> bool {
    true
}

fn default_scale() -> Fixed64 {
    Fixed64::ONE
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            block_size: Fixed64::from_num(10),
            blocks_per_row: 10,
            block_gutter: Fixed64::from_num(2),
            position: Position::ORIGIN,
            color: None,
            image: None,
            show_blocks: true,
            scale: Fixed64::ONE,
        }
    }
}

impl DestinationConfig {
    /// Grid slot for the block at `index`.
    pub fn grid_slot(&self, index: u32) -> Position {
        let row = index / self.blocks_per_row;
        let col = index % self.blocks_per_row;
        let pitch = (self.block_size + self.block_gutter) * self.scale;
        let x = self.position.x + Fixed64::from_num(col) * pitch;
        let y = if row == 0 {
            self.position.y
        } else {
            self.position.y - Fixed64::from_num(row) * pitch
        };
        Position::new(x, y)
    }
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// A named accumulator of money blocks.
///
/// Invariant: `amount() == blocks().len()` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    name: String,
    universe: UniverseId,
    config: DestinationConfig,
    blocks: Vec<BlockId>,
}

impl Destination {
    /// Create a destination with the default grid config and `amount`
    /// starting blocks at sequential grid slots.
    pub fn new(name: impl Into<String>, amount: u32, universe: UniverseId, world: &mut World) -> Self {
        Self::with_config(name, amount, universe, DestinationConfig::default(), world)
    }

    /// Create a destination with an explicit grid config.
    ///
    /// # Panics
    ///
    /// Panics if `config.blocks_per_row` is zero.
    pub fn with_config(
        name: impl Into<String>,
        amount: u32,
        universe: UniverseId,
        config: DestinationConfig,
        world: &mut World,
    ) -> Self {
        assert!(config.blocks_per_row > 0, "blocks_per_row must be > 0");
        let mut destination = Self {
            name: name.into(),
            universe,
            config,
            blocks: Vec::with_capacity(amount as usize),
        };
        destination.add_money(world, amount);
        destination
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &UniverseId {
        &self.universe
    }

    pub fn config(&self) -> &DestinationConfig {
        &self.config
    }

    /// Current holdings, always equal to `blocks().len()`.
    pub fn amount(&self) -> u32 {
        self.blocks.len() as u32
    }

    /// The held block ids in grid order.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Append `amount` freshly created blocks at the next grid slots.
    pub fn add_money(&mut self, world: &mut World, amount: u32) {
        let start = self.blocks.len() as u32;
        for i in 0..amount {
            let position = self.config.grid_slot(start + i);
            let id = world.create_block(
                &self.universe,
                position,
                self.config.block_size,
                self.config.color.unwrap_or_default(),
            );
            self.blocks.push(id);
        }
    }

    /// Re-home existing blocks into this destination's grid.
    ///
    /// Each block gets the grid position for its new index here, this
    /// config's block size, this config's color when one is set, and its
    /// moving flag raised. Universe membership never changes.
    pub fn add_blocks(&mut self, world: &mut World, blocks: Vec<BlockId>) {
        for id in blocks {
            let position = self.config.grid_slot(self.blocks.len() as u32);
            if let Some(block) = world.block_mut(id) {
                block.position = position;
                block.block_size = self.config.block_size;
                if let Some(color) = self.config.color {
                    block.color = color;
                }
                block.moving = true;
            }
            self.blocks.push(id);
        }
    }

    /// Move the last `amount` blocks to `destination`, preserving their
    /// identity and order.
    ///
    /// Checked before any mutation: requesting more than the current
    /// holdings fails with [`FlowError::InsufficientFunds`] and leaves both
    /// destinations untouched.
    pub fn move_to(
        &mut self,
        destination: &mut Destination,
        world: &mut World,
        amount: u32,
    ) -> Result<(), FlowError> {
        if amount > self.amount() {
            return Err(FlowError::InsufficientFunds {
                name: self.name.clone(),
                requested: amount,
                available: self.amount(),
            });
        }
        let moved = self.blocks.split_off(self.blocks.len() - amount as usize);
        destination.add_blocks(world, moved);
        Ok(())
    }

    /// Destroy the last `amount` blocks. Same insufficient-funds guard as
    /// [`move_to`](Destination::move_to).
    pub fn destroy_blocks(&mut self, world: &mut World, amount: u32) -> Result<(), FlowError> {
        if amount > self.amount() {
            return Err(FlowError::InsufficientFunds {
                name: self.name.clone(),
                requested: amount,
                available: self.amount(),
            });
        }
        for _ in 0..amount {
            if let Some(id) = self.blocks.pop() {
                world.destroy_block(id);
            }
        }
        Ok(())
    }

    /// Destroy every held block.
    pub fn destroy_all_blocks(&mut self, world: &mut World) {
        while let Some(id) = self.blocks.pop() {
            world.destroy_block(id);
        }
    }
}
