//! Territories and the territory table.
//!
//! Territory ids index directly into [`TerritoryTable`]; slot 0 is reserved
//! for "no territory" (sea). A territory with `size == 0` does not exist.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::Direction;
use crate::player::PlayerId;

/// Minimum dice on a territory.
pub const MIN_DICE: u8 = 1;

/// Maximum dice on a territory.
pub const MAX_DICE: u8 = 8;

/// Unique identifier for territories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TerritoryId(pub u16);

impl TerritoryId {
    /// Unassigned cell / no territory.
    pub const NONE: Self = Self(0);

    /// Create a new territory ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Whether this is the reserved "no territory" id.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Slot index in a [`TerritoryTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive bounding box in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Leftmost column.
    pub left: u32,
    /// Rightmost column.
    pub right: u32,
    /// Topmost row.
    pub top: u32,
    /// Bottommost row.
    pub bottom: u32,
}

impl BoundingBox {
    /// Box covering a single cell.
    #[must_use]
    pub const fn point(x: u32, y: u32) -> Self {
        Self {
            left: x,
            right: x,
            top: y,
            bottom: y,
        }
    }

    /// Grow the box to include (x, y).
    pub fn include(&mut self, x: u32, y: u32) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y);
    }

    /// Midpoint of the box (integer division).
    #[must_use]
    pub const fn midpoint(&self) -> (u32, u32) {
        ((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }
}

/// One edge of a territory outline: a cell and the direction it faces out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderStep {
    /// Cell on the inside of the edge.
    pub cell: usize,
    /// Direction of the edge from that cell.
    pub direction: Direction,
}

impl BorderStep {
    /// Create a new border step.
    #[must_use]
    pub const fn new(cell: usize, direction: Direction) -> Self {
        Self { cell, direction }
    }
}

/// A territory on the generated map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Territory id (slot in the table).
    pub id: TerritoryId,
    /// Number of cells (0 = does not exist).
    pub size: usize,
    /// Owning player.
    pub owner: Option<PlayerId>,
    /// Dice stationed here.
    pub dice: u8,
    /// Extent in grid coordinates.
    pub bounding_box: Option<BoundingBox>,
    /// Interior cell used to anchor labels and dice.
    pub center: Option<usize>,
    /// Territories sharing at least one cell edge with this one.
    pub adjacency: BTreeSet<TerritoryId>,
    /// Ordered outline for polygon rendering.
    pub border: Vec<BorderStep>,
}

impl Territory {
    /// Create an empty (non-existent) territory slot.
    #[must_use]
    pub const fn empty(id: TerritoryId) -> Self {
        Self {
            id,
            size: 0,
            owner: None,
            dice: 0,
            bounding_box: None,
            center: None,
            adjacency: BTreeSet::new(),
            border: Vec::new(),
        }
    }

    /// Whether this territory survived generation.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.size > 0
    }

    /// Whether `other` borders this territory.
    #[must_use]
    pub fn is_adjacent(&self, other: TerritoryId) -> bool {
        self.adjacency.contains(&other)
    }
}

/// Table of territories indexed by [`TerritoryId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryTable {
    territories: Vec<Territory>,
}

impl TerritoryTable {
    /// Create a table with empty slots for ids `1..=max_territories`.
    #[must_use]
    pub fn new(max_territories: u16) -> Self {
        let territories = (0..=max_territories)
            .map(|id| Territory::empty(TerritoryId::new(id)))
            .collect();
        Self { territories }
    }

    /// Build a table from a list of territories, placing each at its id.
    ///
    /// Missing slots are filled with empty territories.
    #[must_use]
    pub fn from_territories(list: Vec<Territory>) -> Self {
        let max = list.iter().map(|t| t.id.0).max().unwrap_or(0);
        let mut table = Self::new(max);
        for territory in list {
            let index = territory.id.index();
            table.territories[index] = territory;
        }
        table
    }

    /// Number of slots including the reserved slot 0.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.territories.len()
    }

    /// Get a territory slot by id (existing or not).
    #[must_use]
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        if id.is_none() {
            None
        } else {
            self.territories.get(id.index())
        }
    }

    /// Get a mutable territory slot by id (existing or not).
    pub fn get_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        if id.is_none() {
            None
        } else {
            self.territories.get_mut(id.index())
        }
    }

    /// Get an existing territory or fail.
    pub fn existing(&self, id: TerritoryId) -> Result<&Territory> {
        self.get(id)
            .filter(|t| t.exists())
            .ok_or(GameError::UnknownTerritory(id))
    }

    fn existing_mut(&mut self, id: TerritoryId) -> Result<&mut Territory> {
        self.get_mut(id)
            .filter(|t| t.exists())
            .ok_or(GameError::UnknownTerritory(id))
    }

    /// Iterate all territories that survived generation, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Territory> {
        self.territories.iter().skip(1).filter(|t| t.exists())
    }

    /// Iterate all existing territories mutably, in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Territory> {
        self.territories.iter_mut().skip(1).filter(|t| t.exists())
    }

    /// Iterate existing territories with the slot index they occupy.
    ///
    /// The slot is authoritative; a deserialized table may store a
    /// different id in it.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &Territory)> {
        self.territories
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, t)| t.exists())
    }

    /// Iterate every slot except 0, including discarded ones.
    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = &mut Territory> {
        self.territories.iter_mut().skip(1)
    }

    /// Number of existing territories.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Existing territories owned by `player`.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Territory> {
        self.iter().filter(move |t| t.owner == Some(player))
    }

    /// Whether two territories share a border.
    #[must_use]
    pub fn are_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.get(a).is_some_and(|t| t.exists() && t.is_adjacent(b))
    }

    /// Record a symmetric adjacency edge.
    pub(crate) fn connect(&mut self, a: TerritoryId, b: TerritoryId) {
        if a == b || a.is_none() || b.is_none() {
            return;
        }
        if let Some(t) = self.get_mut(a) {
            t.adjacency.insert(b);
        }
        if let Some(t) = self.get_mut(b) {
            t.adjacency.insert(a);
        }
    }

    /// Change the owner of an existing territory.
    ///
    /// Callers must recompute connectivity for both the old and new owner.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTerritory`] if the territory does not exist.
    pub fn set_owner(&mut self, id: TerritoryId, owner: Option<PlayerId>) -> Result<Option<PlayerId>> {
        let territory = self.existing_mut(id)?;
        Ok(std::mem::replace(&mut territory.owner, owner))
    }

    /// Set the dice count of an existing territory.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidDiceCount`] if `dice` is outside
    /// `MIN_DICE..=MAX_DICE`, or [`GameError::UnknownTerritory`].
    pub fn set_dice(&mut self, id: TerritoryId, dice: u8) -> Result<()> {
        if !(MIN_DICE..=MAX_DICE).contains(&dice) {
            return Err(GameError::InvalidDiceCount { territory: id, dice });
        }
        self.existing_mut(id)?.dice = dice;
        Ok(())
    }

    /// Total dice on territories owned by `player`.
    #[must_use]
    pub fn dice_owned_by(&self, player: PlayerId) -> u32 {
        self.owned_by(player).map(|t| u32::from(t.dice)).sum()
    }

    /// Total dice on the whole map.
    #[must_use]
    pub fn total_dice(&self) -> u32 {
        self.iter().map(|t| u32::from(t.dice)).sum()
    }
}
