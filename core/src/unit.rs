//! The mobile trading unit and its movement/transaction state machine.
//!
//! RULE: inventory counts change only through the engine's transaction
//! completion logic. The unit exposes no public way to mutate them.

use crate::{
    position::{Direction, Position},
    types::{ProductId, UnitId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Idle,
    Moving,
    Loading,
    Selling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl TransactionKind {
    fn state(self) -> UnitState {
        match self {
            TransactionKind::Buy  => UnitState::Loading,
            TransactionKind::Sell => UnitState::Selling,
        }
    }
}

/// Item counts keyed by product id, one slot per configured product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<ProductId, u32>);

impl Inventory {
    pub fn for_products<I: IntoIterator<Item = ProductId>>(ids: I) -> Self {
        Self(ids.into_iter().map(|id| (id, 0)).collect())
    }

    pub fn count(&self, product_id: ProductId) -> u32 {
        self.0.get(&product_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.0.iter().map(|(id, n)| (*id, *n))
    }

    pub(crate) fn add_one(&mut self, product_id: ProductId) {
        *self.0.entry(product_id).or_insert(0) += 1;
    }

    /// Zero every slot, returning the non-empty ones in id order.
    pub(crate) fn drain(&mut self) -> Vec<(ProductId, u32)> {
        let mut taken = Vec::new();
        for (id, n) in self.0.iter_mut() {
            if *n > 0 {
                taken.push((*id, *n));
                *n = 0;
            }
        }
        taken
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id:       UnitId,
    pub position: Position,
    inventory:    Inventory,
    busy_ticks:   u32,
    state:        UnitState,
}

impl Unit {
    pub fn new(id: UnitId, position: Position, inventory: Inventory) -> Self {
        Self {
            id,
            position,
            inventory,
            busy_ticks: 0,
            state: UnitState::Idle,
        }
    }

    pub fn inventory(&self) -> &Inventory { &self.inventory }
    pub fn busy_ticks(&self) -> u32       { self.busy_ticks }
    pub fn state(&self) -> UnitState      { self.state }

    pub fn is_busy(&self) -> bool {
        self.busy_ticks > 0
    }

    pub(crate) fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Step one cell, clamped to the grid. Walking into an edge is a no-op.
    pub fn move_by(&mut self, direction: Direction, height: usize, width: usize) {
        self.state = UnitState::Moving;
        self.position = self.position.step(direction, height, width);
    }

    pub(crate) fn idle(&mut self) {
        self.state = UnitState::Idle;
    }

    pub(crate) fn begin_transaction(&mut self, kind: TransactionKind, busy_ticks: u32) {
        debug_assert!(busy_ticks > 0);
        self.state = kind.state();
        self.busy_ticks = busy_ticks;
    }

    /// Count down one busy tick. Returns the finished transaction, if
    /// this tick completed one.
    ///
    /// The state is left at Loading/Selling after completion; with
    /// `busy_ticks == 0` the unit accepts commands again.
    pub(crate) fn tick_busy(&mut self) -> Option<TransactionKind> {
        debug_assert!(self.busy_ticks > 0);
        self.busy_ticks -= 1;
        if self.busy_ticks > 0 {
            return None;
        }
        match self.state {
            UnitState::Loading => Some(TransactionKind::Buy),
            UnitState::Selling => Some(TransactionKind::Sell),
            UnitState::Idle | UnitState::Moving => None,
        }
    }
}
