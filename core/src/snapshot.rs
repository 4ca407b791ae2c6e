//! Read-only copies of simulation state handed to callers.
//!
//! A snapshot owns all of its data. Nothing in it aliases the engine,
//! so a caller may mutate or keep it freely without affecting later ticks.

use crate::{
    event::SimEvent,
    grid::CellType,
    market::Market,
    position::Position,
    types::{ProductId, SimTime, Tick, UnitId},
    unit::{Inventory, Unit, UnitState},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub tick:    Tick,
    pub time:    SimTime,
    pub cash:    f64,
    pub units:   Vec<UnitView>,
    pub markets: Vec<MarketView>,
    /// `grid_height` rows of `grid_width` cells.
    pub grid:    Vec<Vec<CellType>>,
    /// What happened during the tick that produced this snapshot.
    pub events:  Vec<SimEvent>,
}

impl SimSnapshot {
    pub fn unit(&self, id: UnitId) -> Option<&UnitView> {
        self.units.iter().find(|u| u.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id:         UnitId,
    pub position:   Position,
    pub inventory:  Inventory,
    pub busy_ticks: u32,
    pub state:      UnitState,
}

impl From<&Unit> for UnitView {
    fn from(unit: &Unit) -> Self {
        Self {
            id:         unit.id,
            position:   unit.position,
            inventory:  unit.inventory().clone(),
            busy_ticks: unit.busy_ticks(),
            state:      unit.state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketView {
    pub id:       usize,
    pub name:     String,
    pub position: Position,
    /// Every configured product's price at the snapshot time.
    pub prices:   BTreeMap<ProductId, f64>,
}

impl MarketView {
    pub fn new(market: &Market, prices: BTreeMap<ProductId, f64>) -> Self {
        Self {
            id:       market.id,
            name:     market.name.clone(),
            position: market.position,
            prices,
        }
    }
}
