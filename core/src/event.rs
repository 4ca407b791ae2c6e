//! Per-tick outcome log.
//!
//! RULE: events describe what happened; they never drive state.
//! A command that could not take effect is still a silent no-op on the
//! simulation state. The event only tells an observer why.

use crate::{
    command::Command,
    position::Position,
    types::{ProductId, UnitId},
    unit::TransactionKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Episode ────────────────────────────────────
    EpisodeInitialized {
        seed:    u64,
        markets: Vec<Position>,
    },

    // ── Command dispatch ───────────────────────────
    UnitWaited {
        unit_id: UnitId,
    },
    UnitMoved {
        unit_id: UnitId,
        from:    Position,
        /// Equal to `from` when the move ran into an edge.
        to:      Position,
    },
    TransactionStarted {
        unit_id:    UnitId,
        kind:       TransactionKind,
        market_id:  usize,
        busy_ticks: u32,
    },
    CommandIgnored {
        unit_id: UnitId,
        command: Command,
        reason:  NoOpReason,
    },

    // ── Busy period ────────────────────────────────
    BusyTick {
        unit_id:   UnitId,
        remaining: u32,
    },
    BuyCompleted {
        unit_id:    UnitId,
        market_id:  usize,
        product_id: ProductId,
        price:      f64,
    },
    SellCompleted {
        unit_id:   UnitId,
        market_id: usize,
        items:     u32,
        revenue:   f64,
    },
    TransactionVoided {
        unit_id: UnitId,
        kind:    TransactionKind,
        reason:  NoOpReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    Busy,
    NoMarketNearby,
    InventoryFull,
    InsufficientFunds,
}
