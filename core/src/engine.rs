//! The simulation engine. Owns the grid, the unit, the markets, the
//! clock, and the cash balance.
//!
//! TICK ORDER (fixed, never reordered):
//!   1. Advance the clock.
//!   2. If the unit is busy: count down, complete the transaction on
//!      reaching zero, and discard the incoming command.
//!   3. Otherwise dispatch the command: wait, move, begin-load, begin-sell.
//!
//! RULES:
//!   - No command is ever rejected with an error. Impossible commands
//!     (wall, no market, no funds, full inventory) are no-ops.
//!   - Beginning a transaction checks preconditions; effects apply only
//!     at completion, at the completion-time price.
//!   - Callers only ever receive owned snapshots.
//!   - All randomness flows through the engine's SimRng.

use crate::{
    clock::SimClock,
    command::Command,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{NoOpReason, SimEvent},
    grid::{CellType, Grid},
    market::Market,
    position::Position,
    rng::SimRng,
    snapshot::{MarketView, SimSnapshot, UnitView},
    types::{SimTime, Tick, UnitId},
    unit::{Inventory, TransactionKind, Unit},
};

pub struct SimEngine {
    clock:      SimClock,
    config:     SimConfig,
    rng:        SimRng,
    busy_ticks: u32,
    cash:       f64,
    grid:       Grid,
    units:      Vec<Unit>,
    markets:    Vec<Market>,
}

impl SimEngine {
    /// Validate `config` and start the first episode.
    pub fn new(config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let mut engine = Self {
            clock:      SimClock::new(config.tick_duration),
            rng:        SimRng::new(seed),
            busy_ticks: config.busy_ticks_per_transaction(),
            cash:       config.initial_cash,
            grid:       Grid::new(config.grid_height, config.grid_width),
            units:      Vec::new(),
            markets:    Vec::new(),
            config,
        };
        engine.initialize()?;
        Ok(engine)
    }

    pub fn with_defaults(seed: u64) -> SimResult<Self> {
        Self::new(SimConfig::default(), seed)
    }

    // ── Episode lifecycle ──────────────────────────────────────

    /// Start a new episode with `market_count` randomly placed markets.
    pub fn initialize(&mut self) -> SimResult<SimSnapshot> {
        self.reset_episode();
        for i in 0..self.config.market_count {
            let position = self.sample_empty_cell()?;
            self.place_market(i, position)?;
        }
        Ok(self.initialized_snapshot())
    }

    /// Start a new episode with markets at the given cells, in order.
    /// Used where a fixed layout is needed, e.g. reproducibility tests.
    /// A rejected layout leaves the running episode untouched.
    pub fn initialize_with_markets(&mut self, positions: &[Position]) -> SimResult<SimSnapshot> {
        let mut scratch = Grid::new(self.config.grid_height, self.config.grid_width);
        for position in positions {
            if !scratch.is_empty_at(position)? {
                return Err(SimError::InvalidConfig {
                    reason: format!("market cell {position} is already occupied"),
                });
            }
            scratch.set(position, CellType::Market)?;
        }

        self.reset_episode();
        for (i, position) in positions.iter().enumerate() {
            self.place_market(i, *position)?;
        }
        Ok(self.initialized_snapshot())
    }

    fn reset_episode(&mut self) {
        self.clock.reset();
        self.cash = self.config.initial_cash;
        self.grid.clear();
        self.markets.clear();
        let inventory = Inventory::for_products(self.config.products.keys().copied());
        self.units = vec![Unit::new(0, self.config.unit_origin, inventory)];
    }

    fn place_market(&mut self, index: usize, position: Position) -> SimResult<()> {
        self.grid.set(&position, CellType::Market)?;
        self.markets.push(Market::new(index, format!("Market_{index}"), position));
        Ok(())
    }

    /// Rejection sampling: draw cells until one is empty.
    /// Terminates because validate() caps market_count at the cell count.
    fn sample_empty_cell(&mut self) -> SimResult<Position> {
        loop {
            let x = self.rng.next_index_below(self.config.grid_height);
            let y = self.rng.next_index_below(self.config.grid_width);
            let position = Position::new(x, y);
            if self.grid.is_empty_at(&position)? {
                return Ok(position);
            }
        }
    }

    fn initialized_snapshot(&self) -> SimSnapshot {
        let markets: Vec<Position> = self.markets.iter().map(|m| m.position).collect();
        log::info!(
            "episode initialized: seed={} cash={:.2} markets={:?}",
            self.rng.seed(),
            self.cash,
            markets
        );
        self.snapshot_with(vec![SimEvent::EpisodeInitialized {
            seed: self.rng.seed(),
            markets,
        }])
    }

    // ── Tick ───────────────────────────────────────────────────

    /// Advance one tick, applying `command` to the unit.
    ///
    /// Errors only on configuration faults; a command that cannot take
    /// effect is a no-op, never an error.
    pub fn advance_tick(&mut self, command: Command) -> SimResult<SimSnapshot> {
        let tick = self.clock.advance();
        let mut events = Vec::new();

        for idx in 0..self.units.len() {
            if self.units[idx].is_busy() {
                self.tick_busy_unit(idx, command, &mut events)?;
            } else {
                self.dispatch(idx, command, &mut events)?;
            }
        }

        self.check_invariants();
        log::trace!("tick={tick} t={:.2} cash={:.2}", self.time(), self.cash);
        Ok(self.snapshot_with(events))
    }

    fn tick_busy_unit(
        &mut self,
        idx: usize,
        command: Command,
        events: &mut Vec<SimEvent>,
    ) -> SimResult<()> {
        let unit = &mut self.units[idx];
        let unit_id = unit.id;
        let finished = unit.tick_busy();
        let remaining = unit.busy_ticks();

        if command != Command::Wait {
            log::debug!("unit {unit_id} busy, discarding {command:?}");
            events.push(SimEvent::CommandIgnored {
                unit_id,
                command,
                reason: NoOpReason::Busy,
            });
        }
        events.push(SimEvent::BusyTick { unit_id, remaining });

        match finished {
            Some(TransactionKind::Buy)  => self.execute_buy(idx, events),
            Some(TransactionKind::Sell) => self.execute_sell(idx, events),
            None                        => Ok(()),
        }
    }

    fn dispatch(&mut self, idx: usize, command: Command, events: &mut Vec<SimEvent>) -> SimResult<()> {
        let unit_id = self.units[idx].id;
        match command {
            Command::Wait => {
                self.units[idx].idle();
                events.push(SimEvent::UnitWaited { unit_id });
            }
            Command::Move { direction } => {
                let (height, width) = (self.config.grid_height, self.config.grid_width);
                let unit = &mut self.units[idx];
                let from = unit.position;
                unit.move_by(direction, height, width);
                log::debug!("unit {unit_id} {direction:?}: {from} -> {}", unit.position);
                events.push(SimEvent::UnitMoved {
                    unit_id,
                    from,
                    to: unit.position,
                });
            }
            Command::Load => match self.check_can_buy(&self.units[idx])? {
                Ok(market_id) => self.begin(idx, TransactionKind::Buy, market_id, events),
                Err(reason)   => self.ignore(unit_id, command, reason, events),
            },
            Command::SellAll => match self.nearby_market_id(&self.units[idx].position) {
                Some(market_id) => self.begin(idx, TransactionKind::Sell, market_id, events),
                None            => self.ignore(unit_id, command, NoOpReason::NoMarketNearby, events),
            },
        }
        Ok(())
    }

    fn begin(
        &mut self,
        idx: usize,
        kind: TransactionKind,
        market_id: usize,
        events: &mut Vec<SimEvent>,
    ) {
        let unit = &mut self.units[idx];
        unit.begin_transaction(kind, self.busy_ticks);
        log::debug!(
            "unit {} begins {kind:?} at market {market_id} for {} ticks",
            unit.id,
            self.busy_ticks
        );
        events.push(SimEvent::TransactionStarted {
            unit_id: unit.id,
            kind,
            market_id,
            busy_ticks: self.busy_ticks,
        });
    }

    fn ignore(&self, unit_id: UnitId, command: Command, reason: NoOpReason, events: &mut Vec<SimEvent>) {
        log::debug!("unit {unit_id} {command:?} ignored: {reason:?}");
        events.push(SimEvent::CommandIgnored { unit_id, command, reason });
    }

    /// Begin-load preconditions: a market nearby, room in the inventory,
    /// and enough cash for the traded product at the current time.
    /// The outer result carries configuration faults only.
    fn check_can_buy(&self, unit: &Unit) -> SimResult<Result<usize, NoOpReason>> {
        let Some(market) = self.find_nearby_market(&unit.position) else {
            return Ok(Err(NoOpReason::NoMarketNearby));
        };
        if unit.inventory().total() >= self.config.unit_capacity {
            return Ok(Err(NoOpReason::InventoryFull));
        }
        let price = market.price_of(&self.config, self.config.traded_product, self.time())?;
        if self.cash < price {
            return Ok(Err(NoOpReason::InsufficientFunds));
        }
        Ok(Ok(market.id))
    }

    // ── Transaction completion ────────────────────────────────

    /// Buy one unit of the traded product at the completion-time price.
    /// The market is looked up again; the price may have moved since the
    /// load began, and the buy is voided if cash no longer covers it.
    fn execute_buy(&mut self, idx: usize, events: &mut Vec<SimEvent>) -> SimResult<()> {
        let unit_id = self.units[idx].id;
        let void = |reason: NoOpReason, events: &mut Vec<SimEvent>| {
            log::debug!("unit {unit_id} buy voided: {reason:?}");
            events.push(SimEvent::TransactionVoided {
                unit_id,
                kind: TransactionKind::Buy,
                reason,
            });
        };

        let Some(market) = self.find_nearby_market(&self.units[idx].position) else {
            void(NoOpReason::NoMarketNearby, events);
            return Ok(());
        };
        let market_id = market.id;
        let product_id = self.config.traded_product;
        let price = market.price_of(&self.config, product_id, self.time())?;

        if self.units[idx].inventory().total() >= self.config.unit_capacity {
            void(NoOpReason::InventoryFull, events);
            return Ok(());
        }
        if self.cash < price {
            void(NoOpReason::InsufficientFunds, events);
            return Ok(());
        }

        self.cash -= price;
        self.units[idx].inventory_mut().add_one(product_id);
        log::debug!("unit {unit_id} bought product {product_id} at {price:.2}, cash={:.2}", self.cash);
        events.push(SimEvent::BuyCompleted {
            unit_id,
            market_id,
            product_id,
            price,
        });
        Ok(())
    }

    /// Liquidate every held product at its completion-time price.
    fn execute_sell(&mut self, idx: usize, events: &mut Vec<SimEvent>) -> SimResult<()> {
        let unit_id = self.units[idx].id;
        let Some(market) = self.find_nearby_market(&self.units[idx].position) else {
            log::debug!("unit {unit_id} sell voided: no market nearby");
            events.push(SimEvent::TransactionVoided {
                unit_id,
                kind: TransactionKind::Sell,
                reason: NoOpReason::NoMarketNearby,
            });
            return Ok(());
        };
        let market_id = market.id;
        let t = self.time();

        // Price everything before touching the inventory so an unknown
        // product leaves state unchanged.
        let held: Vec<_> = self.units[idx].inventory().iter().filter(|(_, n)| *n > 0).collect();
        let mut revenue = 0.0;
        for (product_id, count) in &held {
            revenue += market.price_of(&self.config, *product_id, t)? * f64::from(*count);
        }

        let items: u32 = self.units[idx].inventory_mut().drain().iter().map(|(_, n)| n).sum();
        self.cash += revenue;
        log::debug!("unit {unit_id} sold {items} items for {revenue:.2}, cash={:.2}", self.cash);
        events.push(SimEvent::SellCompleted {
            unit_id,
            market_id,
            items,
            revenue,
        });
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    /// First market in creation order within distance 1 of `position`.
    /// Not the nearest: ties and near-ties resolve by creation order.
    pub fn find_nearby_market(&self, position: &Position) -> Option<&Market> {
        self.markets.iter().find(|m| position.distance_to(&m.position) <= 1)
    }

    fn nearby_market_id(&self, position: &Position) -> Option<usize> {
        self.find_nearby_market(position).map(|m| m.id)
    }

    pub fn snapshot(&self) -> SimSnapshot {
        self.snapshot_with(Vec::new())
    }

    fn snapshot_with(&self, events: Vec<SimEvent>) -> SimSnapshot {
        let t = self.time();
        SimSnapshot {
            tick:    self.clock.current_tick(),
            time:    t,
            cash:    self.cash,
            units:   self.units.iter().map(UnitView::from).collect(),
            markets: self
                .markets
                .iter()
                .map(|m| MarketView::new(m, m.price_board(&self.config, t)))
                .collect(),
            grid:    self.grid.rows(),
            events,
        }
    }

    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn cash(&self) -> f64          { self.cash }
    pub fn tick(&self) -> Tick         { self.clock.current_tick() }
    pub fn time(&self) -> SimTime      { self.clock.time() }
    pub fn seed(&self) -> u64          { self.rng.seed() }
    pub fn markets(&self) -> &[Market] { &self.markets }

    fn check_invariants(&self) {
        debug_assert!(self.cash >= 0.0, "cash went negative: {}", self.cash);
        for unit in &self.units {
            debug_assert!(
                unit.inventory().total() <= self.config.unit_capacity,
                "unit {} over capacity: {} > {}",
                unit.id,
                unit.inventory().total(),
                self.config.unit_capacity
            );
            debug_assert!(self.grid.contains(&unit.position), "unit {} left the grid", unit.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_markets(positions: &[Position]) -> SimEngine {
        let mut engine = SimEngine::with_defaults(1).unwrap();
        engine.initialize_with_markets(positions).unwrap();
        engine
    }

    #[test]
    fn nearby_market_prefers_creation_order_over_distance() {
        // Market_0 at distance 1, Market_1 directly underneath (distance 0).
        let engine = engine_with_markets(&[Position::new(0, 1), Position::new(1, 1)]);
        let found = engine.find_nearby_market(&Position::new(1, 1)).unwrap();
        assert_eq!(found.id, 0);
    }

    #[test]
    fn nearby_market_ignores_diagonals() {
        let engine = engine_with_markets(&[Position::new(1, 1)]);
        assert!(engine.find_nearby_market(&Position::new(0, 0)).is_none());
        assert!(engine.find_nearby_market(&Position::new(0, 1)).is_some());
    }

    #[test]
    fn overlapping_fixed_markets_rejected() {
        let mut engine = SimEngine::with_defaults(1).unwrap();
        let result = engine.initialize_with_markets(&[Position::new(2, 2), Position::new(2, 2)]);
        assert!(matches!(result, Err(SimError::InvalidConfig { .. })));
    }

    #[test]
    fn time_tracks_ticks_and_only_moves_forward() {
        let mut engine = SimEngine::with_defaults(2).unwrap();
        let mut last = engine.time();
        for tick in 1..=20 {
            engine.advance_tick(Command::Wait).unwrap();
            assert_eq!(engine.tick(), tick);
            assert_eq!(engine.time(), tick as f64 * engine.config().tick_duration);
            assert!(engine.time() > last);
            last = engine.time();
        }
    }

    #[test]
    fn rejected_layout_keeps_the_running_episode() {
        let mut engine = engine_with_markets(&[Position::new(0, 1), Position::new(3, 3)]);
        engine.advance_tick(Command::Load).unwrap();
        let before = engine.snapshot();

        assert!(engine
            .initialize_with_markets(&[Position::new(2, 2), Position::new(2, 2)])
            .is_err());
        assert_eq!(engine.snapshot(), before);

        assert!(engine
            .initialize_with_markets(&[Position::new(1, 1), Position::new(0, 9)])
            .is_err());
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn out_of_bounds_fixed_market_rejected() {
        let mut engine = SimEngine::with_defaults(1).unwrap();
        let result = engine.initialize_with_markets(&[Position::new(5, 0)]);
        assert!(matches!(result, Err(SimError::CellOutOfBounds { .. })));
    }

    #[test]
    fn random_layout_fills_every_cell_when_asked() {
        let config = SimConfig {
            grid_width: 3,
            grid_height: 3,
            market_count: 9,
            ..SimConfig::default()
        };
        let engine = SimEngine::new(config, 5).unwrap();
        assert_eq!(engine.markets().len(), 9);
        assert_eq!(engine.snapshot().grid.iter().flatten().filter(|c| **c == CellType::Market).count(), 9);
    }
}
