//! Shared primitive types used across the entire simulation.

/// A simulation tick. Counted from the last initialize().
pub type Tick = u64;

/// Simulated time, in the same units as the transaction duration.
pub type SimTime = f64;

/// Key into the product table.
pub type ProductId = u32;

/// Stable identifier for a unit within one episode.
pub type UnitId = u32;

/// The only product defined by the default configuration.
pub const PRODUCT_SEMICONDUCTOR: ProductId = 0;
