//! Static simulation configuration.
//!
//! All values are fixed for an engine's lifetime. Nothing here is
//! negotiated or changed at runtime.

use crate::{
    error::{SimError, SimResult},
    position::Position,
    types::{ProductId, SimTime, PRODUCT_SEMICONDUCTOR},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative tolerance when converting transaction time to whole ticks.
const BUSY_TICK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductConfig {
    pub name:       String,
    pub price_low:  f64,
    pub price_high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Number of columns; bounds the y axis.
    pub grid_width:       usize,
    /// Number of rows; bounds the x axis.
    pub grid_height:      usize,
    pub initial_cash:     f64,
    /// Maximum total item count a unit may carry.
    pub unit_capacity:    u32,
    /// Duration of one buy or sell, in simulated-time units.
    pub transaction_time: SimTime,
    /// Simulated time that elapses per tick.
    pub tick_duration:    SimTime,
    pub market_count:     usize,
    pub unit_origin:      Position,
    /// The product a Load command buys.
    pub traded_product:   ProductId,
    /// Ordered by id so sell-all iterates deterministically.
    pub products:         BTreeMap<ProductId, ProductConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut products = BTreeMap::new();
        products.insert(
            PRODUCT_SEMICONDUCTOR,
            ProductConfig {
                name:       "Semiconductor".into(),
                price_low:  40.0,
                price_high: 120.0,
            },
        );

        Self {
            grid_width:       5,
            grid_height:      5,
            initial_cash:     1000.0,
            unit_capacity:    1,
            transaction_time: 1.0,
            tick_duration:    0.25,
            market_count:     3,
            unit_origin:      Position::new(0, 0),
            traded_product:   PRODUCT_SEMICONDUCTOR,
            products,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing fields fall back to the defaults.
    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn product(&self, product_id: ProductId) -> SimResult<&ProductConfig> {
        self.products
            .get(&product_id)
            .ok_or(SimError::UnknownProduct { product_id })
    }

    /// Ticks a unit stays busy for one buy or sell: the transaction time
    /// rounded up to whole ticks. A quotient within float noise of an
    /// integer counts as that integer.
    pub fn busy_ticks_per_transaction(&self) -> u32 {
        let ticks = self.transaction_time / self.tick_duration;
        let nearest = ticks.round();
        let whole = if (ticks - nearest).abs() <= BUSY_TICK_EPSILON * nearest.max(1.0) {
            nearest
        } else {
            ticks.ceil()
        };
        (whole as u32).max(1)
    }

    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }

    /// Reject configurations the engine cannot run without breaking an
    /// invariant or looping forever.
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |reason: String| Err(SimError::InvalidConfig { reason });

        if self.grid_width == 0 || self.grid_height == 0 {
            return invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_height, self.grid_width
            ));
        }
        if self.unit_origin.x >= self.grid_height || self.unit_origin.y >= self.grid_width {
            return invalid(format!("unit origin {} is outside the grid", self.unit_origin));
        }
        if !(self.tick_duration > 0.0) {
            return invalid(format!("tick_duration must be > 0, got {}", self.tick_duration));
        }
        if !(self.transaction_time > 0.0) {
            return invalid(format!(
                "transaction_time must be > 0, got {}",
                self.transaction_time
            ));
        }
        if !(self.initial_cash >= 0.0) {
            return invalid(format!("initial_cash must be >= 0, got {}", self.initial_cash));
        }
        if self.products.is_empty() {
            return invalid("product table is empty".into());
        }
        for (id, product) in &self.products {
            if !(product.price_low <= product.price_high) || product.price_low < 0.0 {
                return invalid(format!(
                    "product {id} ({}) has bad price range [{}, {}]",
                    product.name, product.price_low, product.price_high
                ));
            }
        }
        if !self.products.contains_key(&self.traded_product) {
            return invalid(format!("traded product {} is not configured", self.traded_product));
        }
        if self.market_count > self.cell_count() {
            return invalid(format!(
                "{} markets do not fit on a {}x{} grid",
                self.market_count, self.grid_height, self.grid_width
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.busy_ticks_per_transaction(), 4);
    }

    #[test]
    fn busy_ticks_round_up() {
        let config = SimConfig {
            transaction_time: 1.1,
            ..SimConfig::default()
        };
        assert_eq!(config.busy_ticks_per_transaction(), 5);
    }

    #[test]
    fn busy_ticks_ignore_float_noise_on_exact_multiples() {
        for (transaction_time, tick_duration, expected) in [
            (1.8, 0.12, 15),
            (0.9, 0.06, 15),
            (0.3, 0.1, 3),
            (0.7, 0.1, 7),
            (1.0, 0.25, 4),
            (1e-12, 1.0, 1),
        ] {
            let config = SimConfig {
                transaction_time,
                tick_duration,
                ..SimConfig::default()
            };
            assert_eq!(
                config.busy_ticks_per_transaction(),
                expected,
                "{transaction_time} / {tick_duration}"
            );
        }
    }

    #[test]
    fn busy_ticks_round_up_partial_ticks() {
        let config = SimConfig {
            transaction_time: 0.31,
            tick_duration: 0.1,
            ..SimConfig::default()
        };
        assert_eq!(config.busy_ticks_per_transaction(), 4);
    }

    #[test]
    fn too_many_markets_rejected() {
        let config = SimConfig {
            grid_width: 2,
            grid_height: 2,
            market_count: 5,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig { .. })));
    }

    #[test]
    fn unconfigured_traded_product_rejected() {
        let config = SimConfig {
            traded_product: 9,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_tick_duration_rejected() {
        let config = SimConfig {
            tick_duration: 0.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "grid_width": 8, "initial_cash": 250.0 }"#).unwrap();
        assert_eq!(config.grid_width, 8);
        assert_eq!(config.grid_height, 5);
        assert_eq!(config.initial_cash, 250.0);
        assert!(config.products.contains_key(&PRODUCT_SEMICONDUCTOR));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "grid_width": "wide" }"#),
            Err(SimError::Serialization(_))
        ));
    }

    #[test]
    fn from_json_validates() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "tick_duration": -1.0 }"#),
            Err(SimError::InvalidConfig { .. })
        ));
        assert!(SimConfig::from_json("{}").is_ok());
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = SimConfig::load("/nonexistent/sim_config.json").unwrap_err();
        assert!(matches!(err, SimError::Other(_)));
        assert!(err.to_string().contains("/nonexistent/sim_config.json"));
    }

    #[test]
    fn product_table_parses_integer_keys() {
        let json = r#"{
            "products": {
                "0": { "name": "Semiconductor", "price_low": 40.0, "price_high": 120.0 },
                "3": { "name": "Copper", "price_low": 5.0, "price_high": 9.0 }
            }
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.product(3).unwrap().name, "Copper");
        assert!(matches!(
            config.product(1),
            Err(SimError::UnknownProduct { product_id: 1 })
        ));
    }
}
