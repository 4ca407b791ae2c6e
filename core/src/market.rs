//! Markets and the price function.

use crate::{
    config::{ProductConfig, SimConfig},
    error::SimResult,
    position::Position,
    types::{ProductId, SimTime},
};
use std::collections::BTreeMap;

/// Price of a product at simulated time `t`.
///
/// Oscillates smoothly within `[price_low, price_high]` with period 2π.
pub fn price_at(product: &ProductConfig, t: SimTime) -> f64 {
    let phase = 0.5 * (t.sin() + 1.0);
    product.price_low + (product.price_high - product.price_low) * phase
}

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id:       usize,
    pub name:     String,
    pub position: Position,
}

impl Market {
    pub fn new(id: usize, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
        }
    }

    /// Errors with `UnknownProduct` when `product_id` is not in the table.
    pub fn price_of(&self, config: &SimConfig, product_id: ProductId, t: SimTime) -> SimResult<f64> {
        config.product(product_id).map(|p| price_at(p, t))
    }

    /// Price of every configured product at `t`, in id order.
    pub fn price_board(&self, config: &SimConfig, t: SimTime) -> BTreeMap<ProductId, f64> {
        config
            .products
            .iter()
            .map(|(id, p)| (*id, price_at(p, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SimError, types::PRODUCT_SEMICONDUCTOR};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn semiconductor() -> ProductConfig {
        ProductConfig {
            name:       "Semiconductor".into(),
            price_low:  40.0,
            price_high: 120.0,
        }
    }

    #[test]
    fn price_hits_midpoint_and_extremes() {
        let p = semiconductor();
        assert!((price_at(&p, 0.0) - 80.0).abs() < 1e-9);
        assert!((price_at(&p, FRAC_PI_2) - 120.0).abs() < 1e-9);
        assert!((price_at(&p, 3.0 * FRAC_PI_2) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn price_is_bounded_and_periodic() {
        let p = semiconductor();
        let mut t = 0.0;
        while t < 50.0 {
            let price = price_at(&p, t);
            assert!((40.0..=120.0).contains(&price), "price {price} at t={t}");
            assert!((price - price_at(&p, t + 2.0 * PI)).abs() < 1e-9);
            t += 0.1;
        }
    }

    #[test]
    fn unknown_product_is_a_lookup_error() {
        let config = SimConfig::default();
        let market = Market::new(0, "Market_0", Position::new(1, 1));
        assert!(market.price_of(&config, PRODUCT_SEMICONDUCTOR, 0.0).is_ok());
        assert!(matches!(
            market.price_of(&config, 42, 0.0),
            Err(SimError::UnknownProduct { product_id: 42 })
        ));
    }
}
