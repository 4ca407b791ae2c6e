use crate::{position::Position, types::ProductId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Product {product_id} is not configured")]
    UnknownProduct { product_id: ProductId },

    #[error("Cell {position} is outside the {height}x{width} grid")]
    CellOutOfBounds { position: Position, width: usize, height: usize },

    #[error("Unknown command code {code} (expected 0..=6)")]
    UnknownCommand { code: u8 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
