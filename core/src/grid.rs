//! The cell-type map. Cell types are written once by initialize() and
//! never change for the rest of the episode.

use crate::{
    error::{SimError, SimResult},
    position::Position,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Cell type codes are part of the external snapshot contract and are
/// serialized as the bare integers 0/1/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CellType {
    Empty    = 0,
    Obstacle = 1,
    Market   = 2,
}

impl CellType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellType::Empty),
            1 => Some(CellType::Obstacle),
            2 => Some(CellType::Market),
            _ => None,
        }
    }
}

impl Serialize for CellType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for CellType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        CellType::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown cell type code {code}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width:  usize,
    height: usize,
    /// Row-major: index = x * width + y.
    cells:  Vec<CellType>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellType::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize  { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn contains(&self, position: &Position) -> bool {
        position.x < self.height && position.y < self.width
    }

    pub fn cell(&self, position: &Position) -> SimResult<CellType> {
        self.index(position).map(|i| self.cells[i])
    }

    pub fn is_empty_at(&self, position: &Position) -> SimResult<bool> {
        Ok(self.cell(position)? == CellType::Empty)
    }

    pub(crate) fn set(&mut self, position: &Position, cell: CellType) -> SimResult<()> {
        let i = self.index(position)?;
        self.cells[i] = cell;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(CellType::Empty);
    }

    pub fn count(&self, cell: CellType) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Copy out as `height` rows of `width` cells.
    pub fn rows(&self) -> Vec<Vec<CellType>> {
        self.cells.chunks(self.width).map(|row| row.to_vec()).collect()
    }

    fn index(&self, position: &Position) -> SimResult<usize> {
        if !self.contains(position) {
            return Err(SimError::CellOutOfBounds {
                position: *position,
                width:    self.width,
                height:   self.height,
            });
        }
        Ok(position.x * self.width + position.y)
    }
}
