use crate::{
    error::{SimError, SimResult},
    position::Direction,
};
use serde::{Deserialize, Serialize};

/// Every command a driver can issue for one tick.
///
/// The integer encoding is a fixed contract with external drivers:
/// `0=wait, 1=up(-x), 2=down(+x), 3=left(-y), 4=right(+y), 5=load, 6=sell-all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Wait,
    Move { direction: Direction },
    Load,
    SellAll,
}

impl Command {
    pub const COUNT: u8 = 7;

    pub fn code(&self) -> u8 {
        match self {
            Command::Wait                                  => 0,
            Command::Move { direction: Direction::Up }    => 1,
            Command::Move { direction: Direction::Down }  => 2,
            Command::Move { direction: Direction::Left }  => 3,
            Command::Move { direction: Direction::Right } => 4,
            Command::Load                                  => 5,
            Command::SellAll                               => 6,
        }
    }

    pub fn from_code(code: u8) -> SimResult<Self> {
        Command::try_from(code)
    }
}

impl TryFrom<u8> for Command {
    type Error = SimError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let command = match code {
            0 => Command::Wait,
            1 => Command::Move { direction: Direction::Up },
            2 => Command::Move { direction: Direction::Down },
            3 => Command::Move { direction: Direction::Left },
            4 => Command::Move { direction: Direction::Right },
            5 => Command::Load,
            6 => Command::SellAll,
            _ => return Err(SimError::UnknownCommand { code }),
        };
        Ok(command)
    }
}
