//! Validated construction inputs. `Context` and the session engines never
//! see an out-of-bounds configuration; everything is checked here first.

use crate::MAX_MAX_GUESSES;
use crate::MAX_NUM_CODES;
use crate::MAX_NUM_COLORS;
use crate::MAX_NUM_PLAYERS;
use crate::MAX_NUM_ROUNDS;
use crate::MAX_NUM_SLOTS;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum OptionsError {
    #[error("num_colors {0} exceeds MAX_NUM_COLORS {MAX_NUM_COLORS}")]
    TooManyColors(u8),
    #[error("num_slots {0} exceeds MAX_NUM_SLOTS {MAX_NUM_SLOTS}")]
    TooManySlots(u8),
    #[error("max_guesses {0} exceeds MAX_MAX_GUESSES {MAX_MAX_GUESSES}")]
    TooManyGuesses(u8),
    #[error("num_colors and num_slots must both be at least 1")]
    Degenerate,
    #[error("K^N = {0} exceeds the practical cap {MAX_NUM_CODES}")]
    TooManyCodes(u64),
    #[error("num_players {0} exceeds MAX_NUM_PLAYERS {MAX_NUM_PLAYERS}")]
    TooManyPlayers(u8),
    #[error("num_rounds {0} exceeds MAX_NUM_ROUNDS {MAX_NUM_ROUNDS}")]
    TooManyRounds(u8),
}

/// K, N, T — the game's combinatorial shape. Immutable once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub num_colors: u8,
    pub num_slots: u8,
    pub max_guesses: u8,
}

impl Options {
    pub fn new(num_colors: u8, num_slots: u8, max_guesses: u8) -> Result<Self, OptionsError> {
        if num_colors == 0 || num_slots == 0 {
            return Err(OptionsError::Degenerate);
        }
        if num_colors > MAX_NUM_COLORS {
            return Err(OptionsError::TooManyColors(num_colors));
        }
        if num_slots > MAX_NUM_SLOTS {
            return Err(OptionsError::TooManySlots(num_slots));
        }
        if max_guesses > MAX_MAX_GUESSES {
            return Err(OptionsError::TooManyGuesses(max_guesses));
        }
        let num_codes = (num_colors as u64).pow(num_slots as u32);
        if num_codes > MAX_NUM_CODES as u64 {
            return Err(OptionsError::TooManyCodes(num_codes));
        }
        Ok(Self {
            num_colors,
            num_slots,
            max_guesses,
        })
    }

    /// M = K^N, the total number of codes.
    pub fn num_codes(&self) -> u32 {
        (self.num_colors as u32).pow(self.num_slots as u32)
    }
}

/// session-level parameters layered on top of `Options`: how many rounds,
/// how many seats at the table. Lives alongside `Options` rather than
/// inside `Context` because it governs the session coordinator, not the
/// combinatorial engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rounds {
    pub num_rounds: u8,
    pub num_players: u8,
}

impl Rounds {
    pub fn new(num_rounds: u8, num_players: u8) -> Result<Self, OptionsError> {
        if num_rounds == 0 || num_rounds > MAX_NUM_ROUNDS {
            return Err(OptionsError::TooManyRounds(num_rounds));
        }
        if num_players == 0 || num_players > MAX_NUM_PLAYERS {
            return Err(OptionsError::TooManyPlayers(num_players));
        }
        Ok(Self {
            num_rounds,
            num_players,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_colors() {
        assert_eq!(
            Options::new(11, 4, 10),
            Err(OptionsError::TooManyColors(11))
        );
    }

    #[test]
    fn rejects_oversized_code_space() {
        // 10^10 vastly exceeds the practical cap even though colors/slots
        // individually pass the per-field bounds.
        assert!(matches!(
            Options::new(10, 10, 10),
            Err(OptionsError::TooManyCodes(_))
        ));
    }

    #[test]
    fn accepts_classic_mastermind() {
        let opts = Options::new(6, 4, 10).unwrap();
        assert_eq!(opts.num_codes(), 1296);
    }

    #[test]
    fn rejects_too_many_players() {
        assert_eq!(Rounds::new(1, 5), Err(OptionsError::TooManyPlayers(5)));
    }
}
