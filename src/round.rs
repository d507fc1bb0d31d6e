use serde::{Deserialize, Serialize};

/// Tournament rounds in bracket order. The play-in round is round 0; the
/// six main rounds are numbered 1 through 6 so that a team's progress
/// (wins + byes) equals the number of the next round it must win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    FirstFour,
    RoundOf64,
    RoundOf32,
    Sweet16,
    EliteEight,
    FinalFour,
    Championship,
}

impl Round {
    /// Number of rounds, play-in included.
    pub const COUNT: usize = 7;

    /// The six main rounds, in the order they are played.
    pub const MAIN_ROUNDS: [Round; 6] = [
        Round::RoundOf64,
        Round::RoundOf32,
        Round::Sweet16,
        Round::EliteEight,
        Round::FinalFour,
        Round::Championship,
    ];

    /// Position of this round in bracket order, 0 through 6.
    pub fn number(self) -> u8 {
        match self {
            Round::FirstFour => 0,
            Round::RoundOf64 => 1,
            Round::RoundOf32 => 2,
            Round::Sweet16 => 3,
            Round::EliteEight => 4,
            Round::FinalFour => 5,
            Round::Championship => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Round> {
        match n {
            0 => Some(Round::FirstFour),
            1 => Some(Round::RoundOf64),
            2 => Some(Round::RoundOf32),
            3 => Some(Round::Sweet16),
            4 => Some(Round::EliteEight),
            5 => Some(Round::FinalFour),
            6 => Some(Round::Championship),
            _ => None,
        }
    }
}
