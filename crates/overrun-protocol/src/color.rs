use std::fmt;

use serde::{Deserialize, Serialize};

/// Player identity: one of a fixed six-color palette. Colors double as
/// stable identifiers on the wire, so a player keeps the same color on
/// every participant's copy of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Yellow,
    Green,
    Orange,
    Purple,
}

impl PlayerColor {
    /// Palette order used when assigning colors to seats at setup.
    pub const PALETTE: [PlayerColor; 6] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Yellow,
        PlayerColor::Green,
        PlayerColor::Orange,
        PlayerColor::Purple,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Yellow => "yellow",
            PlayerColor::Green => "green",
            PlayerColor::Orange => "orange",
            PlayerColor::Purple => "purple",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_six_distinct_colors() {
        for (i, a) in PlayerColor::PALETTE.iter().enumerate() {
            for b in PlayerColor::PALETTE.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn color_names_are_lowercase() {
        for color in PlayerColor::PALETTE {
            assert_eq!(color.name(), color.name().to_lowercase());
        }
    }
}
