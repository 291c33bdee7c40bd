//! Bet types offered on a draw.
//!
//! The set is closed: every bet type must have exactly one entry in the
//! payout table before the desk accepts bets for it.

use serde::{Deserialize, Serialize};

/// Kind of numbers bet.
///
/// Serialized in snake_case; the short codes used by the admin screens
/// (`TOP3`, `TOD3`, `TOP2`, `BOTTOM2`, `RUN_TOP`, `RUN_BOTTOM`) are
/// accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    /// Three digits, exact order, against the top prize.
    #[serde(alias = "TOP3")]
    ThreeDigitTop,
    /// Three digits in any order ("tod").
    #[serde(alias = "TOD3")]
    ThreeDigitAnyOrder,
    /// Last two digits of the top prize.
    #[serde(alias = "TOP2")]
    TwoDigitTop,
    /// Two-digit bottom prize.
    #[serde(alias = "BOTTOM2")]
    TwoDigitBottom,
    /// Single digit appearing anywhere in the top three digits.
    #[serde(alias = "RUN_TOP")]
    RunTop,
    /// Single digit appearing anywhere in the bottom two digits.
    #[serde(alias = "RUN_BOTTOM")]
    RunBottom,
}

impl BetType {
    /// Every bet type, in display order.
    pub const ALL: [Self; 6] = [
        Self::ThreeDigitTop,
        Self::ThreeDigitAnyOrder,
        Self::TwoDigitTop,
        Self::TwoDigitBottom,
        Self::RunTop,
        Self::RunBottom,
    ];

    /// Number of digits a wagered number must have for this bet type.
    pub const fn digit_len(self) -> usize {
        match self {
            Self::ThreeDigitTop | Self::ThreeDigitAnyOrder => 3,
            Self::TwoDigitTop | Self::TwoDigitBottom => 2,
            Self::RunTop | Self::RunBottom => 1,
        }
    }

    /// Whether digit order is irrelevant for this bet type.
    pub const fn is_any_order(self) -> bool {
        matches!(self, Self::ThreeDigitAnyOrder)
    }

    /// Short code used in metric labels and logs.
    pub const fn code(self) -> &'static str {
        match self {
            Self::ThreeDigitTop => "TOP3",
            Self::ThreeDigitAnyOrder => "TOD3",
            Self::TwoDigitTop => "TOP2",
            Self::TwoDigitBottom => "BOTTOM2",
            Self::RunTop => "RUN_TOP",
            Self::RunBottom => "RUN_BOTTOM",
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
