//! Bet requests and the exposure key they accumulate under.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::bet_type::BetType;
use super::error::InputError;

/// Largest wager, pool figure or exposure the desk accepts.
///
/// Keeps every sum and product in the evaluation far inside `Decimal`'s range.
pub const MAX_FIGURE: Decimal = dec!(1000000000000);

/// Check an operator-supplied money figure (simulation overrides).
pub fn check_figure(field: &'static str, value: Decimal) -> Result<(), InputError> {
    if value < Decimal::ZERO || value > MAX_FIGURE {
        return Err(InputError::FigureOutOfRange {
            field,
            value,
            max: MAX_FIGURE,
        });
    }
    Ok(())
}

/// One incoming wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub bet_type: BetType,
    /// Digit string wagered on.
    pub number: String,
    /// Gross wager before commission.
    pub amount: Decimal,
    /// Placed through a referrer (commission applies).
    #[serde(default)]
    pub has_referrer: bool,
}

impl EvaluationRequest {
    /// Reject malformed bets before they reach the engine.
    ///
    /// Numbers of the wrong length are refused, never padded or truncated.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.amount <= Decimal::ZERO {
            return Err(InputError::NonPositiveAmount(self.amount));
        }
        if self.amount > MAX_FIGURE {
            return Err(InputError::AmountTooLarge {
                amount: self.amount,
                max: MAX_FIGURE,
            });
        }
        if !self.number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::NonDigit {
                number: self.number.clone(),
            });
        }
        let expected = self.bet_type.digit_len();
        if self.number.len() != expected {
            return Err(InputError::WrongDigitCount {
                number: self.number.clone(),
                bet_type: self.bet_type,
                expected,
            });
        }
        Ok(())
    }

    /// Key of the exposure row this bet accumulates on.
    pub fn exposure_key(&self, round_id: u64) -> ExposureKey {
        ExposureKey::new(round_id, self.bet_type, &self.number)
    }
}

/// Ledger key: one exposure row per (round, bet type, number).
///
/// Any-order bets share a row across permutations, so the number is
/// stored with its digits sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExposureKey {
    pub round_id: u64,
    pub bet_type: BetType,
    pub number: String,
}

impl ExposureKey {
    pub fn new(round_id: u64, bet_type: BetType, number: &str) -> Self {
        let number = if bet_type.is_any_order() {
            let mut digits: Vec<char> = number.chars().collect();
            digits.sort_unstable();
            digits.into_iter().collect()
        } else {
            number.to_string()
        };
        Self {
            round_id,
            bet_type,
            number,
        }
    }
}

impl std::fmt::Display for ExposureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.round_id, self.bet_type, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bet(bet_type: BetType, number: &str, amount: Decimal) -> EvaluationRequest {
        EvaluationRequest {
            bet_type,
            number: number.to_string(),
            amount,
            has_referrer: false,
        }
    }

    #[test]
    fn test_valid_bets_pass() {
        assert!(bet(BetType::ThreeDigitTop, "007", dec!(10)).validate().is_ok());
        assert!(bet(BetType::TwoDigitBottom, "42", dec!(0.5)).validate().is_ok());
        assert!(bet(BetType::RunTop, "9", dec!(1)).validate().is_ok());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert_eq!(
            bet(BetType::RunTop, "1", Decimal::ZERO).validate(),
            Err(InputError::NonPositiveAmount(Decimal::ZERO))
        );
        assert!(bet(BetType::RunTop, "1", dec!(-5)).validate().is_err());
    }

    #[test]
    fn test_oversized_amount_rejected() {
        assert_eq!(
            bet(BetType::TwoDigitTop, "42", Decimal::MAX).validate(),
            Err(InputError::AmountTooLarge {
                amount: Decimal::MAX,
                max: MAX_FIGURE,
            })
        );
        assert!(bet(BetType::TwoDigitTop, "42", MAX_FIGURE).validate().is_ok());
    }

    #[test]
    fn test_figures_must_be_non_negative_and_bounded() {
        assert!(check_figure("capital", Decimal::ZERO).is_ok());
        assert!(check_figure("capital", MAX_FIGURE).is_ok());
        assert!(matches!(
            check_figure("capital", dec!(-1000000)),
            Err(InputError::FigureOutOfRange { field: "capital", .. })
        ));
        assert!(check_figure("total_sales", Decimal::MAX).is_err());
    }

    #[test]
    fn test_wrong_length_rejected_not_coerced() {
        assert_eq!(
            bet(BetType::ThreeDigitTop, "12", dec!(10)).validate(),
            Err(InputError::WrongDigitCount {
                number: "12".to_string(),
                bet_type: BetType::ThreeDigitTop,
                expected: 3,
            })
        );
        assert!(bet(BetType::TwoDigitTop, "123", dec!(10)).validate().is_err());
    }

    #[test]
    fn test_non_digit_rejected() {
        assert!(matches!(
            bet(BetType::TwoDigitTop, "1a", dec!(10)).validate(),
            Err(InputError::NonDigit { .. })
        ));
        assert!(bet(BetType::TwoDigitTop, "", dec!(10)).validate().is_err());
    }

    #[test]
    fn test_any_order_keys_share_permutations() {
        let a = ExposureKey::new(1, BetType::ThreeDigitAnyOrder, "321");
        let b = ExposureKey::new(1, BetType::ThreeDigitAnyOrder, "213");
        assert_eq!(a, b);
        assert_eq!(a.number, "123");

        let straight = ExposureKey::new(1, BetType::ThreeDigitTop, "321");
        assert_eq!(straight.number, "321");
    }
}
