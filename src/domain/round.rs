//! Draw rounds and result announcement.
//!
//! A round is open for bets until its result is announced. Announcement
//! needs a well-formed result and a minimum number of distinct admin
//! confirmations; once announced, the round's exposure is archived and
//! reset by the round manager.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bet_type::BetType;
use super::error::EngineError;

/// Lifecycle state of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Accepting bets.
    Open,
    /// Result published; no further bets.
    Announced,
}

/// Winning digits of a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    /// Three-digit top prize.
    pub top: String,
    /// Two-digit bottom prize.
    pub bottom: String,
}

impl DrawResult {
    pub fn validate(&self) -> Result<(), EngineError> {
        let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(&self.top, 3) {
            return Err(EngineError::InvalidResult(format!(
                "top must be 3 digits, got {:?}",
                self.top
            )));
        }
        if !digits(&self.bottom, 2) {
            return Err(EngineError::InvalidResult(format!(
                "bottom must be 2 digits, got {:?}",
                self.bottom
            )));
        }
        Ok(())
    }

    /// Whether a bet on `number` of `bet_type` wins this draw.
    pub fn is_winner(&self, bet_type: BetType, number: &str) -> bool {
        match bet_type {
            BetType::ThreeDigitTop => number == self.top,
            BetType::ThreeDigitAnyOrder => sorted(number) == sorted(&self.top),
            BetType::TwoDigitTop => self.top.get(1..) == Some(number),
            BetType::TwoDigitBottom => number == self.bottom,
            BetType::RunTop => number.len() == 1 && self.top.contains(number),
            BetType::RunBottom => number.len() == 1 && self.bottom.contains(number),
        }
    }
}

fn sorted(s: &str) -> Vec<char> {
    let mut chars: Vec<char> = s.chars().collect();
    chars.sort_unstable();
    chars
}

/// One draw cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: u64,
    pub status: RoundStatus,
    pub opened_at: DateTime<Utc>,
    pub announced_at: Option<DateTime<Utc>>,
    pub result: Option<DrawResult>,
    /// Distinct admins who confirmed the announced result.
    pub confirmed_by: Vec<String>,
}

impl Round {
    /// Open a new round.
    pub fn open(id: u64) -> Self {
        Self {
            id,
            status: RoundStatus::Open,
            opened_at: Utc::now(),
            announced_at: None,
            result: None,
            confirmed_by: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == RoundStatus::Open
    }

    /// Mark the round announced.
    ///
    /// Blank and repeated admin identities count once (blank ones not at all).
    pub fn announce(
        &mut self,
        result: DrawResult,
        confirmations: &[String],
        required: usize,
    ) -> Result<(), EngineError> {
        if !self.is_open() {
            return Err(EngineError::RoundNotOpen { round_id: self.id });
        }
        result.validate()?;

        let distinct: BTreeSet<&str> = confirmations
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if distinct.len() < required {
            return Err(EngineError::InsufficientConfirmations {
                required,
                got: distinct.len(),
            });
        }

        self.confirmed_by = distinct.into_iter().map(str::to_string).collect();
        self.result = Some(result);
        self.status = RoundStatus::Announced;
        self.announced_at = Some(Utc::now());
        Ok(())
    }
}
