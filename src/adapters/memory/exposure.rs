//! In-memory Exposure Ledger
//!
//! Implements the `ExposureStore` port with a single `RwLock` over the
//! pools and exposure rows. The compare-and-swap happens under the
//! write lock, so a commit and the sales increment it implies are
//! applied atomically.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::domain::{ExposureKey, PoolState};
use crate::ports::exposure_store::{CommitOutcome, ExposureSnapshot, ExposureStore};

#[derive(Debug, Default)]
struct Ledger {
    pools: HashMap<u64, PoolState>,
    exposures: BTreeMap<ExposureKey, ExposureSnapshot>,
}

/// Process-local exposure ledger.
#[derive(Debug, Default)]
pub struct InMemoryExposureStore {
    ledger: RwLock<Ledger>,
}

impl InMemoryExposureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExposureStore for InMemoryExposureStore {
    #[instrument(skip(self))]
    async fn open_round(&self, round_id: u64, capital: Decimal) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        if ledger.pools.contains_key(&round_id) {
            bail!("round {round_id} is already open");
        }
        ledger.pools.insert(round_id, PoolState::new(capital, Decimal::ZERO));
        info!(round_id, %capital, "Round pool opened");
        Ok(())
    }

    async fn pool(&self, round_id: u64) -> Result<PoolState> {
        match self.ledger.read().await.pools.get(&round_id) {
            Some(pool) => Ok(*pool),
            None => bail!("round {round_id} has no pool"),
        }
    }

    async fn get(&self, key: &ExposureKey) -> Result<ExposureSnapshot> {
        Ok(self
            .ledger
            .read()
            .await
            .exposures
            .get(key)
            .copied()
            .unwrap_or_default())
    }

    async fn increment_if_unchanged(
        &self,
        key: &ExposureKey,
        expected_version: u64,
        amount: Decimal,
    ) -> Result<CommitOutcome> {
        let mut guard = self.ledger.write().await;
        let ledger = &mut *guard;

        let Some(pool) = ledger.pools.get_mut(&key.round_id) else {
            bail!("round {} has no pool", key.round_id);
        };

        let current = ledger.exposures.get(key).copied().unwrap_or_default();
        if current.version != expected_version {
            debug!(%key, expected_version, actual = current.version, "Exposure version moved");
            return Ok(CommitOutcome::Conflict(current));
        }

        let updated = ExposureSnapshot {
            cumulative_amount: current.cumulative_amount + amount,
            version: current.version + 1,
        };
        ledger.exposures.insert(key.clone(), updated);
        pool.total_sales += amount;

        Ok(CommitOutcome::Committed(updated))
    }

    async fn round_exposures(
        &self,
        round_id: u64,
    ) -> Result<Vec<(ExposureKey, ExposureSnapshot)>> {
        Ok(self
            .ledger
            .read()
            .await
            .exposures
            .iter()
            .filter(|(key, _)| key.round_id == round_id)
            .map(|(key, snapshot)| (key.clone(), *snapshot))
            .collect())
    }

    #[instrument(skip(self))]
    async fn reset_round(&self, round_id: u64) -> Result<()> {
        let mut ledger = self.ledger.write().await;
        ledger.pools.remove(&round_id);
        let before = ledger.exposures.len();
        ledger.exposures.retain(|key, _| key.round_id != round_id);
        info!(
            round_id,
            rows_cleared = before - ledger.exposures.len(),
            "Round exposure reset"
        );
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
