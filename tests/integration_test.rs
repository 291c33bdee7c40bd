//! Integration Tests - Bet Desk and Round Manager against Ports
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mockall::mock;
use mockall::predicate::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::{RwLock, watch};

use lottery_risk_engine::adapters::memory::InMemoryExposureStore;
use lottery_risk_engine::adapters::metrics::MetricsRegistry;
use lottery_risk_engine::adapters::persistence::FileJournal;
use lottery_risk_engine::domain::{
    BetType, DrawResult, EngineError, EvaluationRequest, EvaluationStatus, ExposureKey,
    PoolState, RiskEvaluator, Round,
};
use lottery_risk_engine::ports::exposure_store::{
    CommitOutcome, ExposureSnapshot, ExposureStore,
};
use lottery_risk_engine::ports::journal::{BetJournal, BetRecord, RoundArchive};
use lottery_risk_engine::usecases::{BetDesk, RoundManager, SharedRound};

// ---- Mock Definitions ----

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl ExposureStore for Store {
        async fn open_round(&self, round_id: u64, capital: Decimal) -> anyhow::Result<()>;
        async fn pool(&self, round_id: u64) -> anyhow::Result<PoolState>;
        async fn get(&self, key: &ExposureKey) -> anyhow::Result<ExposureSnapshot>;
        async fn increment_if_unchanged(
            &self,
            key: &ExposureKey,
            expected_version: u64,
            amount: Decimal,
        ) -> anyhow::Result<CommitOutcome>;
        async fn round_exposures(
            &self,
            round_id: u64,
        ) -> anyhow::Result<Vec<(ExposureKey, ExposureSnapshot)>>;
        async fn reset_round(&self, round_id: u64) -> anyhow::Result<()>;
        async fn is_healthy(&self) -> bool;
    }
}

mock! {
    pub Journal {}

    #[async_trait::async_trait]
    impl BetJournal for Journal {
        async fn record_bet(&self, record: &BetRecord) -> anyhow::Result<()>;
        async fn load_bets(&self, round_id: u64) -> anyhow::Result<Vec<BetRecord>>;
        async fn save_archive(&self, archive: &RoundArchive) -> anyhow::Result<()>;
        async fn load_archive(&self, round_id: u64) -> anyhow::Result<Option<RoundArchive>>;
        async fn is_healthy(&self) -> bool;
    }
}

// ---- Helpers ----

fn shared_round(id: u64) -> SharedRound {
    Arc::new(RwLock::new(Round::open(id)))
}

fn desk<S: ExposureStore, J: BetJournal>(store: S, journal: J, attempts: u32) -> BetDesk<S, J> {
    let (_tx, rx) = watch::channel(Arc::new(RiskEvaluator::default()));
    BetDesk::new(
        Arc::new(store),
        Arc::new(journal),
        rx,
        shared_round(1),
        Arc::new(MetricsRegistry::new().unwrap()),
        attempts,
    )
}

fn top3(number: &str, amount: Decimal) -> EvaluationRequest {
    EvaluationRequest {
        bet_type: BetType::ThreeDigitTop,
        number: number.to_string(),
        amount,
        has_referrer: true,
    }
}

fn snapshot(cumulative_amount: Decimal, version: u64) -> ExposureSnapshot {
    ExposureSnapshot {
        cumulative_amount,
        version,
    }
}

// ---- Bet Desk with mocked ports ----

#[tokio::test]
async fn test_conflict_is_retried_against_fresh_exposure() {
    let mut store = MockStore::new();
    // limit = floor(50_000_000 * 0.30 / 800) = 18750
    store
        .expect_pool()
        .returning(|_| Ok(PoolState::new(dec!(50000000), Decimal::ZERO)));

    let reads = Arc::new(AtomicU64::new(0));
    let reads_ref = Arc::clone(&reads);
    store.expect_get().times(2).returning(move |_| {
        // A concurrent bet of 13000 lands between the two reads.
        if reads_ref.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(snapshot(Decimal::ZERO, 0))
        } else {
            Ok(snapshot(dec!(13000), 1))
        }
    });
    store
        .expect_increment_if_unchanged()
        .with(always(), eq(0), eq(dec!(1000)))
        .times(1)
        .returning(|_, _, _| Ok(CommitOutcome::Conflict(snapshot(dec!(13000), 1))));
    store
        .expect_increment_if_unchanged()
        .with(always(), eq(1), eq(dec!(1000)))
        .times(1)
        .returning(|_, _, _| Ok(CommitOutcome::Committed(snapshot(dec!(14000), 2))));

    let mut journal = MockJournal::new();
    journal
        .expect_record_bet()
        .withf(|record| record.applied_payout == dec!(700) && record.commission == dec!(80))
        .times(1)
        .returning(|_| Ok(()));

    let desk = desk(store, journal, 3);
    let placement = desk.place(&top3("123", dec!(1000))).await.unwrap();

    assert_eq!(placement.attempts, 2);
    assert_eq!(placement.result.current_exposure, dec!(13000));
    assert_eq!(placement.result.status, EvaluationStatus::Warning);
    assert_eq!(placement.result.net_amount, dec!(920));
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_exhausted_retries_report_conflict() {
    let mut store = MockStore::new();
    store
        .expect_pool()
        .returning(|_| Ok(PoolState::new(dec!(50000000), Decimal::ZERO)));
    store.expect_get().times(3).returning(|_| Ok(snapshot(Decimal::ZERO, 0)));
    store
        .expect_increment_if_unchanged()
        .times(3)
        .returning(|_, _, _| Ok(CommitOutcome::Conflict(snapshot(dec!(10), 9))));

    let mut journal = MockJournal::new();
    journal.expect_record_bet().never();

    let desk = desk(store, journal, 3);
    let err = desk.place(&top3("123", dec!(1000))).await.unwrap_err();

    assert!(err.is_transient());
    match err {
        EngineError::CommitConflict { key, attempts } => {
            assert_eq!(key, "1/TOP3/123");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_bet_never_touches_ledger() {
    let mut store = MockStore::new();
    // limit = floor(100_000 * 0.30 / 800) = 37
    store
        .expect_pool()
        .returning(|_| Ok(PoolState::new(dec!(100000), Decimal::ZERO)));
    store.expect_get().returning(|_| Ok(snapshot(Decimal::ZERO, 0)));
    store.expect_increment_if_unchanged().never();

    let mut journal = MockJournal::new();
    journal.expect_record_bet().never();

    let desk = desk(store, journal, 3);
    let placement = desk.place(&top3("123", dec!(1000))).await.unwrap();

    assert_eq!(placement.result.status, EvaluationStatus::Rejected);
    let reason = placement.result.rejection.unwrap();
    assert_eq!(reason.overshoot, dec!(963));
}

#[tokio::test]
async fn test_invalid_bet_never_reaches_ports() {
    let mut store = MockStore::new();
    store.expect_pool().never();
    store.expect_get().never();

    let desk = desk(store, MockJournal::new(), 3);
    let err = desk.place(&top3("12a", dec!(10))).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = desk.place(&top3("123", dec!(-5))).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn test_ledger_failure_propagates() {
    let mut store = MockStore::new();
    store
        .expect_pool()
        .returning(|_| Err(anyhow::anyhow!("ledger unreachable")));

    let desk = desk(store, MockJournal::new(), 3);
    let err = desk.place(&top3("123", dec!(10))).await.unwrap_err();
    assert!(matches!(err, EngineError::Ledger(_)));
    assert!(!err.is_transient());
}

// ---- Round Manager with mocked ports ----

#[tokio::test]
async fn test_announce_archives_winners_then_resets() {
    let mut store = MockStore::new();
    let mut seq = mockall::Sequence::new();
    store
        .expect_pool()
        .with(eq(3))
        .returning(|_| Ok(PoolState::new(dec!(1000000), dec!(300))));
    store
        .expect_round_exposures()
        .with(eq(3))
        .returning(|_| Ok(Vec::new()));
    store
        .expect_reset_round()
        .with(eq(3))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    store
        .expect_open_round()
        .with(eq(4), eq(dec!(1000000)))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    store
        .expect_pool()
        .with(eq(4))
        .returning(|_| Ok(PoolState::new(dec!(1000000), Decimal::ZERO)));

    let pool = PoolState::new(dec!(1000000), Decimal::ZERO);
    let evaluator = RiskEvaluator::default();
    let bets: Vec<BetRecord> = [
        (BetType::RunBottom, "5", dec!(100)),
        (BetType::TwoDigitTop, "23", dec!(100)),
        (BetType::ThreeDigitTop, "321", dec!(100)),
    ]
    .into_iter()
    .map(|(bet_type, number, amount)| {
        let request = EvaluationRequest {
            bet_type,
            number: number.to_string(),
            amount,
            has_referrer: false,
        };
        BetRecord::new(3, &request, &evaluator.evaluate(&request, &pool, Decimal::ZERO))
    })
    .collect();

    let mut journal = MockJournal::new();
    journal
        .expect_load_bets()
        .with(eq(3))
        .returning(move |_| Ok(bets.clone()));
    journal
        .expect_save_archive()
        // RUN_BOTTOM 100 * 4.2 + TOP2 100 * 90
        .withf(|archive| archive.winning_bets == 2 && archive.total_payout == dec!(9420))
        .times(1)
        .returning(|_| Ok(()));

    let round = shared_round(3);
    let manager = RoundManager::new(
        Arc::new(store),
        Arc::new(journal),
        Arc::clone(&round),
        Arc::new(MetricsRegistry::new().unwrap()),
        dec!(1000000),
        2,
    );

    let result = DrawResult {
        top: "123".to_string(),
        bottom: "45".to_string(),
    };
    let confirmations = vec!["admin-a".to_string(), "admin-b".to_string()];
    let archive = manager.announce(3, result, &confirmations).await.unwrap();

    assert_eq!(archive.round.confirmed_by, confirmations);
    assert_eq!(round.read().await.id, 4);
}

#[tokio::test]
async fn test_failed_archive_keeps_round_open() {
    let mut store = MockStore::new();
    store
        .expect_pool()
        .returning(|_| Ok(PoolState::new(dec!(1000000), Decimal::ZERO)));
    store.expect_round_exposures().returning(|_| Ok(Vec::new()));
    store.expect_reset_round().never();

    let mut journal = MockJournal::new();
    journal.expect_load_bets().returning(|_| Ok(Vec::new()));
    journal
        .expect_save_archive()
        .returning(|_| Err(anyhow::anyhow!("disk full")));

    let round = shared_round(1);
    let manager = RoundManager::new(
        Arc::new(store),
        Arc::new(journal),
        Arc::clone(&round),
        Arc::new(MetricsRegistry::new().unwrap()),
        dec!(1000000),
        2,
    );
    let result = DrawResult {
        top: "000".to_string(),
        bottom: "00".to_string(),
    };
    let err = manager
        .announce(1, result, &["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Ledger(_)));
    assert!(round.read().await.is_open());
}

// ---- Concurrency against the in-memory ledger ----

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bets_never_exceed_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryExposureStore::new());
    store.open_round(1, dec!(90000)).await.unwrap();
    let journal = Arc::new(FileJournal::from_data_dir(dir.path()).await.unwrap());
    let (_tx, rx) = watch::channel(Arc::new(RiskEvaluator::default()));
    let desk = Arc::new(BetDesk::new(
        Arc::clone(&store),
        Arc::clone(&journal),
        rx,
        shared_round(1),
        Arc::new(MetricsRegistry::new().unwrap()),
        10,
    ));

    // Base limit = floor(90000 * 0.20 / 90) = 200; 64 bets of 10 want 640.
    let mut handles = Vec::new();
    for _ in 0..64 {
        let desk = Arc::clone(&desk);
        handles.push(tokio::spawn(async move {
            let request = EvaluationRequest {
                bet_type: BetType::TwoDigitTop,
                number: "77".to_string(),
                amount: dec!(10),
                has_referrer: false,
            };
            desk.place(&request).await
        }));
    }

    let mut committed = Decimal::ZERO;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(placement) if placement.bet.is_some() => committed += placement.result.amount,
            Ok(_) | Err(EngineError::CommitConflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let key = ExposureKey::new(1, BetType::TwoDigitTop, "77");
    let exposure = store.get(&key).await.unwrap();
    let pool = store.pool(1).await.unwrap();
    let final_limit = (pool.total_pot() * dec!(0.20) / dec!(90)).floor();

    assert_eq!(exposure.cumulative_amount, committed);
    assert!(exposure.cumulative_amount <= final_limit);
    assert!(exposure.cumulative_amount > Decimal::ZERO);
    assert_eq!(
        journal.load_bets(1).await.unwrap().len() as u64,
        exposure.version
    );
}
