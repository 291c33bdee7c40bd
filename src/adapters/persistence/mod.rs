//! Persistence Adapters - JSONL-based File Storage
//!
//! Implements the BetJournal port using append-only JSONL files
//! for bets and atomic JSON snapshots for announced rounds.
//! No database dependency; lightweight and crash-recoverable.

pub mod archive;
pub mod bet_log;
pub mod journal_impl;

pub use archive::ArchiveStore;
pub use bet_log::BetLog;
pub use journal_impl::FileJournal;
