//! Persistence layer for the newsflash reader: a key-value store
//! capability with SQLite and in-memory backings, the per-API quota
//! tracker built on it, and the read-article history.
//!
//! Everything here degrades rather than fails: an unavailable or corrupt
//! store is treated as first-run state, and failed writes keep the
//! in-memory view while reporting the loss of durability.

pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod kv;
pub mod quota;

pub use clock::{Clock, ManualClock, SystemClock, unix_ms_to_iso8601};
pub use config::{ApiBudget, DAY_MS, QuotaConfig};
pub use error::{Result, StoreError};
pub use history::{ReadArticle, ReadingHistory};
pub use kv::{KvStore, MemoryKv, SqliteKv};
pub use quota::{QuotaEntry, QuotaTracker, UsageStats};
