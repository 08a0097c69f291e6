use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::QuotaConfig;
use crate::error::{Result, StoreError};
use crate::kv::KvStore;

/// Single well-known key the whole entry map is persisted under.
const RATE_LIMITS_KEY: &str = "newsflash_rate_limits";

/// Entries untouched for longer than this are flagged stale.
const STALE_AFTER_MS: u64 = 60 * 60 * 1000;

/// One identity's usage inside its current window. Field names in the
/// persisted JSON match the original storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaEntry {
    pub count: u32,
    /// Epoch millis at which the window expires and the count resets.
    #[serde(rename = "resetTime")]
    pub reset_at_ms: u64,
    #[serde(rename = "lastUpdatedAt")]
    pub last_updated_ms: u64,
}

/// Derived usage snapshot for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageStats {
    pub used: u32,
    pub remaining: u32,
    pub total: u32,
    pub reset_at_ms: u64,
    /// Share of the budget consumed, rounded to two decimal places.
    pub percentage: f64,
}

/// Client-side sliding-window rate limiter over a persistent key-value
/// store.
///
/// Gates outbound calls to metered third-party APIs so they stay within
/// a free-tier budget, with no server coordination. State is loaded once
/// at construction and written through after every mutation.
///
/// The quota is advisory: separate processes sharing the same store can
/// each pass `can_make_request` before either records, exceeding the
/// budget by the number of concurrent instances. There is deliberately
/// no cross-instance locking.
///
/// A failing store never propagates to callers: reads fall back to
/// first-run state, writes keep counting in memory and report the
/// degradation through the `bool` they return.
pub struct QuotaTracker<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    config: QuotaConfig,
    entries: HashMap<String, QuotaEntry>,
}

impl<S: KvStore, C: Clock> QuotaTracker<S, C> {
    pub fn new(store: S, config: QuotaConfig, clock: C) -> Self {
        let entries = load_entries(&store);
        Self {
            store,
            clock,
            config,
            entries,
        }
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Whether a call to `identity` would stay within budget.
    ///
    /// A pure read: an expired entry makes this return true but is left
    /// in place — rollover is applied lazily by [`Self::record_success`].
    pub fn can_make_request(&self, identity: &str) -> Result<bool> {
        let budget = self.budget(identity)?;
        match self.live_entry(identity) {
            Some(entry) => Ok(entry.count < budget.limit),
            None => Ok(true),
        }
    }

    /// Record one successful upstream call.
    ///
    /// Strict contract: call this only after the upstream response
    /// confirmed success — failed or rejected calls must not consume
    /// quota. Returns whether the write-through reached the store; the
    /// in-memory count advances either way.
    pub fn record_success(&mut self, identity: &str) -> Result<bool> {
        let window_ms = self.budget(identity)?.window_ms;
        let now = self.clock.now_ms();
        let key = entry_key(identity);

        match self.entries.get_mut(&key) {
            Some(entry) if now <= entry.reset_at_ms => {
                entry.count += 1;
                entry.last_updated_ms = now;
            }
            _ => {
                // First call for this identity, or the window lapsed:
                // replace wholesale, never extend.
                self.entries.insert(
                    key,
                    QuotaEntry {
                        count: 1,
                        reset_at_ms: now + window_ms,
                        last_updated_ms: now,
                    },
                );
            }
        }

        Ok(self.persist())
    }

    /// Calls left in the current window; the full limit if no live entry.
    pub fn remaining_requests(&self, identity: &str) -> Result<u32> {
        let budget = self.budget(identity)?;
        match self.live_entry(identity) {
            Some(entry) => Ok(budget.limit.saturating_sub(entry.count)),
            None => Ok(budget.limit),
        }
    }

    /// When the current window expires, or `now + window` if none is live.
    pub fn reset_time(&self, identity: &str) -> Result<u64> {
        let window_ms = self.budget(identity)?.window_ms;
        match self.live_entry(identity) {
            Some(entry) => Ok(entry.reset_at_ms),
            None => Ok(self.clock.now_ms() + window_ms),
        }
    }

    pub fn usage_stats(&self, identity: &str) -> Result<UsageStats> {
        let total = self.budget(identity)?.limit;
        let remaining = self.remaining_requests(identity)?;
        let used = total - remaining;
        let percentage = (f64::from(used) / f64::from(total) * 100.0 * 100.0).round() / 100.0;

        Ok(UsageStats {
            used,
            remaining,
            total,
            reset_at_ms: self.reset_time(identity)?,
            percentage,
        })
    }

    /// Administrative escape hatch: drop one identity's entry, or all of
    /// them. Returns whether the cleared state was persisted.
    pub fn reset_limits(&mut self, identity: Option<&str>) -> Result<bool> {
        match identity {
            Some(id) => {
                self.budget(id)?;
                self.entries.remove(&entry_key(id));
            }
            None => self.entries.clear(),
        }
        Ok(self.persist())
    }

    /// Whether a live-or-expired entry has gone over an hour without an
    /// update. Absent entries are never stale.
    pub fn is_data_stale(&self, identity: &str) -> Result<bool> {
        self.budget(identity)?;
        match self.entries.get(&entry_key(identity)) {
            Some(entry) => {
                Ok(self.clock.now_ms().saturating_sub(entry.last_updated_ms) > STALE_AFTER_MS)
            }
            None => Ok(false),
        }
    }

    fn budget(&self, identity: &str) -> Result<&crate::config::ApiBudget> {
        self.config
            .budget(identity)
            .ok_or_else(|| StoreError::UnknownIdentity(identity.to_string()))
    }

    /// The identity's entry, if one exists and its window has not lapsed.
    fn live_entry(&self, identity: &str) -> Option<&QuotaEntry> {
        self.entries
            .get(&entry_key(identity))
            .filter(|entry| self.clock.now_ms() <= entry.reset_at_ms)
    }

    /// Write-through of the full entry map. Failures are logged and
    /// reported, not raised — availability beats strict quota accuracy.
    fn persist(&mut self) -> bool {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize rate limit state: {e}");
                return false;
            }
        };
        match self.store.set(RATE_LIMITS_KEY, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to persist rate limit state: {e}");
                false
            }
        }
    }
}

fn entry_key(identity: &str) -> String {
    format!("{identity}_requests")
}

/// Load persisted entries. A missing key, an unreadable store, and
/// corrupt JSON all mean the same thing: first run, empty map.
fn load_entries(store: &impl KvStore) -> HashMap<String, QuotaEntry> {
    let raw = match store.get(RATE_LIMITS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HashMap::new(),
        Err(e) => {
            tracing::warn!("failed to load rate limit state: {e}");
            return HashMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("discarding corrupt rate limit state: {e}");
            HashMap::new()
        }
    }
}
