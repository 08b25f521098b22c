use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

use alert_trade_core::DuplicateOrderCache;

/// Day-scoped in-memory duplicate-order cache. Entries from previous days
/// never match, so the guard resets naturally at midnight UTC without any
/// cleanup pass. Suitable for a single-process deployment; a shared store
/// can replace it behind the same trait.
#[derive(Default)]
pub struct MemoryDuplicateCache {
    entries: Mutex<HashSet<(NaiveDate, String, String)>>,
}

impl MemoryDuplicateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DuplicateOrderCache for MemoryDuplicateCache {
    async fn was_ticker_ordered_today(&self, ticker: &str, account_id: &str) -> Result<bool> {
        let today = Utc::now().date_naive();
        Ok(self
            .entries
            .lock()
            .expect("duplicate cache lock")
            .contains(&(today, ticker.to_string(), account_id.to_string())))
    }

    async fn record_order(&self, ticker: &str, account_id: &str) -> Result<()> {
        let today = Utc::now().date_naive();
        self.entries
            .lock()
            .expect("duplicate cache lock")
            .insert((today, ticker.to_string(), account_id.to_string()));
        Ok(())
    }
}
