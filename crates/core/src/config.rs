use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order pricing style for an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// Immutable per-account trading parameters. Built once at startup by the
/// settings loader and treated as a read-only snapshot per invocation; the
/// core never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub account_id: String,
    pub client_id: String,

    /// Funds available for new positions.
    pub available_funds: Decimal,
    /// Broker margin multiplier; capital committed is order value / leverage.
    pub leverage: Decimal,
    /// Multiplier on available funds determining how much capital a
    /// calculation may use. Must be positive for active accounts.
    pub risk_on_capital: Decimal,

    /// Smallest leveraged value the account will accept.
    pub min_order_value: Decimal,
    /// Largest leveraged value the account will accept.
    pub max_order_value: Decimal,
    /// Upper bound on position size as a percent of available funds,
    /// validated into (0, 100] at startup. Sizing enforces only the fixed
    /// 100% capital check; this tighter per-account cap is not yet applied.
    pub max_position_size_pct: Decimal,

    /// Stop-loss distance from entry, as a fraction (0.0075 = 0.75%).
    pub stop_loss_pct: Decimal,
    /// Target distance from entry, as a fraction (0.01 = 1%).
    pub target_pct: Decimal,

    /// Whether confirmed fills get their stop-loss/target recomputed from
    /// the actual entry price.
    pub rebase_enabled: bool,
    /// Minimum alert-vs-fill deviation, in percent, before a rebase runs.
    pub rebase_threshold_pct: Decimal,

    /// When false, a ticker already ordered today excludes this account.
    pub allow_duplicate_tickers: bool,

    pub order_type: OrderType,
    /// For limit accounts: how far past the alert price to place the limit
    /// (buy above, sell below), as a fraction.
    pub limit_buffer_pct: Decimal,

    pub is_active: bool,
}

/// Timing and retry budget for the rebase queue worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebaseSettings {
    /// Order-status polls per task before giving up.
    pub max_poll_attempts: u32,
    /// Sleep between poll attempts, in milliseconds.
    pub poll_interval_ms: u64,
    /// Sleep after each completed task before starting the next.
    pub inter_task_delay_ms: u64,
}

impl Default for RebaseSettings {
    fn default() -> Self {
        Self {
            max_poll_attempts: 5,
            poll_interval_ms: 3000,
            inter_task_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub api_url: String,
    /// Token-bucket refill rate for the REST client.
    pub requests_per_second: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.broker.example".to_string(),
            requests_per_second: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub rebase: RebaseSettings,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}
