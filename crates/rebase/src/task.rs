use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use alert_trade_core::{AccountConfig, Signal};

/// Lifecycle of a rebase task. Strict machine:
///
/// `Queued → Polling → { Skipped, Rebasing → { Rebased, RebaseFailed }, Abandoned }`
///
/// `Skipped`, `Rebased`, `RebaseFailed`, and `Abandoned` are terminal; a task
/// is removed from the queue on reaching any of them and is never retried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RebaseState {
    Queued,
    Polling,
    Rebasing,
    /// Fill deviated less than the account threshold; original prices stand.
    Skipped,
    /// Both broker updates succeeded.
    Rebased,
    /// Fill price obtained but an update call failed; original prices
    /// remain live at the broker, no rollback is attempted.
    RebaseFailed,
    /// Poll budget exhausted without a fill price.
    Abandoned,
}

impl RebaseState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Skipped | Self::Rebased | Self::RebaseFailed | Self::Abandoned
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RebaseError {
    #[error("no valid entry price after {attempts} attempts")]
    NoFillPrice { attempts: u32 },
    #[error("target price update failed: {0}")]
    TargetUpdateFailed(String),
    #[error("stop-loss update failed: {0}")]
    StopLossUpdateFailed(String),
}

/// Mutable work item owned exclusively by the rebase engine once enqueued.
/// `attempts_made` never exceeds the configured poll budget.
#[derive(Debug, Clone)]
pub struct RebaseTask {
    pub order_id: String,
    pub account: AccountConfig,
    pub original_alert_price: Decimal,
    pub signal: Signal,
    pub client_id: String,
    pub account_id: String,
    pub attempts_made: u32,
    pub state: RebaseState,
}

impl RebaseTask {
    #[must_use]
    pub fn new(
        order_id: String,
        account: AccountConfig,
        original_alert_price: Decimal,
        client_id: String,
        account_id: String,
        signal: Signal,
    ) -> Self {
        Self {
            order_id,
            account,
            original_alert_price,
            signal,
            client_id,
            account_id,
            attempts_made: 0,
            state: RebaseState::Queued,
        }
    }
}

/// Terminal report for one processed task, emitted on the engine's outcome
/// channel. Old prices are always the alert-price basis the order was placed
/// with; new prices are present only when a rebase was attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebaseOutcome {
    pub order_id: String,
    pub account_id: String,
    pub client_id: String,
    pub state: RebaseState,
    pub attempts_made: u32,
    pub original_alert_price: Decimal,
    pub fill_price: Option<Decimal>,
    pub deviation_pct: Option<Decimal>,
    pub stop_loss_price: Decimal,
    pub target_price: Decimal,
    pub new_stop_loss: Option<Decimal>,
    pub new_target: Option<Decimal>,
    pub error: Option<String>,
}
