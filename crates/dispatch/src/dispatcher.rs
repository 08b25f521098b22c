//! Order dispatcher.
//!
//! Fans one alert out across all eligible accounts. Placement calls run
//! concurrently with no ordering guarantee or dependency between accounts;
//! each account's outcome is collected independently and one failure never
//! cancels a sibling. Accepted orders for rebase-enabled accounts are handed
//! to the rebase queue before the aggregate result is returned.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use alert_trade_core::{
    compute_position, Alert, AccountConfig, BrokerGateway, DuplicateOrderCache, OrderRequest,
    OrderType, PositionCalculation, RejectReason, Signal,
};
use alert_trade_rebase::RebaseHandle;

/// Per-account outcome of a dispatch round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchResult {
    pub account_id: String,
    pub client_id: String,
    pub status: DispatchStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Broker accepted the order.
    Placed {
        order_id: String,
        calculation: PositionCalculation,
    },
    /// The sizing engine refused the order for this account.
    Rejected { reason: RejectReason },
    /// Account disallows duplicates and already ordered this ticker today.
    DuplicateSkipped,
    /// Account is not active; nothing was attempted.
    Inactive,
    /// Placement (or its duplicate-cache check) failed at the gateway.
    Failed { error: String },
}

pub struct OrderDispatcher {
    gateway: Arc<dyn BrokerGateway>,
    duplicate_cache: Arc<dyn DuplicateOrderCache>,
    rebase: RebaseHandle,
}

impl OrderDispatcher {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn BrokerGateway>,
        duplicate_cache: Arc<dyn DuplicateOrderCache>,
        rebase: RebaseHandle,
    ) -> Self {
        Self {
            gateway,
            duplicate_cache,
            rebase,
        }
    }

    /// Runs one alert against every account, returning one result per
    /// account examined. Results arrive in completion order, not account
    /// order.
    pub async fn dispatch(
        &self,
        alert: &Alert,
        accounts: &[AccountConfig],
    ) -> Vec<DispatchResult> {
        info!(
            ticker = %alert.ticker,
            signal = %alert.signal,
            price = %alert.price,
            accounts = accounts.len(),
            "dispatching alert"
        );

        let mut results = Vec::with_capacity(accounts.len());
        let mut placements: JoinSet<(AccountConfig, PositionCalculation, anyhow::Result<String>)> =
            JoinSet::new();
        // Identity of each spawned placement, so even a panicked task still
        // yields a result for its account.
        let mut spawned: HashMap<tokio::task::Id, (String, String)> = HashMap::new();

        for account in accounts {
            match self.screen_account(alert, account).await {
                Screen::Excluded(status) => {
                    results.push(DispatchResult {
                        account_id: account.account_id.clone(),
                        client_id: account.client_id.clone(),
                        status,
                    });
                }
                Screen::Eligible(calculation) => {
                    let order = build_order(alert, account, &calculation);
                    let gateway = Arc::clone(&self.gateway);
                    let account = account.clone();
                    let identity = (account.account_id.clone(), account.client_id.clone());
                    let handle = placements.spawn(async move {
                        let placed = gateway
                            .place_order(&order)
                            .await
                            .map(|ack| ack.order_id);
                        (account, calculation, placed)
                    });
                    spawned.insert(handle.id(), identity);
                }
            }
        }

        while let Some(joined) = placements.join_next().await {
            match joined {
                Ok((account, calculation, Ok(order_id))) => {
                    self.after_acceptance(alert, &account, &order_id).await;
                    results.push(DispatchResult {
                        account_id: account.account_id,
                        client_id: account.client_id,
                        status: DispatchStatus::Placed {
                            order_id,
                            calculation,
                        },
                    });
                }
                Ok((account, _, Err(e))) => {
                    warn!(
                        account_id = %account.account_id,
                        ticker = %alert.ticker,
                        "order placement failed: {e:#}"
                    );
                    results.push(DispatchResult {
                        account_id: account.account_id,
                        client_id: account.client_id,
                        status: DispatchStatus::Failed {
                            error: format!("{e:#}"),
                        },
                    });
                }
                Err(join_error) => {
                    // The panic is contained; the remaining accounts are
                    // unaffected.
                    if let Some((account_id, client_id)) = spawned.remove(&join_error.id()) {
                        error!(
                            account_id = %account_id,
                            "placement task panicked: {join_error}"
                        );
                        results.push(DispatchResult {
                            account_id,
                            client_id,
                            status: DispatchStatus::Failed {
                                error: format!("placement task panicked: {join_error}"),
                            },
                        });
                    } else {
                        error!("placement task panicked: {join_error}");
                    }
                }
            }
        }

        results
    }

    async fn screen_account(&self, alert: &Alert, account: &AccountConfig) -> Screen {
        if !account.is_active {
            return Screen::Excluded(DispatchStatus::Inactive);
        }

        if !account.allow_duplicate_tickers {
            match self
                .duplicate_cache
                .was_ticker_ordered_today(&alert.ticker, &account.account_id)
                .await
            {
                Ok(true) => {
                    info!(
                        account_id = %account.account_id,
                        ticker = %alert.ticker,
                        "ticker already ordered today, account excluded"
                    );
                    return Screen::Excluded(DispatchStatus::DuplicateSkipped);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        account_id = %account.account_id,
                        "duplicate-order check failed: {e:#}"
                    );
                    return Screen::Excluded(DispatchStatus::Failed {
                        error: format!("duplicate-order check failed: {e:#}"),
                    });
                }
            }
        }

        let calculation = compute_position(alert.price, alert.signal, account);
        if let Some(reason) = calculation.reason {
            info!(
                account_id = %account.account_id,
                ticker = %alert.ticker,
                %reason,
                "order rejected by sizing"
            );
            return Screen::Excluded(DispatchStatus::Rejected { reason });
        }

        Screen::Eligible(calculation)
    }

    /// Bookkeeping for a broker-accepted order: remember the ticker for the
    /// duplicate guard and queue the rebase if the account opted in.
    async fn after_acceptance(&self, alert: &Alert, account: &AccountConfig, order_id: &str) {
        if let Err(e) = self
            .duplicate_cache
            .record_order(&alert.ticker, &account.account_id)
            .await
        {
            // The order is already live; losing the cache entry only
            // weakens the duplicate guard for the rest of the day.
            warn!(
                account_id = %account.account_id,
                ticker = %alert.ticker,
                "failed to record order in duplicate cache: {e:#}"
            );
        }

        if account.rebase_enabled {
            self.rebase.enqueue(
                order_id.to_string(),
                account.clone(),
                alert.price,
                account.client_id.clone(),
                account.account_id.clone(),
                alert.signal,
            );
        }
    }
}

enum Screen {
    Eligible(PositionCalculation),
    Excluded(DispatchStatus),
}

fn build_order(
    alert: &Alert,
    account: &AccountConfig,
    calculation: &PositionCalculation,
) -> OrderRequest {
    let limit_price = match account.order_type {
        OrderType::Market => None,
        OrderType::Limit => Some(limit_price_for(
            alert.price,
            alert.signal,
            account.limit_buffer_pct,
        )),
    };

    OrderRequest {
        ticker: alert.ticker.clone(),
        signal: alert.signal,
        quantity: calculation.quantity,
        order_type: account.order_type,
        limit_price,
        stop_loss_price: calculation.stop_loss_price,
        target_price: calculation.target_price,
        client_id: account.client_id.clone(),
        account_id: account.account_id.clone(),
    }
}

/// A marketable limit: buys sit slightly above the alert price, sells
/// slightly below, so small moves between alert and placement still fill.
fn limit_price_for(alert_price: Decimal, signal: Signal, buffer_pct: Decimal) -> Decimal {
    match signal {
        Signal::Buy => alert_price * (Decimal::ONE + buffer_pct),
        Signal::Sell => alert_price * (Decimal::ONE - buffer_pct),
    }
}
