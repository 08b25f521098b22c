use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use alert_trade_broker::PaperBroker;
use alert_trade_core::{
    compute_position, validate_app_config, AccountStore, Alert, AlertSource, AppConfig,
    ConfigLoader, Signal,
};
use alert_trade_dispatch::{DispatchStatus, MemoryDuplicateCache, OrderDispatcher};
use alert_trade_rebase::RebaseEngine;

/// Account source backed by the loaded config file. Inactive accounts are
/// filtered here so downstream code only ever sees tradeable accounts.
struct ConfigAccountStore {
    config: AppConfig,
}

#[async_trait]
impl AccountStore for ConfigAccountStore {
    async fn list_active_accounts(&self) -> Result<Vec<alert_trade_core::AccountConfig>> {
        Ok(self
            .config
            .accounts
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }
}

fn load(path: &str) -> Result<AppConfig> {
    let config = ConfigLoader::load_from(path)
        .with_context(|| format!("failed to load config from {path}"))?;
    validate_app_config(&config)?;
    Ok(config)
}

pub async fn validate(path: &str) -> Result<()> {
    let config = load(path)?;

    println!("Config OK: {path}");
    println!(
        "Broker: {} ({} req/s)",
        config.broker.api_url, config.broker.requests_per_second
    );
    println!(
        "Rebase: {} poll(s) every {}ms, {}ms between tasks",
        config.rebase.max_poll_attempts,
        config.rebase.poll_interval_ms,
        config.rebase.inter_task_delay_ms
    );
    println!("Accounts ({}):", config.accounts.len());
    for account in &config.accounts {
        println!(
            "  {:<12} {:<12} funds={:<12} risk={:<6} {}",
            account.account_id,
            account.client_id,
            account.available_funds,
            account.risk_on_capital,
            if account.is_active { "active" } else { "inactive" },
        );
    }

    Ok(())
}

pub async fn size(path: &str, ticker: &str, price: Decimal, signal: Signal) -> Result<()> {
    let store = ConfigAccountStore { config: load(path)? };
    let accounts = store.list_active_accounts().await?;

    println!("{ticker} {signal} @ {price}");
    for account in &accounts {
        let calc = compute_position(price, signal, account);
        if calc.can_place_order {
            println!(
                "  {:<12} qty={:<6} value={} ({}% of funds) sl={} tp={}",
                account.account_id,
                calc.quantity,
                calc.order_value.round_dp(2),
                calc.position_size_pct.round_dp(2),
                calc.stop_loss_price.round_dp(2),
                calc.target_price.round_dp(2),
            );
        } else {
            let reason = calc
                .reason
                .map_or_else(|| "rejected".to_string(), |r| r.to_string());
            println!("  {:<12} rejected: {reason}", account.account_id);
        }
    }

    Ok(())
}

pub async fn simulate(
    path: &str,
    ticker: &str,
    price: Decimal,
    signal: Signal,
    fill_price: Option<Decimal>,
    transit_polls: u32,
) -> Result<()> {
    let config = load(path)?;
    let store = ConfigAccountStore { config: config.clone() };
    let accounts = store.list_active_accounts().await?;

    let broker = Arc::new(
        PaperBroker::new(fill_price.unwrap_or(price)).with_transit_polls(transit_polls),
    );
    let rebase = RebaseEngine::spawn(broker.clone(), config.rebase.clone());
    let dispatcher = OrderDispatcher::new(
        broker,
        Arc::new(MemoryDuplicateCache::new()),
        rebase.clone(),
    );
    let mut outcomes = rebase.subscribe();

    let alert = Alert::new(ticker, signal, price, "manual", AlertSource::Chart);
    info!(ticker, %signal, %price, accounts = accounts.len(), "simulating alert");

    let results = dispatcher.dispatch(&alert, &accounts).await;

    let mut pending_rebases = 0usize;
    for result in &results {
        match &result.status {
            DispatchStatus::Placed { order_id, calculation } => {
                println!(
                    "{:<12} placed {order_id}: qty={} sl={} tp={}",
                    result.account_id,
                    calculation.quantity,
                    calculation.stop_loss_price.round_dp(2),
                    calculation.target_price.round_dp(2),
                );
                let rebases = accounts
                    .iter()
                    .any(|a| a.account_id == result.account_id && a.rebase_enabled);
                if rebases {
                    pending_rebases += 1;
                }
            }
            DispatchStatus::Rejected { reason } => {
                println!("{:<12} rejected: {reason}", result.account_id);
            }
            DispatchStatus::DuplicateSkipped => {
                println!("{:<12} skipped: already ordered today", result.account_id);
            }
            DispatchStatus::Inactive => {
                println!("{:<12} skipped: inactive", result.account_id);
            }
            DispatchStatus::Failed { error } => {
                println!("{:<12} failed: {error}", result.account_id);
            }
        }
    }

    for _ in 0..pending_rebases {
        let outcome = outcomes.recv().await?;
        let detail = match (outcome.new_target, outcome.new_stop_loss) {
            (Some(tp), Some(sl)) => {
                format!("tp {} -> {}, sl {} -> {}",
                    outcome.target_price.round_dp(2),
                    tp.round_dp(2),
                    outcome.stop_loss_price.round_dp(2),
                    sl.round_dp(2),
                )
            }
            _ => outcome
                .error
                .clone()
                .unwrap_or_else(|| "prices unchanged".to_string()),
        };
        println!(
            "{:<12} rebase {}: {:?} after {} poll(s), {detail}",
            outcome.account_id, outcome.order_id, outcome.state, outcome.attempts_made,
        );
    }

    rebase.shutdown();
    Ok(())
}
