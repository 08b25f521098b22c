//! Startup validation for account configuration.
//!
//! Runs once against the loaded [`AppConfig`] before any component trusts
//! it. The zero-risk check exists because of a real regression: an account
//! configured with `risk_on_capital = 0` silently sized every order to zero
//! quantity regardless of capital, and every alert was rejected without any
//! hint that the config was the cause.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::{AccountConfig, AppConfig};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("account has empty account_id or client_id")]
    MissingIdentity,
    #[error("duplicate account_id {0}")]
    DuplicateAccountId(String),
    #[error("account {0}: risk_on_capital must be positive for active accounts")]
    NonPositiveRiskOnCapital(String),
    #[error("account {0}: leverage must be at least 1")]
    InvalidLeverage(String),
    #[error("account {0}: available_funds must not be negative")]
    NegativeFunds(String),
    #[error("account {0}: stop_loss_pct must be a fraction in (0, 1)")]
    InvalidStopLossPct(String),
    #[error("account {0}: target_pct must be a fraction in (0, 1)")]
    InvalidTargetPct(String),
    #[error("account {0}: rebase_threshold_pct must not be negative")]
    NegativeRebaseThreshold(String),
    #[error("account {0}: min_order_value exceeds max_order_value")]
    InvertedOrderValueBounds(String),
    #[error("account {0}: max_position_size_pct must be in (0, 100]")]
    InvalidMaxPositionSize(String),
    #[error("account {0}: limit_buffer_pct must not be negative")]
    NegativeLimitBuffer(String),
    #[error("broker requests_per_second must be positive")]
    ZeroRateLimit,
    #[error("rebase max_poll_attempts must be positive")]
    ZeroPollAttempts,
}

/// Validates one account snapshot. Inactive accounts only need a wellformed
/// identity; every other rule applies to active accounts, which are the ones
/// the sizing engine will be trusted with.
///
/// # Errors
/// Returns the first violated rule.
pub fn validate_account(cfg: &AccountConfig) -> Result<(), ConfigError> {
    if cfg.account_id.is_empty() || cfg.client_id.is_empty() {
        return Err(ConfigError::MissingIdentity);
    }
    if !cfg.is_active {
        return Ok(());
    }

    let id = || cfg.account_id.clone();

    if cfg.risk_on_capital <= Decimal::ZERO {
        return Err(ConfigError::NonPositiveRiskOnCapital(id()));
    }
    if cfg.leverage < Decimal::ONE {
        return Err(ConfigError::InvalidLeverage(id()));
    }
    if cfg.available_funds < Decimal::ZERO {
        return Err(ConfigError::NegativeFunds(id()));
    }
    if cfg.stop_loss_pct <= Decimal::ZERO || cfg.stop_loss_pct >= Decimal::ONE {
        return Err(ConfigError::InvalidStopLossPct(id()));
    }
    if cfg.target_pct <= Decimal::ZERO || cfg.target_pct >= Decimal::ONE {
        return Err(ConfigError::InvalidTargetPct(id()));
    }
    if cfg.rebase_threshold_pct < Decimal::ZERO {
        return Err(ConfigError::NegativeRebaseThreshold(id()));
    }
    if cfg.min_order_value > cfg.max_order_value {
        return Err(ConfigError::InvertedOrderValueBounds(id()));
    }
    if cfg.max_position_size_pct <= Decimal::ZERO
        || cfg.max_position_size_pct > Decimal::ONE_HUNDRED
    {
        return Err(ConfigError::InvalidMaxPositionSize(id()));
    }
    if cfg.limit_buffer_pct < Decimal::ZERO {
        return Err(ConfigError::NegativeLimitBuffer(id()));
    }

    Ok(())
}

/// Validates the whole application config, including cross-account rules.
///
/// # Errors
/// Returns the first violated rule.
pub fn validate_app_config(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.broker.requests_per_second == 0 {
        return Err(ConfigError::ZeroRateLimit);
    }
    if cfg.rebase.max_poll_attempts == 0 {
        return Err(ConfigError::ZeroPollAttempts);
    }

    let mut seen = std::collections::HashSet::new();
    for account in &cfg.accounts {
        validate_account(account)?;
        if !seen.insert(account.account_id.as_str()) {
            return Err(ConfigError::DuplicateAccountId(account.account_id.clone()));
        }
    }

    Ok(())
}
