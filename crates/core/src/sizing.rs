//! Position sizing engine.
//!
//! Pure per-account capital allocation: given one alert price and one account
//! snapshot, decide how many shares to order and whether the order is
//! acceptable at all. No I/O, deterministic, rejection is a value rather than
//! an error.
//!
//! Sizing formula note: quantity is `floor(available_funds * risk_on_capital
//! / price)`. An alternative form, `floor(available_funds / price) *
//! risk_on_capital`, circulates in older sizing scripts and disagrees with
//! this one whenever `risk_on_capital` is fractional. The first form is the
//! authoritative one; see DESIGN.md.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alert::Signal;
use crate::config::AccountConfig;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Why a calculation refused to place an order. Always recoverable and
/// always human-readable; checks are evaluated in a fixed order and the
/// first failure wins.
#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RejectReason {
    #[error("alert price must be positive")]
    NonPositivePrice,
    #[error("stock price too high for available funds")]
    PriceExceedsFunds,
    #[error("leveraged value below minimum")]
    BelowMinOrderValue,
    #[error("leveraged value above maximum")]
    AboveMaxOrderValue,
    #[error("position size exceeds available capital")]
    ExceedsCapital,
}

/// Result of sizing one (alert, account) pair. Computed fresh on every alert
/// and never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionCalculation {
    /// Whole shares to order.
    pub quantity: u64,
    /// quantity * alert price.
    pub order_value: Decimal,
    /// Capital actually committed: order value / leverage.
    pub leveraged_value: Decimal,
    /// Leveraged value as a percent of available funds.
    pub position_size_pct: Decimal,
    pub stop_loss_price: Decimal,
    pub target_price: Decimal,
    pub can_place_order: bool,
    /// Present iff `can_place_order` is false.
    pub reason: Option<RejectReason>,
}

/// Direction-dependent stop-loss and target prices for an entry.
///
/// Buy: stop below entry, target above. Sell is a short, so the
/// inequalities invert: stop above entry, target below.
///
/// # Returns
/// `(stop_loss_price, target_price)`
#[must_use]
pub fn risk_prices(
    entry_price: Decimal,
    signal: Signal,
    stop_loss_pct: Decimal,
    target_pct: Decimal,
) -> (Decimal, Decimal) {
    match signal {
        Signal::Buy => (
            entry_price * (Decimal::ONE - stop_loss_pct),
            entry_price * (Decimal::ONE + target_pct),
        ),
        Signal::Sell => (
            entry_price * (Decimal::ONE + stop_loss_pct),
            entry_price * (Decimal::ONE - target_pct),
        ),
    }
}

/// Computes the position for one account against one alert price.
///
/// Pure and deterministic: repeated calls with identical inputs return
/// identical results. Expects a config that passed
/// [`crate::validation::validate_account`]; in particular
/// `risk_on_capital == 0` is representable here (it yields quantity 0 and a
/// rejection) but validation refuses it for active accounts up front.
#[must_use]
pub fn compute_position(
    alert_price: Decimal,
    signal: Signal,
    cfg: &AccountConfig,
) -> PositionCalculation {
    if alert_price <= Decimal::ZERO {
        return rejected(alert_price, signal, cfg, RejectReason::NonPositivePrice);
    }

    let risk_adjusted_funds = cfg.available_funds * cfg.risk_on_capital;
    let quantity = (risk_adjusted_funds / alert_price)
        .floor()
        .to_u64()
        .unwrap_or(0);

    let order_value = Decimal::from(quantity) * alert_price;
    let leveraged_value = if cfg.leverage > Decimal::ZERO {
        order_value / cfg.leverage
    } else {
        order_value
    };
    let position_size_pct = if cfg.available_funds > Decimal::ZERO {
        leveraged_value / cfg.available_funds * HUNDRED
    } else {
        Decimal::ZERO
    };

    let (stop_loss_price, target_price) =
        risk_prices(alert_price, signal, cfg.stop_loss_pct, cfg.target_pct);

    let reason = if quantity == 0 {
        Some(RejectReason::PriceExceedsFunds)
    } else if leveraged_value < cfg.min_order_value {
        Some(RejectReason::BelowMinOrderValue)
    } else if leveraged_value > cfg.max_order_value {
        Some(RejectReason::AboveMaxOrderValue)
    } else if position_size_pct > HUNDRED {
        Some(RejectReason::ExceedsCapital)
    } else {
        None
    };

    PositionCalculation {
        quantity,
        order_value,
        leveraged_value,
        position_size_pct,
        stop_loss_price,
        target_price,
        can_place_order: reason.is_none(),
        reason,
    }
}

fn rejected(
    alert_price: Decimal,
    signal: Signal,
    cfg: &AccountConfig,
    reason: RejectReason,
) -> PositionCalculation {
    let (stop_loss_price, target_price) =
        risk_prices(alert_price, signal, cfg.stop_loss_pct, cfg.target_pct);
    PositionCalculation {
        quantity: 0,
        order_value: Decimal::ZERO,
        leveraged_value: Decimal::ZERO,
        position_size_pct: Decimal::ZERO,
        stop_loss_price,
        target_price,
        can_place_order: false,
        reason: Some(reason),
    }
}
