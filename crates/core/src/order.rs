use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::alert::Signal;
use crate::config::OrderType;

/// A fully-priced order ready for the broker gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub ticker: String,
    pub signal: Signal,
    pub quantity: u64,
    pub order_type: OrderType,
    /// Only present for limit orders.
    pub limit_price: Option<Decimal>,
    pub stop_loss_price: Decimal,
    pub target_price: Decimal,
    pub client_id: String,
    pub account_id: String,
}

/// Broker acknowledgement of an accepted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: String,
}

/// Snapshot of a live order as reported by the broker. An order that is
/// accepted but not yet executed ("in transit") carries no usable price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStatusReport {
    pub status: String,
    pub price: Decimal,
    pub average_price: Option<Decimal>,
}

impl OrderStatusReport {
    /// The confirmed execution price, if any. `average_price` takes
    /// precedence over `price` when present and positive.
    #[must_use]
    pub fn fill_price(&self) -> Option<Decimal> {
        match self.average_price {
            Some(avg) if avg > Decimal::ZERO => Some(avg),
            _ if self.price > Decimal::ZERO => Some(self.price),
            _ => None,
        }
    }
}
