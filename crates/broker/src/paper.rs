//! In-process paper broker.
//!
//! Makes zero network calls; every order is held in memory and "fills" at a
//! scripted price after a scripted number of in-transit status polls. Used by
//! the CLI simulation mode and the cross-crate integration tests to exercise
//! the dispatcher and the rebase queue against realistic broker behavior.

use anyhow::{bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use alert_trade_core::{BrokerGateway, OrderAck, OrderRequest, OrderStatusReport};

/// One mutation call recorded by the paper broker, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperCall {
    Place { order_id: String, ticker: String },
    Status { order_id: String },
    UpdateTarget { order_id: String, price: Decimal },
    UpdateStopLoss { order_id: String, price: Decimal },
}

#[derive(Default)]
struct PaperState {
    next_order_id: u64,
    orders: HashMap<String, OrderRequest>,
    polls: HashMap<String, u32>,
}

pub struct PaperBroker {
    fill_price: Decimal,
    /// Status polls answered "in transit" before the fill appears.
    transit_polls: u32,
    fail_placement: bool,
    fail_updates: bool,
    state: Mutex<PaperState>,
    calls: Mutex<Vec<PaperCall>>,
}

impl PaperBroker {
    /// A broker whose orders all fill at `fill_price` on the first status
    /// poll.
    #[must_use]
    pub fn new(fill_price: Decimal) -> Self {
        Self {
            fill_price,
            transit_polls: 0,
            fail_placement: false,
            fail_updates: false,
            state: Mutex::new(PaperState::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers the first `polls` status requests with an in-transit report.
    #[must_use]
    pub fn with_transit_polls(mut self, polls: u32) -> Self {
        self.transit_polls = polls;
        self
    }

    /// Every placement call fails.
    #[must_use]
    pub fn failing_placement(mut self) -> Self {
        self.fail_placement = true;
        self
    }

    /// Every target/stop-loss update call fails.
    #[must_use]
    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// All calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<PaperCall> {
        self.calls.lock().expect("paper broker lock").clone()
    }

    /// The order request behind an order id, if one was placed.
    #[must_use]
    pub fn order(&self, order_id: &str) -> Option<OrderRequest> {
        self.state
            .lock()
            .expect("paper broker lock")
            .orders
            .get(order_id)
            .cloned()
    }

    fn record(&self, call: PaperCall) {
        self.calls.lock().expect("paper broker lock").push(call);
    }
}

#[async_trait]
impl BrokerGateway for PaperBroker {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        if self.fail_placement {
            bail!("paper broker configured to reject placements");
        }

        let order_id = {
            let mut state = self.state.lock().expect("paper broker lock");
            state.next_order_id += 1;
            let order_id = format!("PAPER-{}", state.next_order_id);
            state.orders.insert(order_id.clone(), order.clone());
            order_id
        };

        debug!(%order_id, ticker = %order.ticker, quantity = order.quantity, "paper order placed");
        self.record(PaperCall::Place {
            order_id: order_id.clone(),
            ticker: order.ticker.clone(),
        });
        Ok(OrderAck { order_id })
    }

    async fn order_status(&self, order_id: &str) -> Result<OrderStatusReport> {
        self.record(PaperCall::Status {
            order_id: order_id.to_string(),
        });

        let mut state = self.state.lock().expect("paper broker lock");
        if !state.orders.contains_key(order_id) {
            bail!("unknown order {order_id}");
        }
        let polls = state.polls.entry(order_id.to_string()).or_insert(0);
        *polls += 1;

        if *polls <= self.transit_polls {
            Ok(OrderStatusReport {
                status: "in transit".to_string(),
                price: Decimal::ZERO,
                average_price: None,
            })
        } else {
            Ok(OrderStatusReport {
                status: "complete".to_string(),
                price: Decimal::ZERO,
                average_price: Some(self.fill_price),
            })
        }
    }

    async fn update_target_price(&self, order_id: &str, new_price: Decimal) -> Result<()> {
        self.record(PaperCall::UpdateTarget {
            order_id: order_id.to_string(),
            price: new_price,
        });
        if self.fail_updates {
            bail!("paper broker configured to reject updates");
        }
        Ok(())
    }

    async fn update_stop_loss(&self, order_id: &str, new_price: Decimal) -> Result<()> {
        self.record(PaperCall::UpdateStopLoss {
            order_id: order_id.to_string(),
            price: new_price,
        });
        if self.fail_updates {
            bail!("paper broker configured to reject updates");
        }
        Ok(())
    }
}
