use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use alert_trade_core::{
    BrokerGateway, OrderAck, OrderRequest, OrderStatusReport, OrderType,
};

use crate::client::RestClient;

/// `BrokerGateway` over the broker's REST endpoints. Transport-level
/// retrying is the caller's concern; this layer reports each call's outcome
/// once.
pub struct RestBrokerGateway {
    client: RestClient,
}

impl RestBrokerGateway {
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }

    fn expect_ok(response: &serde_json::Value, what: &str) -> Result<()> {
        let status = response
            .get("status")
            .and_then(|s| s.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing status in {what} response"))?;
        if status != "ok" {
            let error = response
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error");
            anyhow::bail!("{what} failed: {error}");
        }
        Ok(())
    }
}

#[async_trait]
impl BrokerGateway for RestBrokerGateway {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let body = json!({
            "ticker": order.ticker,
            "side": order.signal.to_string(),
            "quantity": order.quantity,
            "order_type": match order.order_type {
                OrderType::Market => "market",
                OrderType::Limit => "limit",
            },
            "limit_price": order.limit_price.map(|p| p.to_string()),
            "stop_loss": order.stop_loss_price.to_string(),
            "target": order.target_price.to_string(),
            "client_id": order.client_id,
            "account_id": order.account_id,
        });

        let response = self.client.post("/orders", body).await?;
        Self::expect_ok(&response, "order placement")?;

        let order_id = response
            .get("order_id")
            .and_then(|o| o.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing order_id in placement response"))?
            .to_string();

        debug!(%order_id, ticker = %order.ticker, "order placed");
        Ok(OrderAck { order_id })
    }

    async fn order_status(&self, order_id: &str) -> Result<OrderStatusReport> {
        let response = self.client.get(&format!("/orders/{order_id}")).await?;

        let status = response
            .get("status")
            .and_then(|s| s.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing status in order status response"))?
            .to_string();
        let price = response
            .get("price")
            .and_then(|p| p.as_str())
            .and_then(|p| Decimal::from_str_exact(p).ok())
            .unwrap_or(Decimal::ZERO);
        let average_price = response
            .get("average_price")
            .and_then(|p| p.as_str())
            .and_then(|p| Decimal::from_str_exact(p).ok());

        Ok(OrderStatusReport {
            status,
            price,
            average_price,
        })
    }

    async fn update_target_price(&self, order_id: &str, new_price: Decimal) -> Result<()> {
        let body = json!({ "new_price": new_price.to_string() });
        let response = self
            .client
            .post(&format!("/orders/{order_id}/target"), body)
            .await?;
        Self::expect_ok(&response, "target price update")
    }

    async fn update_stop_loss(&self, order_id: &str, new_price: Decimal) -> Result<()> {
        let body = json!({ "new_price": new_price.to_string() });
        let response = self
            .client
            .post(&format!("/orders/{order_id}/stoploss"), body)
            .await?;
        Self::expect_ok(&response, "stop-loss update")
    }
}
