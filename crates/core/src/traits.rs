use crate::config::AccountConfig;
use crate::order::{OrderAck, OrderRequest, OrderStatusReport};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Contract with the external broker. Implementations are shared across
/// concurrent placement tasks, so methods take `&self`.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck>;

    /// Fetches the current state of a live order. The broker may report the
    /// order as still in transit, with no execution price yet.
    async fn order_status(&self, order_id: &str) -> Result<OrderStatusReport>;

    async fn update_target_price(&self, order_id: &str, new_price: Decimal) -> Result<()>;

    async fn update_stop_loss(&self, order_id: &str, new_price: Decimal) -> Result<()>;
}

/// Supplies per-account trading parameters at startup.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list_active_accounts(&self) -> Result<Vec<AccountConfig>>;
}

/// Tracks which tickers each account has already ordered today, backing the
/// duplicate-ticker guard in the dispatcher.
#[async_trait]
pub trait DuplicateOrderCache: Send + Sync {
    async fn was_ticker_ordered_today(&self, ticker: &str, account_id: &str) -> Result<bool>;

    async fn record_order(&self, ticker: &str, account_id: &str) -> Result<()>;
}
