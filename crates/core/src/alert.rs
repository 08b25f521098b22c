use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction carried by an incoming alert. `Sell` opens a short:
/// profit is below entry, loss protection above.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Which webhook origin produced an alert. Parsing of the webhook payloads
/// themselves happens upstream; the core only keeps the label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertSource {
    Screener,
    Chart,
}

/// An incoming trading alert. Immutable once constructed; one alert fans out
/// into one position calculation and order attempt per eligible account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub ticker: String,
    pub signal: Signal,
    /// Price that triggered the alert. Must be positive.
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Strategy label attached by the alert source.
    pub strategy: String,
    pub source: AlertSource,
}

impl Alert {
    #[must_use]
    pub fn new(
        ticker: impl Into<String>,
        signal: Signal,
        price: Decimal,
        strategy: impl Into<String>,
        source: AlertSource,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            signal,
            price,
            timestamp: Utc::now(),
            strategy: strategy.into(),
            source,
        }
    }
}
