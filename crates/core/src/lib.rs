pub mod alert;
pub mod config;
pub mod config_loader;
pub mod order;
pub mod sizing;
pub mod traits;
pub mod validation;

pub use alert::{Alert, AlertSource, Signal};
pub use config::{AccountConfig, AppConfig, BrokerConfig, OrderType, RebaseSettings};
pub use config_loader::ConfigLoader;
pub use order::{OrderAck, OrderRequest, OrderStatusReport};
pub use sizing::{compute_position, risk_prices, PositionCalculation, RejectReason};
pub use traits::{AccountStore, BrokerGateway, DuplicateOrderCache};
pub use validation::{validate_account, validate_app_config, ConfigError};
