pub mod client;
pub mod paper;
pub mod rest;

pub use client::RestClient;
pub use paper::{PaperBroker, PaperCall};
pub use rest::RestBrokerGateway;
