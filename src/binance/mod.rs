//! Binance module - Spot price feed used as the allocation anchor

pub mod messages;
pub mod rest;

pub use rest::BinanceRestClient;
