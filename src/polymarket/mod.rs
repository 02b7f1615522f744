//! Polymarket module - event page client, page parser and ladder discovery

pub mod discovery;
pub mod messages;
pub mod parser;
pub mod rest;

pub use rest::PolymarketWebClient;
