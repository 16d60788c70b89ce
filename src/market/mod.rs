//! Market data engine
//!
//! Candles and quotes come from a remote flat-file store first, then the
//! quote provider's JSON API, then a synthetic series as the last resort.
//! Results are cached in the database with per-kind TTLs so repeated
//! requests stay off the network.

pub mod client;
pub mod engine;
pub mod models;

pub use client::{HttpClient, RateLimiter};
pub use engine::MarketDataEngine;
pub use models::{Candle, Quote, QuoteSource};
