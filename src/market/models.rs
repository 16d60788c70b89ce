use chrono::{DateTime, Utc};
use serde::{ Deserialize, Serialize };

/// One daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Where a quote or candle series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteSource {
    FlatFile,
    Provider,
    Cache,
    Fallback,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::FlatFile => "flat-file",
            QuoteSource::Provider => "provider",
            QuoteSource::Cache => "cache",
            QuoteSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A point-in-time price for a ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
    pub source: QuoteSource,
}

/// A candle series plus where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleSeries {
    pub ticker: String,
    pub candles: Vec<Candle>,
    pub source: QuoteSource,
}
