//! Live data engine with flat-file store integration
//!
//! Fetch order for candles: database cache, flat-file store, quote
//! provider, synthetic series. Quotes skip the store (it only carries
//! daily files) and go cache, provider, fixed fallback. Every successful
//! network fetch lands in the cache; synthetic data never does.

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::arguments::is_debug_market_enabled;
use crate::config::MarketConfig;
use crate::database::Database;
use crate::errors::{MarketError, PlatformError};
use crate::logger::{self, LogTag};
use crate::market::client::{HttpClient, RateLimiter};
use crate::market::models::{Candle, CandleSeries, Quote, QuoteSource};
use crate::secrets::Secrets;

/// Cache kinds used as the second half of cache ids
const KIND_CANDLES: &str = "candles";
const KIND_QUOTE: &str = "quote";

/// Price used when every source is down
const FALLBACK_PRICE: f64 = 100.0;
const FALLBACK_VOLUME: u64 = 1_000_000;

pub struct MarketDataEngine {
    db: Database,
    config: MarketConfig,
    http: HttpClient,
    limiter: RateLimiter,
    store_access_key: Option<String>,
    store_secret_key: Option<String>,
}

impl MarketDataEngine {
    pub fn new(db: Database, config: MarketConfig, secrets: &Secrets) -> Result<Self, PlatformError> {
        let http = HttpClient::new(config.request_timeout_secs)?;
        let limiter = RateLimiter::new(config.max_requests_per_minute);

        Ok(Self {
            db,
            store_access_key: secrets.store_access_key(),
            store_secret_key: secrets.store_secret_key(),
            config,
            http,
            limiter,
        })
    }

    /// Get a month of daily candles for a ticker
    pub async fn get_candles(&self, ticker: &str) -> Result<CandleSeries, PlatformError> {
        let ticker = ticker.to_uppercase();

        if let Ok(Some(cached)) = self.db.get_cached_market_data(&ticker, KIND_CANDLES) {
            if let Ok(candles) = serde_json::from_value::<Vec<Candle>>(cached) {
                return Ok(CandleSeries {
                    ticker,
                    candles,
                    source: QuoteSource::Cache,
                });
            }
        }

        match self.fetch_store_candles(&ticker).await {
            Ok(candles) if !candles.is_empty() => {
                self.cache_candles(&ticker, &candles);
                return Ok(CandleSeries {
                    ticker,
                    candles,
                    source: QuoteSource::FlatFile,
                });
            }
            Ok(_) => {}
            Err(e) => {
                if is_debug_market_enabled() {
                    logger::debug(LogTag::Market, &format!("Store fetch failed: {}", e));
                }
            }
        }

        match self.fetch_provider_candles(&ticker).await {
            Ok(candles) if !candles.is_empty() => {
                self.cache_candles(&ticker, &candles);
                return Ok(CandleSeries {
                    ticker,
                    candles,
                    source: QuoteSource::Provider,
                });
            }
            Ok(_) => {}
            Err(e) => {
                logger::warning(
                    LogTag::Market,
                    &format!("Provider fetch failed for {}: {}", ticker, e),
                );
            }
        }

        // Last resort keeps the dashboard alive when everything is down
        Ok(CandleSeries {
            candles: synthetic_candles(30),
            ticker,
            source: QuoteSource::Fallback,
        })
    }

    /// Get a real-time quote for a ticker
    pub async fn get_quote(&self, ticker: &str) -> Quote {
        let ticker = ticker.to_uppercase();

        if let Ok(Some(cached)) = self.db.get_cached_market_data(&ticker, KIND_QUOTE) {
            if let Ok(mut quote) = serde_json::from_value::<Quote>(cached) {
                quote.source = QuoteSource::Cache;
                return quote;
            }
        }

        match self.fetch_provider_quote(&ticker).await {
            Ok(quote) => {
                if let Ok(value) = serde_json::to_value(&quote) {
                    let _ = self.db.cache_market_data(
                        &ticker,
                        KIND_QUOTE,
                        &value,
                        self.config.quote_cache_ttl_minutes,
                    );
                }
                quote
            }
            Err(e) => {
                if is_debug_market_enabled() {
                    logger::debug(LogTag::Market, &format!("Quote fetch failed: {}", e));
                }
                Quote {
                    ticker,
                    price: FALLBACK_PRICE,
                    volume: FALLBACK_VOLUME,
                    timestamp: Utc::now(),
                    source: QuoteSource::Fallback,
                }
            }
        }
    }

    /// Current price only, for alert evaluation
    pub async fn get_price(&self, ticker: &str) -> f64 {
        self.get_quote(ticker).await.price
    }

    fn cache_candles(&self, ticker: &str, candles: &[Candle]) {
        if let Ok(value) = serde_json::to_value(candles) {
            let _ = self.db.cache_market_data(
                ticker,
                KIND_CANDLES,
                &value,
                self.config.candle_cache_ttl_minutes,
            );
        }
    }

    /// Fetch the per-ticker daily CSV from the flat-file store
    async fn fetch_store_candles(&self, ticker: &str) -> Result<Vec<Candle>, PlatformError> {
        let key = format!("stocks/{}/daily.csv", ticker);
        let url = format!(
            "{}/{}/{}",
            self.config.store_endpoint.trim_end_matches('/'),
            self.config.store_bucket,
            key
        );

        let _guard = self.limiter.acquire().await?;

        let mut request = self.http.client().get(&url);
        if let Some(access_key) = &self.store_access_key {
            request = request.header("X-Access-Key", access_key);
        }
        if let Some(secret_key) = &self.store_secret_key {
            request = request.header("X-Secret-Key", secret_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(PlatformError::Market(MarketError::StoreFetchFailed {
                ticker: ticker.to_string(),
                key,
                error: format!("HTTP {}", response.status()),
            }));
        }

        let body = response.bytes().await?;
        parse_candle_csv(&body)
    }

    /// Fetch a month of daily candles from the quote provider
    async fn fetch_provider_candles(&self, ticker: &str) -> Result<Vec<Candle>, PlatformError> {
        let url = format!(
            "{}/{}?range=1mo&interval=1d",
            self.config.quote_provider_url.trim_end_matches('/'),
            ticker
        );

        let _guard = self.limiter.acquire().await?;
        let response = self.http.client().get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PlatformError::network_error(format!(
                "HTTP {} from provider for {}",
                response.status(),
                ticker
            )));
        }

        let body: serde_json::Value = response.json().await?;
        parse_provider_chart(&body)
    }

    /// Fetch the latest intraday bar from the quote provider
    async fn fetch_provider_quote(&self, ticker: &str) -> Result<Quote, PlatformError> {
        let url = format!(
            "{}/{}?range=1d&interval=1m",
            self.config.quote_provider_url.trim_end_matches('/'),
            ticker
        );

        let _guard = self.limiter.acquire().await?;
        let response = self.http.client().get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PlatformError::network_error(format!(
                "HTTP {} from provider for {}",
                response.status(),
                ticker
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let candles = parse_provider_chart(&body)?;
        let last = candles
            .last()
            .ok_or_else(|| PlatformError::Market(MarketError::NoData {
                ticker: ticker.to_string(),
            }))?;

        Ok(Quote {
            ticker: ticker.to_string(),
            price: last.close,
            volume: last.volume,
            timestamp: Utc::now(),
            source: QuoteSource::Provider,
        })
    }
}

/// Parse a flat-file store daily CSV (timestamp,open,high,low,close,volume)
pub(crate) fn parse_candle_csv(data: &[u8]) -> Result<Vec<Candle>, PlatformError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut candles = Vec::new();
    for record in reader.deserialize::<Candle>() {
        let candle = record
            .map_err(|e| PlatformError::parse_error("candle CSV", e.to_string()))?;
        candles.push(candle);
    }
    Ok(candles)
}

/// Parse the provider's chart JSON into candles
///
/// Rows with null fields (halted minutes, partial bars) are skipped.
pub(crate) fn parse_provider_chart(body: &serde_json::Value) -> Result<Vec<Candle>, PlatformError> {
    let result = &body["chart"]["result"][0];
    if result.is_null() {
        return Err(PlatformError::parse_error(
            "provider chart",
            "missing chart.result".to_string(),
        ));
    }

    let timestamps = result["timestamp"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let quote = &result["indicators"]["quote"][0];

    let field = |name: &str, i: usize| quote[name][i].as_f64();

    let mut candles = Vec::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(timestamp) = ts.as_i64() else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field("open", i),
            field("high", i),
            field("low", i),
            field("close", i),
        ) else {
            continue;
        };

        candles.push(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume: quote["volume"][i].as_u64().unwrap_or(0),
        });
    }

    Ok(candles)
}

/// Random-walk series used when every data source is unavailable
pub(crate) fn synthetic_candles(days: usize) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let mut close = FALLBACK_PRICE;
    let now = Utc::now();

    (0..days)
        .map(|i| {
            let drift: f64 = rng.gen_range(-2.0..2.0);
            close = (close + drift).max(1.0);
            let spread: f64 = rng.gen_range(0.5..5.0);

            Candle {
                timestamp: (now - ChronoDuration::days((days - i) as i64)).timestamp(),
                open: close - drift,
                high: close + spread,
                low: (close - spread).max(0.5),
                close,
                volume: rng.gen_range(1_000_000..10_000_000),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;

    fn offline_engine() -> MarketDataEngine {
        let mut config = crate::config::Config::default().market;
        // Nothing listens here; both sources fail fast
        config.store_endpoint = "http://127.0.0.1:1".to_string();
        config.quote_provider_url = "http://127.0.0.1:1".to_string();
        config.request_timeout_secs = 1;
        MarketDataEngine::new(test_database(), config, &Secrets::default()).unwrap()
    }

    #[test]
    fn test_parse_candle_csv() {
        let csv = b"timestamp,open,high,low,close,volume\n\
                    1700000000,10.0,12.0,9.5,11.0,1000\n\
                    1700086400,11.0,13.0,10.5,12.5,2000\n";
        let candles = parse_candle_csv(csv).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, 12.5);
        assert_eq!(candles[1].volume, 2000);
    }

    #[test]
    fn test_parse_candle_csv_rejects_garbage() {
        assert!(parse_candle_csv(b"timestamp,open\nnot,numbers\n").is_err());
    }

    #[test]
    fn test_parse_provider_chart() {
        let body = serde_json::json!({
            "chart": { "result": [{
                "timestamp": [1700000000i64, 1700086400i64, 1700172800i64],
                "indicators": { "quote": [{
                    "open":   [10.0, 11.0, null],
                    "high":   [12.0, 13.0, null],
                    "low":    [9.5, 10.5, null],
                    "close":  [11.0, 12.5, null],
                    "volume": [1000, 2000, null],
                }]}
            }]}
        });

        let candles = parse_provider_chart(&body).unwrap();
        // The null row is skipped
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 10.0);
        assert_eq!(candles[1].volume, 2000);
    }

    #[test]
    fn test_parse_provider_chart_missing_result() {
        let body = serde_json::json!({ "chart": { "error": "bad ticker" } });
        assert!(parse_provider_chart(&body).is_err());
    }

    #[test]
    fn test_synthetic_candles_shape() {
        let candles = synthetic_candles(30);
        assert_eq!(candles.len(), 30);
        for pair in candles.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
        for candle in &candles {
            assert!(candle.close >= 1.0);
            assert!(candle.low <= candle.high);
        }
    }

    #[tokio::test]
    async fn test_candles_fall_back_to_synthetic() {
        let engine = offline_engine();
        let series = engine.get_candles("nvda").await.unwrap();
        assert_eq!(series.ticker, "NVDA");
        assert_eq!(series.source, QuoteSource::Fallback);
        assert_eq!(series.candles.len(), 30);
    }

    #[tokio::test]
    async fn test_quote_falls_back_to_constant() {
        let engine = offline_engine();
        let quote = engine.get_quote("aapl").await;
        assert_eq!(quote.ticker, "AAPL");
        assert_eq!(quote.source, QuoteSource::Fallback);
        assert_eq!(quote.price, FALLBACK_PRICE);
    }
}
