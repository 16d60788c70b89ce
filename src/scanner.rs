//! Opportunity scanner
//!
//! Scores a fixed priority universe on momentum, volume, and trend, keeps
//! the analyses clearing the score threshold, and attaches a generated
//! trade plan to each. Scoring is closed-form over the candle series; the
//! only I/O is fetching candles through the market engine.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::arguments::is_debug_scanner_enabled;
use crate::config::ScannerConfig;
use crate::logger::{self, LogTag};
use crate::market::models::Candle;
use crate::market::MarketDataEngine;

/// Priority watchlist scanned in order
pub const PRIORITY_TICKERS: [&str; 21] = [
    "NVDA", "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA",
    "AMD", "AVGO", "TSM", "INTC", "QCOM", "COIN", "PLTR",
    "SNOW", "CRWD", "NET", "DDOG", "SQ", "SHOP", "UBER",
];

/// Weights for the composite score
const MOMENTUM_WEIGHT: f64 = 0.4;
const VOLUME_WEIGHT: f64 = 0.3;
const TREND_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Scored analysis of one ticker
#[derive(Debug, Clone, Serialize)]
pub struct StockAnalysis {
    pub ticker: String,
    pub price: f64,
    pub price_change: f64,
    pub trend: Trend,
    pub score: f64,
    pub momentum_score: f64,
    pub volume_score: f64,
    pub trend_score: f64,
    pub trade_plan: Option<TradePlan>,
}

/// Generated entry/stop/target for a scored opportunity
#[derive(Debug, Clone, Serialize)]
pub struct TradePlan {
    pub direction: &'static str,
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward: f64,
    pub timeframe: &'static str,
    pub position_size: &'static str,
    pub confidence: &'static str,
}

pub struct OpportunityScanner {
    engine: Arc<MarketDataEngine>,
    config: ScannerConfig,
}

impl OpportunityScanner {
    pub fn new(engine: Arc<MarketDataEngine>, config: ScannerConfig) -> Self {
        Self { engine, config }
    }

    /// Scan the priority universe for the best current opportunities
    ///
    /// Analyzes the leading slice of the universe, keeps analyses at or
    /// above the score threshold, and returns the top results sorted by
    /// score.
    pub async fn scan_best_opportunities(&self) -> Vec<StockAnalysis> {
        let mut results = Vec::new();
        let slice = self.config.universe_slice.min(PRIORITY_TICKERS.len());

        for ticker in &PRIORITY_TICKERS[..slice] {
            let series = match self.engine.get_candles(ticker).await {
                Ok(series) => series,
                Err(e) => {
                    logger::warning(
                        LogTag::Scanner,
                        &format!("Skipping {}: {}", ticker, e),
                    );
                    continue;
                }
            };

            let mut analysis = analyze_candles(ticker, &series.candles);
            if is_debug_scanner_enabled() {
                logger::debug(
                    LogTag::Scanner,
                    &format!(
                        "{}: score {:.1} (m {:.0} / v {:.0} / t {:.0})",
                        ticker,
                        analysis.score,
                        analysis.momentum_score,
                        analysis.volume_score,
                        analysis.trend_score
                    ),
                );
            }

            if analysis.score >= self.config.min_score {
                analysis.trade_plan = Some(generate_trade_plan(&analysis));
                results.push(analysis);
            }

            // Pace requests to the data sources
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(self.config.max_results);
        results
    }
}

/// Score one ticker's candle series
pub fn analyze_candles(ticker: &str, candles: &[Candle]) -> StockAnalysis {
    if candles.is_empty() {
        return StockAnalysis {
            ticker: ticker.to_string(),
            price: 0.0,
            price_change: 0.0,
            trend: Trend::Neutral,
            score: 0.0,
            momentum_score: 0.0,
            volume_score: 0.0,
            trend_score: 0.0,
            trade_plan: None,
        };
    }

    let price = candles[candles.len() - 1].close;
    let momentum_score = momentum_score(candles);
    let volume_score = volume_score(candles);
    let trend_score = trend_score(candles);

    let score = momentum_score * MOMENTUM_WEIGHT
        + volume_score * VOLUME_WEIGHT
        + trend_score * TREND_WEIGHT;

    let (price_change, trend) = if candles.len() >= 2 {
        let prev = candles[candles.len() - 2].close;
        let change = (price - prev) / prev * 100.0;
        let trend = if change > 0.0 { Trend::Bullish } else { Trend::Bearish };
        (change, trend)
    } else {
        (0.0, Trend::Neutral)
    };

    StockAnalysis {
        ticker: ticker.to_string(),
        price,
        price_change,
        trend,
        score,
        momentum_score,
        volume_score,
        trend_score,
        trade_plan: None,
    }
}

/// Momentum: 5-day percent change scaled around a neutral 50
fn momentum_score(candles: &[Candle]) -> f64 {
    if candles.len() < 10 {
        return 50.0;
    }

    let last = candles[candles.len() - 1].close;
    let five_back = candles[candles.len() - 5].close;
    let recent_change = if five_back != 0.0 {
        (last - five_back) / five_back * 100.0
    } else {
        0.0
    };

    (50.0 + recent_change * 2.0).clamp(0.0, 100.0)
}

/// Volume: recent 5-day average against the 20-day baseline, banded
fn volume_score(candles: &[Candle]) -> f64 {
    if candles.len() < 10 {
        return 50.0;
    }

    let mean = |slice: &[Candle]| {
        slice.iter().map(|c| c.volume as f64).sum::<f64>() / slice.len() as f64
    };

    let recent = mean(&candles[candles.len() - 5..]);
    let baseline = if candles.len() >= 20 {
        mean(&candles[candles.len() - 20..])
    } else {
        recent
    };

    if baseline == 0.0 {
        return 50.0;
    }

    let ratio = recent / baseline;
    if ratio > 2.0 {
        90.0
    } else if ratio > 1.5 {
        75.0
    } else if ratio > 1.0 {
        60.0
    } else {
        40.0
    }
}

/// Trend: last price against the 10- and 20-day moving averages
fn trend_score(candles: &[Candle]) -> f64 {
    if candles.len() < 20 {
        return 50.0;
    }

    let mean = |slice: &[Candle]| {
        slice.iter().map(|c| c.close).sum::<f64>() / slice.len() as f64
    };

    let last = candles[candles.len() - 1].close;
    let ma_short = mean(&candles[candles.len() - 10..]);
    let ma_long = mean(&candles[candles.len() - 20..]);

    if last > ma_short && ma_short > ma_long {
        85.0 // Strong uptrend
    } else if last < ma_short && ma_short < ma_long {
        15.0 // Strong downtrend
    } else {
        50.0 // Sideways
    }
}

/// Build the trade plan for a scored analysis
pub fn generate_trade_plan(analysis: &StockAnalysis) -> TradePlan {
    let entry = analysis.price;

    let (direction, stop_loss, target) = match analysis.trend {
        Trend::Bullish | Trend::Neutral => ("LONG", entry * 0.93, entry * 1.21),
        Trend::Bearish => ("SHORT", entry * 1.07, entry * 0.79),
    };

    let risk = (entry - stop_loss).abs();
    let reward = (target - entry).abs();
    let risk_reward = if risk > 0.0 { reward / risk } else { 0.0 };

    let (confidence, position_size) = if analysis.score >= 85.0 {
        ("VERY HIGH", "10-15%")
    } else if analysis.score >= 75.0 {
        ("HIGH", "7-10%")
    } else {
        ("MODERATE", "5-7%")
    };

    TradePlan {
        direction,
        entry: round2(entry),
        stop_loss: round2(stop_loss),
        target: round2(target),
        risk_reward: round2(risk_reward),
        timeframe: "3-10 days",
        position_size,
        confidence,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a series with linear closes and constant volume
    fn candles_from_closes(closes: &[f64], volume: u64) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: 1_700_000_000 + i as i64 * 86_400,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume,
            })
            .collect()
    }

    #[test]
    fn test_short_series_scores_neutral() {
        let candles = candles_from_closes(&[100.0, 101.0, 102.0], 1000);
        let analysis = analyze_candles("NVDA", &candles);
        assert_eq!(analysis.momentum_score, 50.0);
        assert_eq!(analysis.volume_score, 50.0);
        assert_eq!(analysis.trend_score, 50.0);
        assert_eq!(analysis.score, 50.0);
    }

    #[test]
    fn test_empty_series_scores_zero() {
        let analysis = analyze_candles("NVDA", &[]);
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.trend, Trend::Neutral);
    }

    #[test]
    fn test_uptrend_scores_high() {
        // Steady climb: strong momentum and trend
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes, 1000);

        let analysis = analyze_candles("NVDA", &candles);
        assert_eq!(analysis.trend, Trend::Bullish);
        assert_eq!(analysis.trend_score, 85.0);
        assert!(analysis.momentum_score > 50.0);
        assert!(analysis.score > 60.0);
    }

    #[test]
    fn test_downtrend_scores_low() {
        let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes, 1000);

        let analysis = analyze_candles("NVDA", &candles);
        assert_eq!(analysis.trend, Trend::Bearish);
        assert_eq!(analysis.trend_score, 15.0);
        assert!(analysis.momentum_score < 50.0);
    }

    #[test]
    fn test_momentum_clamped() {
        // +100% in five days pushes far past the clamp
        let mut closes = vec![100.0; 25];
        closes.extend([100.0, 120.0, 150.0, 180.0, 200.0]);
        let candles = candles_from_closes(&closes, 1000);
        assert_eq!(momentum_score(&candles), 100.0);
    }

    #[test]
    fn test_volume_bands() {
        // Flat closes, volume spike in the last five days
        let mut candles = candles_from_closes(&vec![100.0; 20], 1000);
        for candle in candles.iter_mut().rev().take(5) {
            candle.volume = 10_000;
        }
        assert_eq!(volume_score(&candles), 90.0);

        let flat = candles_from_closes(&vec![100.0; 20], 1000);
        assert_eq!(volume_score(&flat), 40.0);
    }

    #[test]
    fn test_trade_plan_long_arithmetic() {
        let mut analysis = analyze_candles("NVDA", &candles_from_closes(&[99.0, 100.0], 1000));
        analysis.score = 90.0;
        let plan = generate_trade_plan(&analysis);

        assert_eq!(plan.direction, "LONG");
        assert_eq!(plan.entry, 100.0);
        assert_eq!(plan.stop_loss, 93.0);
        assert_eq!(plan.target, 121.0);
        assert_eq!(plan.risk_reward, 3.0);
        assert_eq!(plan.confidence, "VERY HIGH");
        assert_eq!(plan.position_size, "10-15%");
    }

    #[test]
    fn test_trade_plan_short_arithmetic() {
        let mut analysis = analyze_candles("NVDA", &candles_from_closes(&[101.0, 100.0], 1000));
        analysis.score = 78.0;
        let plan = generate_trade_plan(&analysis);

        assert_eq!(plan.direction, "SHORT");
        assert_eq!(plan.stop_loss, 107.0);
        assert_eq!(plan.target, 79.0);
        assert_eq!(plan.risk_reward, 3.0);
        assert_eq!(plan.confidence, "HIGH");
    }

    #[test]
    fn test_confidence_banding() {
        let mut analysis = analyze_candles("NVDA", &candles_from_closes(&[99.0, 100.0], 1000));

        analysis.score = 74.9;
        assert_eq!(generate_trade_plan(&analysis).confidence, "MODERATE");
        analysis.score = 75.0;
        assert_eq!(generate_trade_plan(&analysis).confidence, "HIGH");
        analysis.score = 85.0;
        assert_eq!(generate_trade_plan(&analysis).confidence, "VERY HIGH");
    }

    #[tokio::test]
    async fn test_scan_respects_max_results() {
        use crate::database::test_database;
        use crate::secrets::Secrets;

        let mut market = crate::config::Config::default().market;
        market.store_endpoint = "http://127.0.0.1:1".to_string();
        market.quote_provider_url = "http://127.0.0.1:1".to_string();
        market.request_timeout_secs = 1;
        let engine =
            MarketDataEngine::new(test_database(), market, &Secrets::default()).unwrap();

        let config = ScannerConfig {
            max_results: 2,
            min_score: 0.0,
            universe_slice: 3,
        };
        let scanner = OpportunityScanner::new(Arc::new(engine), config);

        let results = scanner.scan_best_opportunities().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert!(results.iter().all(|a| a.trade_plan.is_some()));
    }
}
