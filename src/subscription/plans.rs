//! Subscription plan catalog
//!
//! Four tiers with fixed pricing, feature lists, and hard limits. The
//! catalog is static; billing price ids map plans to the payment provider's
//! configuration.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Tier ids in upgrade order
pub const TIER_ORDER: [&str; 4] = ["free", "basic", "premium", "ultimate"];

/// Hard limits attached to a plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanLimits {
    pub max_portfolios: u64,
    pub max_alerts: u64,
    pub daily_scans: u64,
    pub api_calls_per_day: u64,
    /// Minutes between market data refreshes
    pub data_refresh_interval: u64,
    pub real_time_data: bool,
    pub advanced_indicators: bool,
    pub ai_predictions: bool,
    pub whale_detection: bool,
    pub automated_trading: bool,
    pub api_access: bool,
}

/// A subscription plan
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    pub price_monthly: f64,
    pub price_yearly: f64,
    pub price_id_monthly: &'static str,
    pub price_id_yearly: &'static str,
    pub features: Vec<&'static str>,
    pub limits: PlanLimits,
    pub trial_days: u64,
}

static PLANS: Lazy<Vec<Plan>> = Lazy::new(|| {
    vec![
        Plan {
            id: "free",
            name: "Free",
            price_monthly: 0.0,
            price_yearly: 0.0,
            price_id_monthly: "",
            price_id_yearly: "",
            features: vec![
                "Basic Dashboard",
                "Delayed Market Data (15-min)",
                "5 Stock Watchlist",
                "Basic Technical Analysis",
                "Email Support",
            ],
            limits: PlanLimits {
                max_portfolios: 1,
                max_alerts: 5,
                daily_scans: 3,
                api_calls_per_day: 100,
                data_refresh_interval: 15,
                real_time_data: false,
                advanced_indicators: false,
                ai_predictions: false,
                whale_detection: false,
                automated_trading: false,
                api_access: false,
            },
            trial_days: 0,
        },
        Plan {
            id: "basic",
            name: "Basic",
            price_monthly: 29.99,
            price_yearly: 299.99,
            price_id_monthly: "price_basic_monthly",
            price_id_yearly: "price_basic_yearly",
            features: vec![
                "Everything in Free",
                "Real-time Market Data",
                "Unlimited Watchlist",
                "AI Price Predictions",
                "Basic Trade Signals",
                "Email & SMS Alerts",
                "Priority Support",
            ],
            limits: PlanLimits {
                max_portfolios: 3,
                max_alerts: 20,
                daily_scans: 10,
                api_calls_per_day: 500,
                data_refresh_interval: 1,
                real_time_data: true,
                advanced_indicators: true,
                ai_predictions: true,
                whale_detection: false,
                automated_trading: false,
                api_access: false,
            },
            trial_days: 7,
        },
        Plan {
            id: "premium",
            name: "Premium",
            price_monthly: 99.99,
            price_yearly: 999.99,
            price_id_monthly: "price_premium_monthly",
            price_id_yearly: "price_premium_yearly",
            features: vec![
                "Everything in Basic",
                "Absolute Best Scanner",
                "Advanced AI Predictions",
                "Whale Detection",
                "Portfolio Optimizer",
                "Market Narratives",
                "Advanced Technical Indicators",
                "API Access",
                "Discord Community",
                "Weekly Strategy Reports",
            ],
            limits: PlanLimits {
                max_portfolios: 10,
                max_alerts: 100,
                daily_scans: 50,
                api_calls_per_day: 2000,
                data_refresh_interval: 1,
                real_time_data: true,
                advanced_indicators: true,
                ai_predictions: true,
                whale_detection: true,
                automated_trading: false,
                api_access: true,
            },
            trial_days: 14,
        },
        Plan {
            id: "ultimate",
            name: "Ultimate",
            price_monthly: 199.99,
            price_yearly: 1999.99,
            price_id_monthly: "price_ultimate_monthly",
            price_id_yearly: "price_ultimate_yearly",
            features: vec![
                "Everything in Premium",
                "Automated Trading",
                "Institutional Grade Data",
                "Custom Indicators",
                "Dedicated Account Manager",
                "Weekly 1-on-1 Strategy Sessions",
                "White Label Solutions",
                "Priority API Access",
                "24/7 Phone Support",
                "Custom Development",
            ],
            limits: PlanLimits {
                max_portfolios: 50,
                max_alerts: 500,
                daily_scans: 1000,
                api_calls_per_day: 10000,
                data_refresh_interval: 1,
                real_time_data: true,
                advanced_indicators: true,
                ai_predictions: true,
                whale_detection: true,
                automated_trading: true,
                api_access: true,
            },
            trial_days: 30,
        },
    ]
});

/// Get plan details by tier id
pub fn get_plan(plan_id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|p| p.id == plan_id)
}

/// All plans in upgrade order
pub fn all_plans() -> &'static [Plan] {
    &PLANS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_tier_order() {
        let ids: Vec<&str> = all_plans().iter().map(|p| p.id).collect();
        assert_eq!(ids, TIER_ORDER.to_vec());
    }

    #[test]
    fn test_get_plan() {
        assert_eq!(get_plan("premium").unwrap().name, "Premium");
        assert!(get_plan("platinum").is_none());
    }

    #[test]
    fn test_limits_grow_with_tier() {
        let mut last = 0;
        for plan in all_plans() {
            assert!(plan.limits.api_calls_per_day > last);
            last = plan.limits.api_calls_per_day;
        }
    }
}
