//! Subscription tiers, feature gating, and billing
//!
//! The plan catalog lives in [`plans`]; this module answers the questions
//! the rest of the platform asks about it: can this tier use that feature,
//! is this subscription still active, which tier should a heavy user move
//! to. Billing webhook processing lives in [`billing`].

pub mod billing;
pub mod plans;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use billing::BillingProcessor;
pub use plans::{all_plans, get_plan, Plan, PlanLimits, TIER_ORDER};

/// Usage counters consulted for upgrade recommendations
#[derive(Debug, Clone, Default)]
pub struct UsageStats {
    pub alerts_used: u64,
    pub scans_used: u64,
    pub api_calls_used: u64,
}

/// Outcome of comparing two plans
#[derive(Debug, Clone, Serialize)]
pub struct SavingsEstimate {
    pub monthly_savings: f64,
    pub yearly_savings: f64,
    pub new_features: Vec<String>,
}

/// Approximate monetary value assigned to each feature when estimating
/// upgrade savings
const FEATURE_VALUE_USD: f64 = 20.0;

/// Usage fraction at which an upgrade is suggested
const UPGRADE_PRESSURE: f64 = 0.8;

/// Check if a tier can access a named feature
///
/// Unknown feature names default to allowed; only features explicitly
/// mapped to a plan limit are gated.
pub fn can_access_feature(tier: &str, feature: &str) -> bool {
    let Some(plan) = get_plan(tier) else {
        return false;
    };

    match feature {
        "real_time_data" => plan.limits.real_time_data,
        "advanced_indicators" | "portfolio_optimizer" => plan.limits.advanced_indicators,
        "ai_predictions" => plan.limits.ai_predictions,
        "whale_detection" => plan.limits.whale_detection,
        "automated_trading" => plan.limits.automated_trading,
        "api_access" => plan.limits.api_access,
        _ => true,
    }
}

/// Whether a subscription is still active
///
/// The free tier never expires; paid tiers are active until their expiry
/// timestamp. An unparseable or missing expiry counts as inactive.
pub fn is_subscription_active(tier: &str, expiry: Option<&str>) -> bool {
    if tier == "free" {
        return true;
    }

    let Some(expiry) = expiry else {
        return false;
    };

    match DateTime::parse_from_rfc3339(expiry) {
        Ok(expiry) => Utc::now() < expiry,
        Err(_) => false,
    }
}

/// Recommend a plan upgrade based on usage
///
/// Returns the next tier up when any tracked counter sits at 80% or more of
/// its limit, or None when the current tier still fits (or is already the
/// top tier).
pub fn get_upgrade_recommendation(current_tier: &str, usage: &UsageStats) -> Option<&'static str> {
    let plan = get_plan(current_tier)?;

    let pressured = |used: u64, limit: u64| (used as f64) >= (limit as f64) * UPGRADE_PRESSURE;

    let needs_upgrade = pressured(usage.alerts_used, plan.limits.max_alerts)
        || pressured(usage.scans_used, plan.limits.daily_scans)
        || pressured(usage.api_calls_used, plan.limits.api_calls_per_day);

    if !needs_upgrade {
        return None;
    }

    let current_index = TIER_ORDER.iter().position(|t| *t == current_tier)?;
    TIER_ORDER.get(current_index + 1).copied()
}

/// Estimate savings from upgrading between two tiers
///
/// New features are valued at a flat per-feature rate and offset against
/// the price difference; negative results clamp to zero.
pub fn calculate_savings(current_tier: &str, target_tier: &str) -> Option<SavingsEstimate> {
    let current = get_plan(current_tier)?;
    let target = get_plan(target_tier)?;

    let new_features: Vec<String> = target
        .features
        .iter()
        .filter(|f| !current.features.contains(f))
        .map(|f| f.to_string())
        .collect();

    let feature_value = new_features.len() as f64 * FEATURE_VALUE_USD;
    let monthly = feature_value - (target.price_monthly - current.price_monthly);
    let yearly = feature_value * 12.0 - (target.price_yearly - current.price_yearly);

    Some(SavingsEstimate {
        monthly_savings: monthly.max(0.0),
        yearly_savings: yearly.max(0.0),
        new_features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_feature_gating_matrix() {
        assert!(!can_access_feature("free", "real_time_data"));
        assert!(can_access_feature("basic", "real_time_data"));
        assert!(!can_access_feature("basic", "whale_detection"));
        assert!(can_access_feature("premium", "whale_detection"));
        assert!(!can_access_feature("premium", "automated_trading"));
        assert!(can_access_feature("ultimate", "automated_trading"));

        // Unknown features default open; unknown tiers default closed
        assert!(can_access_feature("free", "dark_mode"));
        assert!(!can_access_feature("platinum", "dark_mode"));
    }

    #[test]
    fn test_free_tier_always_active() {
        assert!(is_subscription_active("free", None));
        assert!(is_subscription_active("free", Some("garbage")));
    }

    #[test]
    fn test_paid_tier_expiry() {
        let future = (Utc::now() + Duration::days(5)).to_rfc3339();
        let past = (Utc::now() - Duration::days(5)).to_rfc3339();

        assert!(is_subscription_active("premium", Some(&future)));
        assert!(!is_subscription_active("premium", Some(&past)));
        assert!(!is_subscription_active("premium", None));
        assert!(!is_subscription_active("premium", Some("not-a-date")));
    }

    #[test]
    fn test_upgrade_recommendation_boundary() {
        // Free tier: 5 alerts max, pressure at 4 (80%)
        let relaxed = UsageStats {
            alerts_used: 3,
            ..Default::default()
        };
        assert_eq!(get_upgrade_recommendation("free", &relaxed), None);

        let pressured = UsageStats {
            alerts_used: 4,
            ..Default::default()
        };
        assert_eq!(get_upgrade_recommendation("free", &pressured), Some("basic"));

        // Top tier has nowhere to go
        let maxed = UsageStats {
            api_calls_used: 10000,
            ..Default::default()
        };
        assert_eq!(get_upgrade_recommendation("ultimate", &maxed), None);
    }

    #[test]
    fn test_savings_clamped_at_zero() {
        let estimate = calculate_savings("free", "basic").unwrap();
        assert!(estimate.monthly_savings >= 0.0);
        assert!(estimate.yearly_savings >= 0.0);
        assert!(!estimate.new_features.is_empty());

        assert!(calculate_savings("free", "platinum").is_none());
    }
}
