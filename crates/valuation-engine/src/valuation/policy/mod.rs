mod presets;

pub use presets::{AssetClass, UnknownAssetClass};

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{AttributeKey, MarketTrend, Money};

/// Weighting policy: the rate tables the calculator converts differences with.
///
/// Every rate is optional so callers can supply a partial policy; gaps fall back to the
/// preset for `asset_class` and are flagged on the affected adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentPolicy {
    pub asset_class: AssetClass,
    /// Attributes this policy adjusts for. `None` defers to the asset-class preset.
    pub applicable: Option<BTreeSet<AttributeKey>>,
    pub land_rate_per_sqm: Option<Money>,
    pub building_rate_per_sqm: Option<Money>,
    pub bedroom_rate: Option<Money>,
    pub bathroom_rate: Option<Money>,
    pub car_space_tiers: Option<CarSpaceTiers>,
    /// Percent per year of year-built difference.
    pub age_rate_per_year: Option<f64>,
    pub age_bounds: Option<PercentageBounds>,
    /// Percent per ordinal step.
    pub condition_step: Option<f64>,
    pub location_step: Option<f64>,
    pub position_step: Option<f64>,
    pub market_movement: Option<MarketMovementRates>,
}

impl AdjustmentPolicy {
    /// Residential defaults shipped with the engine.
    pub fn standard() -> Self {
        Self::for_asset_class(AssetClass::Residential)
    }

    pub fn for_asset_class(asset_class: AssetClass) -> Self {
        presets::preset(asset_class)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyLoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PolicyLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

/// Diminishing per-space rates for car parking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarSpaceTiers {
    pub full_rate: Money,
    pub full_spaces: u32,
    pub reduced_rate: Money,
    pub reduced_spaces: u32,
    pub residual_rate: Money,
}

impl CarSpaceTiers {
    /// Dollar value of `spaces` additional spaces, walking the tiers in order.
    pub fn value_of(&self, spaces: u32) -> Money {
        let full = spaces.min(self.full_spaces);
        let reduced = spaces.saturating_sub(full).min(self.reduced_spaces);
        let residual = spaces.saturating_sub(full + reduced);

        f64::from(full) * self.full_rate
            + f64::from(reduced) * self.reduced_rate
            + f64::from(residual) * self.residual_rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentageBounds {
    pub min: f64,
    pub max: f64,
}

impl PercentageBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(low, high)
    }
}

/// Monthly market movement, in percent, for each trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketMovementRates {
    pub declining_monthly: f64,
    pub stable_monthly: f64,
    pub improving_monthly: f64,
}

impl MarketMovementRates {
    pub fn monthly_rate(&self, trend: MarketTrend) -> f64 {
        match trend {
            MarketTrend::Declining => self.declining_monthly,
            MarketTrend::Stable => self.stable_monthly,
            MarketTrend::Improving => self.improving_monthly,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyLoadError {
    #[error("failed to read adjustment policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid adjustment policy JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Policy values that must be finite throughout before the engine uses them.
pub(crate) trait PolicyValue: Copy {
    fn is_usable(&self) -> bool;
}

impl PolicyValue for f64 {
    fn is_usable(&self) -> bool {
        self.is_finite()
    }
}

impl PolicyValue for CarSpaceTiers {
    fn is_usable(&self) -> bool {
        self.full_rate.is_finite()
            && self.reduced_rate.is_finite()
            && self.residual_rate.is_finite()
    }
}

impl PolicyValue for PercentageBounds {
    fn is_usable(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl PolicyValue for MarketMovementRates {
    fn is_usable(&self) -> bool {
        self.declining_monthly.is_finite()
            && self.stable_monthly.is_finite()
            && self.improving_monthly.is_finite()
    }
}

/// A rate looked up for one calculation, remembering whether it was a fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rate<T> {
    pub value: T,
    pub policy_gap: bool,
}

/// Caller policy layered over its asset-class preset.
pub(crate) struct PolicyView<'a> {
    policy: &'a AdjustmentPolicy,
    fallback: &'a AdjustmentPolicy,
}

impl<'a> PolicyView<'a> {
    pub(crate) fn new(policy: &'a AdjustmentPolicy, fallback: &'a AdjustmentPolicy) -> Self {
        Self { policy, fallback }
    }

    /// A policy without its own `applicable` set inherits the preset's.
    pub(crate) fn applies_to(&self, attribute: AttributeKey) -> bool {
        self.policy
            .applicable
            .as_ref()
            .or(self.fallback.applicable.as_ref())
            .map(|keys| keys.contains(&attribute))
            .unwrap_or(true)
    }

    /// Caller rate when present and finite, else the preset's, flagged as a gap.
    pub(crate) fn rate<T, F>(&self, attribute: AttributeKey, pick: F) -> Option<Rate<T>>
    where
        T: PolicyValue,
        F: Fn(&AdjustmentPolicy) -> Option<T>,
    {
        match pick(self.policy) {
            Some(value) if value.is_usable() => {
                return Some(Rate {
                    value,
                    policy_gap: false,
                });
            }
            Some(_) => warn!(
                attribute = attribute.key(),
                "adjustment policy rate is not finite; ignoring it"
            ),
            None => {}
        }

        match pick(self.fallback).filter(PolicyValue::is_usable) {
            Some(value) => {
                warn!(
                    attribute = attribute.key(),
                    asset_class = self.policy.asset_class.label(),
                    "adjustment policy has no usable rate; using default"
                );
                Some(Rate {
                    value,
                    policy_gap: true,
                })
            }
            None => {
                warn!(
                    attribute = attribute.key(),
                    "no rate available in policy or defaults; attribute skipped"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_space_tiers_apply_in_order() {
        let tiers = AdjustmentPolicy::standard()
            .car_space_tiers
            .expect("standard policy has car tiers");

        assert_eq!(tiers.value_of(0), 0.0);
        assert_eq!(tiers.value_of(2), 4_000.0);
        assert_eq!(tiers.value_of(5), 8_500.0);
        assert_eq!(tiers.value_of(7), 10_500.0);
    }

    #[test]
    fn bounds_clamp_even_when_reversed() {
        let bounds = PercentageBounds {
            min: 10.0,
            max: -10.0,
        };
        assert_eq!(bounds.clamp(25.0), 10.0);
        assert_eq!(bounds.clamp(-25.0), -10.0);
        assert_eq!(bounds.clamp(3.5), 3.5);
    }

    #[test]
    fn partial_policy_json_leaves_gaps() {
        let policy = AdjustmentPolicy::from_reader(
            r#"{ "asset_class": "commercial", "land_rate_per_sqm": 520.0 }"#.as_bytes(),
        )
        .expect("partial policy parses");

        assert_eq!(policy.asset_class, AssetClass::Commercial);
        assert_eq!(policy.land_rate_per_sqm, Some(520.0));
        assert!(policy.bedroom_rate.is_none());
        assert!(policy.applicable.is_none());
    }

    #[test]
    fn view_inherits_preset_applicability() {
        let partial = AdjustmentPolicy {
            asset_class: AssetClass::Commercial,
            land_rate_per_sqm: Some(600.0),
            ..AdjustmentPolicy::default()
        };
        let fallback = AdjustmentPolicy::for_asset_class(AssetClass::Commercial);
        let view = PolicyView::new(&partial, &fallback);

        assert!(!view.applies_to(AttributeKey::Bedrooms));
        assert!(!view.applies_to(AttributeKey::Bathrooms));
        assert!(view.applies_to(AttributeKey::LandArea));

        let explicit = AdjustmentPolicy {
            applicable: Some([AttributeKey::Bedrooms].into_iter().collect()),
            ..partial
        };
        let view = PolicyView::new(&explicit, &fallback);
        assert!(view.applies_to(AttributeKey::Bedrooms));
        assert!(!view.applies_to(AttributeKey::LandArea));
    }

    #[test]
    fn view_replaces_non_finite_rates_with_defaults() {
        let custom = AdjustmentPolicy {
            bedroom_rate: Some(f64::NAN),
            age_bounds: Some(PercentageBounds {
                min: f64::NEG_INFINITY,
                max: 5.0,
            }),
            car_space_tiers: Some(CarSpaceTiers {
                full_rate: f64::INFINITY,
                full_spaces: 2,
                reduced_rate: 1_500.0,
                reduced_spaces: 3,
                residual_rate: 1_000.0,
            }),
            market_movement: Some(MarketMovementRates {
                declining_monthly: -0.5,
                stable_monthly: f64::NAN,
                improving_monthly: 0.5,
            }),
            ..AdjustmentPolicy::default()
        };
        let fallback = AdjustmentPolicy::standard();
        let view = PolicyView::new(&custom, &fallback);

        let bedrooms = view
            .rate(AttributeKey::Bedrooms, |policy| policy.bedroom_rate)
            .expect("bedroom rate falls back");
        assert_eq!(bedrooms.value, 15_000.0);
        assert!(bedrooms.policy_gap);

        let bounds = view
            .rate(AttributeKey::Age, |policy| policy.age_bounds)
            .expect("bounds fall back");
        assert_eq!(Some(bounds.value), fallback.age_bounds);
        assert!(bounds.policy_gap);

        let tiers = view
            .rate(AttributeKey::CarSpaces, |policy| policy.car_space_tiers)
            .expect("tiers fall back");
        assert_eq!(Some(tiers.value), fallback.car_space_tiers);

        let movement = view
            .rate(AttributeKey::MarketConditions, |policy| policy.market_movement)
            .expect("movement falls back");
        assert!(movement.policy_gap);
    }

    #[test]
    fn view_flags_fallback_rates() {
        let custom = AdjustmentPolicy {
            land_rate_per_sqm: Some(300.0),
            ..AdjustmentPolicy::default()
        };
        let fallback = AdjustmentPolicy::standard();
        let view = PolicyView::new(&custom, &fallback);

        let land = view
            .rate(AttributeKey::LandArea, |policy| policy.land_rate_per_sqm)
            .expect("land rate present");
        assert_eq!(land.value, 300.0);
        assert!(!land.policy_gap);

        let bedrooms = view
            .rate(AttributeKey::Bedrooms, |policy| policy.bedroom_rate)
            .expect("bedroom rate falls back");
        assert_eq!(Some(bedrooms.value), fallback.bedroom_rate);
        assert!(bedrooms.policy_gap);
    }
}
