use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{AdjustmentPolicy, CarSpaceTiers, MarketMovementRates, PercentageBounds};
use crate::valuation::domain::AttributeKey;

/// Asset classes with their own default rate tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[default]
    Residential,
    Commercial,
    Rural,
    Specialised,
}

impl AssetClass {
    pub const fn label(self) -> &'static str {
        match self {
            AssetClass::Residential => "residential",
            AssetClass::Commercial => "commercial",
            AssetClass::Rural => "rural",
            AssetClass::Specialised => "specialised",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset class '{0}'")]
pub struct UnknownAssetClass(pub String);

impl FromStr for AssetClass {
    type Err = UnknownAssetClass;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "residential" | "res" => Ok(Self::Residential),
            "commercial" | "industrial" => Ok(Self::Commercial),
            "rural" | "agricultural" => Ok(Self::Rural),
            "specialised" | "specialized" => Ok(Self::Specialised),
            other => Err(UnknownAssetClass(other.to_string())),
        }
    }
}

pub(super) fn preset(asset_class: AssetClass) -> AdjustmentPolicy {
    match asset_class {
        AssetClass::Residential => residential(),
        AssetClass::Commercial => commercial(),
        AssetClass::Rural => rural(),
        AssetClass::Specialised => specialised(),
    }
}

fn residential() -> AdjustmentPolicy {
    AdjustmentPolicy {
        asset_class: AssetClass::Residential,
        applicable: None,
        land_rate_per_sqm: Some(450.0),
        building_rate_per_sqm: Some(1_500.0),
        bedroom_rate: Some(15_000.0),
        bathroom_rate: Some(10_000.0),
        car_space_tiers: Some(CarSpaceTiers {
            full_rate: 2_000.0,
            full_spaces: 2,
            reduced_rate: 1_500.0,
            reduced_spaces: 3,
            residual_rate: 1_000.0,
        }),
        age_rate_per_year: Some(0.5),
        age_bounds: Some(PercentageBounds {
            min: -10.0,
            max: 10.0,
        }),
        condition_step: Some(5.0),
        location_step: Some(10.0),
        position_step: Some(5.0),
        market_movement: Some(MarketMovementRates {
            declining_monthly: -0.5,
            stable_monthly: 0.0,
            improving_monthly: 0.5,
        }),
    }
}

fn commercial() -> AdjustmentPolicy {
    AdjustmentPolicy {
        asset_class: AssetClass::Commercial,
        applicable: Some(excluding(&[AttributeKey::Bedrooms, AttributeKey::Bathrooms])),
        land_rate_per_sqm: Some(600.0),
        building_rate_per_sqm: Some(2_500.0),
        car_space_tiers: Some(CarSpaceTiers {
            full_rate: 5_000.0,
            full_spaces: 2,
            reduced_rate: 4_000.0,
            reduced_spaces: 3,
            residual_rate: 3_000.0,
        }),
        age_rate_per_year: Some(0.75),
        age_bounds: Some(PercentageBounds {
            min: -15.0,
            max: 15.0,
        }),
        condition_step: Some(7.5),
        position_step: Some(7.5),
        ..residential()
    }
}

fn rural() -> AdjustmentPolicy {
    AdjustmentPolicy {
        asset_class: AssetClass::Rural,
        applicable: Some(excluding(&[AttributeKey::Position])),
        // $25,000 per hectare.
        land_rate_per_sqm: Some(2.5),
        building_rate_per_sqm: Some(1_200.0),
        car_space_tiers: Some(CarSpaceTiers {
            full_rate: 1_000.0,
            full_spaces: 2,
            reduced_rate: 750.0,
            reduced_spaces: 3,
            residual_rate: 500.0,
        }),
        location_step: Some(7.5),
        market_movement: Some(MarketMovementRates {
            declining_monthly: -0.3,
            stable_monthly: 0.0,
            improving_monthly: 0.3,
        }),
        ..residential()
    }
}

fn specialised() -> AdjustmentPolicy {
    AdjustmentPolicy {
        asset_class: AssetClass::Specialised,
        applicable: Some(excluding(&[AttributeKey::Bedrooms, AttributeKey::Bathrooms])),
        building_rate_per_sqm: Some(3_000.0),
        age_rate_per_year: Some(1.0),
        age_bounds: Some(PercentageBounds {
            min: -20.0,
            max: 20.0,
        }),
        condition_step: Some(10.0),
        ..commercial()
    }
}

fn excluding(keys: &[AttributeKey]) -> BTreeSet<AttributeKey> {
    AttributeKey::ALL
        .into_iter()
        .filter(|key| !keys.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_asset_class_aliases() {
        assert_eq!("Agricultural".parse(), Ok(AssetClass::Rural));
        assert_eq!(" specialized ".parse(), Ok(AssetClass::Specialised));
        assert_eq!(
            "hotel".parse::<AssetClass>(),
            Err(UnknownAssetClass("hotel".to_string()))
        );
    }

    #[test]
    fn presets_are_complete() {
        for class in [
            AssetClass::Residential,
            AssetClass::Commercial,
            AssetClass::Rural,
            AssetClass::Specialised,
        ] {
            let policy = preset(class);
            assert_eq!(policy.asset_class, class);
            assert!(policy.land_rate_per_sqm.is_some());
            assert!(policy.car_space_tiers.is_some());
            assert!(policy.market_movement.is_some());
        }
    }

    #[test]
    fn commercial_preset_skips_residential_counts() {
        let applicable = preset(AssetClass::Commercial)
            .applicable
            .expect("commercial preset limits the catalogue");
        assert!(!applicable.contains(&AttributeKey::Bedrooms));
        assert!(!applicable.contains(&AttributeKey::Bathrooms));
        assert!(applicable.contains(&AttributeKey::CarSpaces));
    }
}
