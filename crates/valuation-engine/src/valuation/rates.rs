use serde::{Deserialize, Serialize};

use super::domain::{Measurement, Money, PropertyFeatures};

/// Share of price attributed to land when backing out land and improvement rates.
///
/// A rule-of-thumb default, not a valuation method; callers should supply their own
/// share through [`LandImprovementSplit::with_land_share`] when they have one.
pub const DEFAULT_LAND_SHARE: f64 = 0.70;

/// A derived rate, or an explicit marker that the denominator was missing or zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRate {
    Applicable(f64),
    NotApplicable,
}

impl UnitRate {
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if !numerator.is_finite() || !denominator.is_finite() || denominator <= 0.0 {
            return UnitRate::NotApplicable;
        }

        let value = numerator / denominator;
        if value.is_finite() {
            UnitRate::Applicable(value)
        } else {
            UnitRate::NotApplicable
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            UnitRate::Applicable(value) => Some(value),
            UnitRate::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        matches!(self, UnitRate::Applicable(_))
    }
}

/// Price per square metre of `area`, whatever unit it was captured in.
pub fn rate_per_area(price: Money, area: Option<&Measurement>) -> UnitRate {
    match area {
        Some(measurement) if measurement.is_usable() => {
            UnitRate::ratio(price, measurement.in_square_metres())
        }
        _ => UnitRate::NotApplicable,
    }
}

pub fn rate_per_bedroom(price: Money, bedrooms: Option<u32>) -> UnitRate {
    match bedrooms {
        Some(count) => UnitRate::ratio(price, f64::from(count)),
        None => UnitRate::NotApplicable,
    }
}

/// Room-count proxy when explicit room counts are unavailable:
/// bedrooms plus the greater of two and twice the bathrooms.
pub fn room_count(bedrooms: Option<u32>, bathrooms: Option<u32>) -> Option<u32> {
    let bedrooms = bedrooms?;
    let wet_and_living = bathrooms.unwrap_or(0).saturating_mul(2).max(2);
    Some(bedrooms.saturating_add(wet_and_living))
}

pub fn rate_per_room(price: Money, bedrooms: Option<u32>, bathrooms: Option<u32>) -> UnitRate {
    match room_count(bedrooms, bathrooms) {
        Some(rooms) => UnitRate::ratio(price, f64::from(rooms)),
        None => UnitRate::NotApplicable,
    }
}

/// Annual income implied by `price` at `yield_rate` percent.
pub fn capitalised_income(price: Money, yield_rate: Option<f64>) -> UnitRate {
    match yield_rate {
        Some(rate) if rate.is_finite() && price.is_finite() => {
            UnitRate::Applicable(price * rate / 100.0)
        }
        _ => UnitRate::NotApplicable,
    }
}

/// Land and improvement rates backed out of a single price by an assumed land share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandImprovementSplit {
    pub land_share: f64,
    pub land_value: Money,
    pub improvements_value: Money,
    pub land_rate_per_sqm: UnitRate,
    pub improvements_rate_per_sqm: UnitRate,
}

impl LandImprovementSplit {
    pub fn assumed(price: Money, features: &PropertyFeatures) -> Self {
        Self::with_land_share(price, features, DEFAULT_LAND_SHARE)
    }

    pub fn with_land_share(price: Money, features: &PropertyFeatures, land_share: f64) -> Self {
        let land_share = if land_share.is_finite() {
            land_share.clamp(0.0, 1.0)
        } else {
            DEFAULT_LAND_SHARE
        };
        let land_value = price * land_share;
        let improvements_value = price - land_value;

        Self {
            land_share,
            land_value,
            improvements_value,
            land_rate_per_sqm: rate_per_area(land_value, features.land_area.as_ref()),
            improvements_rate_per_sqm: rate_per_area(
                improvements_value,
                features.building_area.as_ref(),
            ),
        }
    }
}

/// Unit rates for one price against one set of property features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRates {
    pub price: Money,
    pub land_rate_per_sqm: UnitRate,
    pub building_rate_per_sqm: UnitRate,
    pub rate_per_bedroom: UnitRate,
    pub rate_per_room: UnitRate,
    pub capitalised_income: UnitRate,
    pub assumed_split: LandImprovementSplit,
}

impl DerivedRates {
    pub fn derive(price: Money, features: &PropertyFeatures, yield_rate: Option<f64>) -> Self {
        Self {
            price,
            land_rate_per_sqm: rate_per_area(price, features.land_area.as_ref()),
            building_rate_per_sqm: rate_per_area(price, features.building_area.as_ref()),
            rate_per_bedroom: rate_per_bedroom(price, features.bedrooms),
            rate_per_room: rate_per_room(price, features.bedrooms, features.bathrooms),
            capitalised_income: capitalised_income(price, yield_rate),
            assumed_split: LandImprovementSplit::assumed(price, features),
        }
    }
}
