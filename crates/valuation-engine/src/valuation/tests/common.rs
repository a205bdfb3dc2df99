use chrono::NaiveDate;

use crate::valuation::domain::{
    Condition, MarketTrend, Measurement, PropertyAttributes, PropertyFeatures, RelativeRating,
    SubjectProperty, TransactionKind,
};
use crate::valuation::policy::AdjustmentPolicy;

pub(super) const BASE_PRICE: f64 = 2_500_000.0;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn features() -> PropertyFeatures {
    PropertyFeatures {
        address: Some("14 Harbour View Road".to_string()),
        land_area: Some(Measurement::square_metres(800.0)),
        building_area: Some(Measurement::square_metres(240.0)),
        bedrooms: Some(3),
        bathrooms: Some(2),
        car_spaces: Some(2),
        year_built: Some(2005),
        condition: Some(Condition::Average),
        location: Some(RelativeRating::Similar),
        position: Some(RelativeRating::Similar),
        zoning: Some("R2".to_string()),
        improvements_value: Some(40_000.0),
        esg_rating: Some("5 star NatHERS".to_string()),
        climate_risk: Some("low".to_string()),
    }
}

/// Comparable sold at the base price with the same features as [`subject`].
pub(super) fn comparable() -> PropertyAttributes {
    PropertyAttributes {
        transaction: TransactionKind::Sale,
        price: BASE_PRICE,
        transaction_date: Some(date(2025, 3, 1)),
        yield_rate: None,
        features: features(),
        judgements: Default::default(),
    }
}

pub(super) fn subject() -> SubjectProperty {
    SubjectProperty {
        market_trend: MarketTrend::Stable,
        valuation_date: Some(date(2025, 9, 1)),
        features: PropertyFeatures {
            address: Some("9 Harbour View Road".to_string()),
            ..features()
        },
    }
}

pub(super) fn policy() -> AdjustmentPolicy {
    AdjustmentPolicy::standard()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
