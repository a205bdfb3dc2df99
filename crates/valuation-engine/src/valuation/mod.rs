//! Comparable adjustment and valuation engine.
//!
//! Everything here is a pure function of its inputs: the calculator turns a
//! comparable/subject pair into an adjustment grid, the aggregator rolls the
//! included rows into totals, and the rate helpers derive unit rates from a price.

pub mod adjustments;
pub mod aggregate;
pub mod domain;
pub mod format;
pub mod policy;
pub mod rates;
pub mod report;
pub mod router;

#[cfg(test)]
mod tests;

pub use adjustments::{calculate_adjustments, AdjustmentCalculator, ValuationError};
pub use aggregate::{
    adjusted_value, aggregate, AdjustmentTotals, IncludedAttributes, ValuationIndication,
};
pub use domain::{
    AdjustmentKind, AdjustmentResult, AdjustmentType, AreaUnit, AttributeKey,
    ComparableJudgements, Condition, MarketTrend, Measurement, Money, PropertyAttributes,
    PropertyFeatures, RelativeRating, SubjectProperty, TransactionKind,
};
pub use policy::{
    AdjustmentPolicy, AssetClass, CarSpaceTiers, MarketMovementRates, PercentageBounds,
    PolicyLoadError, UnknownAssetClass,
};
pub use rates::{DerivedRates, LandImprovementSplit, UnitRate, DEFAULT_LAND_SHARE};
pub use report::write_adjustment_grid;
pub use router::{valuation_router, IndicationRequest};
