use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Monetary amount in the report currency. Formatting is a presentation concern.
pub type Money = f64;

/// Unit an area measurement was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    SquareMetres,
    Hectares,
    Acres,
    SquareFeet,
}

impl AreaUnit {
    pub const fn square_metres_per_unit(self) -> f64 {
        match self {
            AreaUnit::SquareMetres => 1.0,
            AreaUnit::Hectares => 10_000.0,
            AreaUnit::Acres => 4_046.856_422_4,
            AreaUnit::SquareFeet => 0.092_903_04,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AreaUnit::SquareMetres => "sqm",
            AreaUnit::Hectares => "ha",
            AreaUnit::Acres => "ac",
            AreaUnit::SquareFeet => "sqft",
        }
    }
}

/// Area value paired with the unit it was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: AreaUnit,
}

impl Measurement {
    pub const fn new(value: f64, unit: AreaUnit) -> Self {
        Self { value, unit }
    }

    pub const fn square_metres(value: f64) -> Self {
        Self::new(value, AreaUnit::SquareMetres)
    }

    pub fn in_square_metres(&self) -> f64 {
        self.value * self.unit.square_metres_per_unit()
    }

    /// Negative or non-finite areas cannot be compared.
    pub fn is_usable(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[default]
    Sale,
    Lease,
}

impl TransactionKind {
    pub const fn label(self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::Lease => "lease",
        }
    }
}

/// Ordinal building condition, scored 1 (poor) to 5 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Poor,
    Fair,
    Average,
    Good,
    Excellent,
}

impl Condition {
    pub const fn score(self) -> i32 {
        match self {
            Condition::Poor => 1,
            Condition::Fair => 2,
            Condition::Average => 3,
            Condition::Good => 4,
            Condition::Excellent => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Condition::Poor => "poor",
            Condition::Fair => "fair",
            Condition::Average => "average",
            Condition::Good => "good",
            Condition::Excellent => "excellent",
        }
    }
}

/// Rating of a location or position against the valuer's reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeRating {
    Inferior,
    Similar,
    Superior,
}

impl RelativeRating {
    pub const fn score(self) -> i32 {
        match self {
            RelativeRating::Inferior => -1,
            RelativeRating::Similar => 0,
            RelativeRating::Superior => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RelativeRating::Inferior => "inferior",
            RelativeRating::Similar => "similar",
            RelativeRating::Superior => "superior",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTrend {
    Declining,
    #[default]
    Stable,
    Improving,
}

impl MarketTrend {
    pub const fn label(self) -> &'static str {
        match self {
            MarketTrend::Declining => "declining",
            MarketTrend::Stable => "stable",
            MarketTrend::Improving => "improving",
        }
    }
}

/// Physical and locational facts shared by comparables and the subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFeatures {
    pub address: Option<String>,
    pub land_area: Option<Measurement>,
    pub building_area: Option<Measurement>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub car_spaces: Option<u32>,
    pub year_built: Option<i32>,
    pub condition: Option<Condition>,
    pub location: Option<RelativeRating>,
    pub position: Option<RelativeRating>,
    pub zoning: Option<String>,
    pub improvements_value: Option<Money>,
    pub esg_rating: Option<String>,
    pub climate_risk: Option<String>,
}

/// Valuer judgements the engine aggregates but does not infer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparableJudgements {
    pub zoning_pct: Option<f64>,
    pub esg_pct: Option<f64>,
    pub climate_risk_pct: Option<f64>,
    pub market_movement_pct: Option<f64>,
    /// Direct dollar value for position; replaces the ordinal comparison when set.
    pub position_value: Option<Money>,
}

/// A transacted (sold or leased) property used as evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyAttributes {
    pub transaction: TransactionKind,
    pub price: Money,
    pub transaction_date: Option<NaiveDate>,
    /// Analysed yield in percent, for income evidence.
    pub yield_rate: Option<f64>,
    #[serde(flatten)]
    pub features: PropertyFeatures,
    pub judgements: ComparableJudgements,
}

/// The property being valued. Its price is the unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectProperty {
    pub market_trend: MarketTrend,
    pub valuation_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub features: PropertyFeatures,
}

/// Fixed catalogue of adjustable attributes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    LandArea,
    BuildingArea,
    Bedrooms,
    Bathrooms,
    CarSpaces,
    Age,
    Condition,
    Location,
    Position,
    Zoning,
    ExternalImprovements,
    Esg,
    ClimateRisk,
    MarketConditions,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 14] = [
        AttributeKey::LandArea,
        AttributeKey::BuildingArea,
        AttributeKey::Bedrooms,
        AttributeKey::Bathrooms,
        AttributeKey::CarSpaces,
        AttributeKey::Age,
        AttributeKey::Condition,
        AttributeKey::Location,
        AttributeKey::Position,
        AttributeKey::Zoning,
        AttributeKey::ExternalImprovements,
        AttributeKey::Esg,
        AttributeKey::ClimateRisk,
        AttributeKey::MarketConditions,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            AttributeKey::LandArea => "land_area",
            AttributeKey::BuildingArea => "building_area",
            AttributeKey::Bedrooms => "bedrooms",
            AttributeKey::Bathrooms => "bathrooms",
            AttributeKey::CarSpaces => "car_spaces",
            AttributeKey::Age => "age",
            AttributeKey::Condition => "condition",
            AttributeKey::Location => "location",
            AttributeKey::Position => "position",
            AttributeKey::Zoning => "zoning",
            AttributeKey::ExternalImprovements => "external_improvements",
            AttributeKey::Esg => "esg",
            AttributeKey::ClimateRisk => "climate_risk",
            AttributeKey::MarketConditions => "market_conditions",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AttributeKey::LandArea => "Land Area",
            AttributeKey::BuildingArea => "Living/Building Area",
            AttributeKey::Bedrooms => "Bedrooms",
            AttributeKey::Bathrooms => "Bathrooms",
            AttributeKey::CarSpaces => "Car Spaces",
            AttributeKey::Age => "Year Built",
            AttributeKey::Condition => "Condition",
            AttributeKey::Location => "Location",
            AttributeKey::Position => "Position",
            AttributeKey::Zoning => "Zoning",
            AttributeKey::ExternalImprovements => "External Improvements",
            AttributeKey::Esg => "ESG Factors",
            AttributeKey::ClimateRisk => "Climate Risk",
            AttributeKey::MarketConditions => "Market Conditions",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether the adjustment was computed as a percentage or as a dollar amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Percentage,
    LumpSum,
}

impl AdjustmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            AdjustmentKind::Percentage => "percentage",
            AdjustmentKind::LumpSum => "lump_sum",
        }
    }
}

/// Direction of the value impact on the comparable's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Positive,
    Negative,
    Neutral,
}

impl AdjustmentType {
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            AdjustmentType::Positive
        } else if amount < 0.0 {
            AdjustmentType::Negative
        } else {
            AdjustmentType::Neutral
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AdjustmentType::Positive => "positive",
            AdjustmentType::Negative => "negative",
            AdjustmentType::Neutral => "neutral",
        }
    }
}

/// One row of the adjustment grid for a comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentResult {
    pub attribute: AttributeKey,
    pub comparable_value: String,
    pub subject_value: String,
    pub kind: AdjustmentKind,
    pub adjustment_type: AdjustmentType,
    pub percentage_adjustment: f64,
    pub dollar_adjustment: Money,
    pub description: String,
    /// Set when the rate came from the default policy rather than the caller's.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub policy_gap: bool,
}
