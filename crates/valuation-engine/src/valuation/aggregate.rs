use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::adjustments::{AdjustmentCalculator, ValuationError};
use super::domain::{AdjustmentResult, AttributeKey, Money, PropertyAttributes, SubjectProperty};
use super::rates::DerivedRates;

/// Caller-owned set of attributes that count towards the totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedAttributes(BTreeSet<AttributeKey>);

impl Default for IncludedAttributes {
    fn default() -> Self {
        Self::all()
    }
}

impl IncludedAttributes {
    pub fn all() -> Self {
        Self(AttributeKey::ALL.into_iter().collect())
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn excluding<I>(excluded: I) -> Self
    where
        I: IntoIterator<Item = AttributeKey>,
    {
        let mut included = Self::all();
        for attribute in excluded {
            included.exclude(attribute);
        }
        included
    }

    pub fn include(&mut self, attribute: AttributeKey) {
        self.0.insert(attribute);
    }

    pub fn exclude(&mut self, attribute: AttributeKey) {
        self.0.remove(&attribute);
    }

    pub fn contains(&self, attribute: AttributeKey) -> bool {
        self.0.contains(&attribute)
    }
}

impl FromIterator<AttributeKey> for IncludedAttributes {
    fn from_iter<T: IntoIterator<Item = AttributeKey>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Linear sums of the included adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentTotals {
    pub base_price: Money,
    pub total_percentage: f64,
    pub total_dollar: Money,
    pub included: Vec<AttributeKey>,
    pub excluded: Vec<AttributeKey>,
}

impl AdjustmentTotals {
    pub fn adjusted_value(&self) -> Money {
        adjusted_value(self.base_price, self.total_dollar)
    }

    /// Same indication reached through the percentage total.
    pub fn adjusted_value_from_percentage(&self) -> Money {
        self.base_price * (1.0 + self.total_percentage / 100.0)
    }
}

/// Sums percentages and dollars over the included results.
///
/// Percentages are added, not compounded. Excluded results contribute nothing but
/// are reported back so the grid can still show them.
pub fn aggregate(
    results: &[AdjustmentResult],
    base_price: Money,
    included: &IncludedAttributes,
) -> AdjustmentTotals {
    let mut totals = AdjustmentTotals {
        base_price,
        total_percentage: 0.0,
        total_dollar: 0.0,
        included: Vec::new(),
        excluded: Vec::new(),
    };

    for result in results {
        if included.contains(result.attribute) {
            totals.total_percentage += result.percentage_adjustment;
            totals.total_dollar += result.dollar_adjustment;
            totals.included.push(result.attribute);
        } else {
            totals.excluded.push(result.attribute);
        }
    }

    totals
}

/// Base price plus the total dollar adjustment. May be negative for pathological input.
pub fn adjusted_value(base_price: Money, total_dollar: Money) -> Money {
    base_price + total_dollar
}

/// Everything a report needs for one adjusted comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationIndication {
    pub adjustments: Vec<AdjustmentResult>,
    pub totals: AdjustmentTotals,
    pub adjusted_value: Money,
    /// Comparable's own price over its own measures, for benchmarking.
    pub comparable_rates: DerivedRates,
    /// Adjusted value over the subject's measures.
    pub indicated_rates: DerivedRates,
}

impl ValuationIndication {
    /// Builds the indication from an already-calculated grid.
    ///
    /// `yield_rate` overrides the comparable's analysed yield when given.
    pub fn from_adjustments(
        comparable: &PropertyAttributes,
        subject: &SubjectProperty,
        adjustments: Vec<AdjustmentResult>,
        included: &IncludedAttributes,
        yield_rate: Option<f64>,
    ) -> Self {
        let totals = aggregate(&adjustments, comparable.price, included);
        let adjusted_value = totals.adjusted_value();
        let yield_rate = yield_rate.or(comparable.yield_rate);

        Self {
            comparable_rates: DerivedRates::derive(
                comparable.price,
                &comparable.features,
                comparable.yield_rate,
            ),
            indicated_rates: DerivedRates::derive(adjusted_value, &subject.features, yield_rate),
            adjustments,
            totals,
            adjusted_value,
        }
    }
}

impl AdjustmentCalculator {
    /// Calculates the grid and rolls it up into an indication in one call.
    pub fn indicate(
        &self,
        comparable: &PropertyAttributes,
        subject: &SubjectProperty,
        included: &IncludedAttributes,
        yield_rate: Option<f64>,
    ) -> Result<ValuationIndication, ValuationError> {
        let adjustments = self.calculate(comparable, subject)?;
        Ok(ValuationIndication::from_adjustments(
            comparable,
            subject,
            adjustments,
            included,
            yield_rate,
        ))
    }
}
