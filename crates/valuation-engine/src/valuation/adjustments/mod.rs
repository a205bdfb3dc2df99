mod rules;

use tracing::{debug, warn};

use super::domain::{
    AdjustmentKind, AdjustmentResult, AdjustmentType, AttributeKey, Money, PropertyAttributes,
    SubjectProperty,
};
use super::policy::{AdjustmentPolicy, PolicyView};

/// Error raised when a comparable cannot be adjusted at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("comparable base price must be greater than zero (got {price})")]
    InvalidBasePrice { price: Money },
}

/// Stateless calculator applying a weighting policy to a comparable/subject pair.
#[derive(Debug, Clone)]
pub struct AdjustmentCalculator {
    policy: AdjustmentPolicy,
    fallback: AdjustmentPolicy,
}

impl Default for AdjustmentCalculator {
    fn default() -> Self {
        Self::new(AdjustmentPolicy::standard())
    }
}

impl AdjustmentCalculator {
    pub fn new(policy: AdjustmentPolicy) -> Self {
        let fallback = AdjustmentPolicy::for_asset_class(policy.asset_class);
        Self { policy, fallback }
    }

    pub fn policy(&self) -> &AdjustmentPolicy {
        &self.policy
    }

    /// Adjustment grid for one comparable, in catalogue order.
    ///
    /// Attributes either side cannot supply are omitted. Fails only when the
    /// comparable's price cannot serve as a base for percentage conversion.
    pub fn calculate(
        &self,
        comparable: &PropertyAttributes,
        subject: &SubjectProperty,
    ) -> Result<Vec<AdjustmentResult>, ValuationError> {
        let base_price = comparable.price;
        // Also rejects NaN.
        if !(base_price > 0.0 && base_price.is_finite()) {
            warn!(price = base_price, "rejecting comparable with invalid base price");
            return Err(ValuationError::InvalidBasePrice { price: base_price });
        }

        let context = rules::RuleContext {
            comparable,
            subject,
            base_price,
            policy: PolicyView::new(&self.policy, &self.fallback),
        };

        let mut results = Vec::new();
        for attribute in AttributeKey::ALL {
            if !context.policy.applies_to(attribute) {
                continue;
            }

            if let Some(result) = rules::evaluate(attribute, &context) {
                debug!(
                    attribute = attribute.key(),
                    percentage = result.percentage_adjustment,
                    dollar = result.dollar_adjustment,
                    "adjustment computed"
                );
                results.push(result);
            }
        }

        Ok(results)
    }
}

/// Calculates adjustments with `weights`, or the standard policy when none is given.
pub fn calculate_adjustments(
    comparable: &PropertyAttributes,
    subject: &SubjectProperty,
    weights: Option<&AdjustmentPolicy>,
) -> Result<Vec<AdjustmentResult>, ValuationError> {
    match weights {
        Some(policy) => AdjustmentCalculator::new(policy.clone()).calculate(comparable, subject),
        None => AdjustmentCalculator::default().calculate(comparable, subject),
    }
}

/// What was compared, before the amount is attached.
pub(crate) struct Comparison {
    pub attribute: AttributeKey,
    pub comparable_value: String,
    pub subject_value: String,
    pub description: String,
    pub policy_gap: bool,
}

impl Comparison {
    /// Percentage is primary; dollars follow from the base price.
    pub(crate) fn percentage(self, base_price: Money, percentage: f64) -> AdjustmentResult {
        let percentage = normalise(percentage);
        let dollar = normalise(base_price * percentage / 100.0);
        self.finish(AdjustmentKind::Percentage, percentage, dollar)
    }

    /// Dollars are primary; the percentage of base price is derived for totals.
    pub(crate) fn lump_sum(self, base_price: Money, dollar: Money) -> AdjustmentResult {
        let dollar = normalise(dollar);
        let percentage = normalise(dollar / base_price * 100.0);
        self.finish(AdjustmentKind::LumpSum, percentage, dollar)
    }

    fn finish(self, kind: AdjustmentKind, percentage: f64, dollar: Money) -> AdjustmentResult {
        AdjustmentResult {
            attribute: self.attribute,
            comparable_value: self.comparable_value,
            subject_value: self.subject_value,
            kind,
            adjustment_type: AdjustmentType::from_amount(percentage),
            percentage_adjustment: percentage,
            dollar_adjustment: dollar,
            description: self.description,
            policy_gap: self.policy_gap,
        }
    }
}

/// Collapses `-0.0` so zero always reads as neutral.
fn normalise(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
