use chrono::{Datelike, NaiveDate};
use tracing::warn;

use super::Comparison;
use crate::valuation::domain::{
    AdjustmentResult, AttributeKey, Measurement, Money, PropertyAttributes, PropertyFeatures,
    RelativeRating, SubjectProperty,
};
use crate::valuation::format;
use crate::valuation::policy::{AdjustmentPolicy, PolicyView};

pub(super) struct RuleContext<'a> {
    pub comparable: &'a PropertyAttributes,
    pub subject: &'a SubjectProperty,
    pub base_price: Money,
    pub policy: PolicyView<'a>,
}

impl RuleContext<'_> {
    fn comparable_features(&self) -> &PropertyFeatures {
        &self.comparable.features
    }

    fn subject_features(&self) -> &PropertyFeatures {
        &self.subject.features
    }
}

pub(super) fn evaluate(attribute: AttributeKey, ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    match attribute {
        AttributeKey::LandArea => area_difference(
            ctx,
            attribute,
            |features| features.land_area,
            |policy| policy.land_rate_per_sqm,
        ),
        AttributeKey::BuildingArea => area_difference(
            ctx,
            attribute,
            |features| features.building_area,
            |policy| policy.building_rate_per_sqm,
        ),
        AttributeKey::Bedrooms => count_difference(
            ctx,
            attribute,
            |features| features.bedrooms,
            |policy| policy.bedroom_rate,
        ),
        AttributeKey::Bathrooms => count_difference(
            ctx,
            attribute,
            |features| features.bathrooms,
            |policy| policy.bathroom_rate,
        ),
        AttributeKey::CarSpaces => car_spaces(ctx),
        AttributeKey::Age => age(ctx),
        AttributeKey::Condition => {
            let comparable = ctx.comparable_features().condition?;
            let subject = ctx.subject_features().condition?;
            ordinal_difference(
                ctx,
                attribute,
                (comparable.score(), comparable.label()),
                (subject.score(), subject.label()),
                |policy| policy.condition_step,
            )
        }
        AttributeKey::Location => relative_rating(
            ctx,
            attribute,
            ctx.comparable_features().location,
            ctx.subject_features().location,
            |policy| policy.location_step,
        ),
        AttributeKey::Position => position(ctx),
        AttributeKey::Zoning => zoning(ctx),
        AttributeKey::ExternalImprovements => external_improvements(ctx),
        AttributeKey::Esg => judged_percentage(
            ctx,
            attribute,
            ctx.comparable.judgements.esg_pct,
            ctx.comparable_features().esg_rating.as_deref(),
            ctx.subject_features().esg_rating.as_deref(),
            "not rated",
        ),
        AttributeKey::ClimateRisk => judged_percentage(
            ctx,
            attribute,
            ctx.comparable.judgements.climate_risk_pct,
            ctx.comparable_features().climate_risk.as_deref(),
            ctx.subject_features().climate_risk.as_deref(),
            "not assessed",
        ),
        AttributeKey::MarketConditions => market_conditions(ctx),
    }
}

fn area_difference(
    ctx: &RuleContext<'_>,
    attribute: AttributeKey,
    measure: fn(&PropertyFeatures) -> Option<Measurement>,
    pick_rate: fn(&AdjustmentPolicy) -> Option<Money>,
) -> Option<AdjustmentResult> {
    let comparable = usable_area(attribute, measure(ctx.comparable_features()))?;
    let subject = usable_area(attribute, measure(ctx.subject_features()))?;
    let rate = ctx.policy.rate(attribute, pick_rate)?;

    let difference = subject.in_square_metres() - comparable.in_square_metres();
    let dollar = difference * rate.value;

    let comparison = Comparison {
        attribute,
        comparable_value: format::area(&comparable),
        subject_value: format::area(&subject),
        description: format!(
            "{}: subject {} vs comparable {} ({} sqm at {}/sqm)",
            attribute.label(),
            format::area(&subject),
            format::area(&comparable),
            signed_number(difference),
            format::rate(rate.value),
        ),
        policy_gap: rate.policy_gap,
    };
    Some(comparison.lump_sum(ctx.base_price, dollar))
}

fn usable_area(attribute: AttributeKey, area: Option<Measurement>) -> Option<Measurement> {
    let area = area?;
    if area.is_usable() {
        Some(area)
    } else {
        warn!(attribute = attribute.key(), value = area.value, "ignoring unusable area");
        None
    }
}

fn count_difference(
    ctx: &RuleContext<'_>,
    attribute: AttributeKey,
    count: fn(&PropertyFeatures) -> Option<u32>,
    pick_rate: fn(&AdjustmentPolicy) -> Option<Money>,
) -> Option<AdjustmentResult> {
    let comparable = count(ctx.comparable_features())?;
    let subject = count(ctx.subject_features())?;
    let rate = ctx.policy.rate(attribute, pick_rate)?;

    let difference = i64::from(subject) - i64::from(comparable);
    let dollar = difference as f64 * rate.value;

    let comparison = Comparison {
        attribute,
        comparable_value: comparable.to_string(),
        subject_value: subject.to_string(),
        description: format!(
            "{}: subject {} vs comparable {} ({} at {} each)",
            attribute.label(),
            subject,
            comparable,
            signed_count(difference),
            format::money(rate.value),
        ),
        policy_gap: rate.policy_gap,
    };
    Some(comparison.lump_sum(ctx.base_price, dollar))
}

fn car_spaces(ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    let attribute = AttributeKey::CarSpaces;
    let comparable = ctx.comparable_features().car_spaces?;
    let subject = ctx.subject_features().car_spaces?;
    let tiers = ctx.policy.rate(attribute, |policy| policy.car_space_tiers)?;

    let difference = i64::from(subject) - i64::from(comparable);
    let spaces = u32::try_from(difference.unsigned_abs()).unwrap_or(u32::MAX);
    let magnitude = tiers.value.value_of(spaces);
    let dollar = if difference < 0 { -magnitude } else { magnitude };

    let comparison = Comparison {
        attribute,
        comparable_value: comparable.to_string(),
        subject_value: subject.to_string(),
        description: format!(
            "Car Spaces: subject {} vs comparable {} ({} spaces at {} for the first {}, {} for the next {}, {} thereafter)",
            subject,
            comparable,
            signed_count(difference),
            format::money(tiers.value.full_rate),
            tiers.value.full_spaces,
            format::money(tiers.value.reduced_rate),
            tiers.value.reduced_spaces,
            format::money(tiers.value.residual_rate),
        ),
        policy_gap: tiers.policy_gap,
    };
    Some(comparison.lump_sum(ctx.base_price, dollar))
}

fn age(ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    let attribute = AttributeKey::Age;
    let comparable = ctx.comparable_features().year_built?;
    let subject = ctx.subject_features().year_built?;
    let rate = ctx.policy.rate(attribute, |policy| policy.age_rate_per_year)?;
    let bounds = ctx.policy.rate(attribute, |policy| policy.age_bounds)?;

    let years = i64::from(subject) - i64::from(comparable);
    let raw = years as f64 * rate.value;
    let percentage = bounds.value.clamp(raw);

    let mut description = format!(
        "Year Built: subject {} vs comparable {} ({} years at {}%/year)",
        subject,
        comparable,
        signed_count(years),
        format::trim_number(rate.value),
    );
    if percentage != raw {
        description.push_str(&format!(
            ", capped at {}",
            format::signed_percentage(percentage)
        ));
    }

    let comparison = Comparison {
        attribute,
        comparable_value: comparable.to_string(),
        subject_value: subject.to_string(),
        description,
        policy_gap: rate.policy_gap || bounds.policy_gap,
    };
    Some(comparison.percentage(ctx.base_price, percentage))
}

fn relative_rating(
    ctx: &RuleContext<'_>,
    attribute: AttributeKey,
    comparable: Option<RelativeRating>,
    subject: Option<RelativeRating>,
    pick_step: fn(&AdjustmentPolicy) -> Option<f64>,
) -> Option<AdjustmentResult> {
    let comparable = comparable?;
    let subject = subject?;
    ordinal_difference(
        ctx,
        attribute,
        (comparable.score(), comparable.label()),
        (subject.score(), subject.label()),
        pick_step,
    )
}

fn ordinal_difference(
    ctx: &RuleContext<'_>,
    attribute: AttributeKey,
    (comparable_score, comparable_label): (i32, &str),
    (subject_score, subject_label): (i32, &str),
    pick_step: fn(&AdjustmentPolicy) -> Option<f64>,
) -> Option<AdjustmentResult> {
    let step = ctx.policy.rate(attribute, pick_step)?;
    let steps = i64::from(subject_score) - i64::from(comparable_score);
    let percentage = steps as f64 * step.value;

    let comparison = Comparison {
        attribute,
        comparable_value: comparable_label.to_string(),
        subject_value: subject_label.to_string(),
        description: format!(
            "{}: subject {} vs comparable {} ({} step(s) at {}% each)",
            attribute.label(),
            subject_label,
            comparable_label,
            signed_count(steps),
            format::trim_number(step.value),
        ),
        policy_gap: step.policy_gap,
    };
    Some(comparison.percentage(ctx.base_price, percentage))
}

fn position(ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    let attribute = AttributeKey::Position;
    let comparable = ctx.comparable_features().position;
    let subject = ctx.subject_features().position;

    match finite_judgement(attribute, ctx.comparable.judgements.position_value) {
        Some(value) => {
            let comparison = Comparison {
                attribute,
                comparable_value: rating_label(comparable),
                subject_value: rating_label(subject),
                description: format!(
                    "Position: {} assessed directly by the valuer",
                    format::signed_money(value)
                ),
                policy_gap: false,
            };
            Some(comparison.lump_sum(ctx.base_price, value))
        }
        None => relative_rating(ctx, attribute, comparable, subject, |policy| {
            policy.position_step
        }),
    }
}

fn rating_label(rating: Option<RelativeRating>) -> String {
    rating
        .map(|rating| rating.label().to_string())
        .unwrap_or_else(|| "not rated".to_string())
}

fn zoning(ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    let attribute = AttributeKey::Zoning;
    let comparable = non_empty(ctx.comparable_features().zoning.as_deref())?;
    let subject = non_empty(ctx.subject_features().zoning.as_deref())?;
    let supplied = finite_judgement(attribute, ctx.comparable.judgements.zoning_pct);

    let description = match supplied {
        Some(percentage) => format!(
            "Zoning: subject {} vs comparable {} (valuer differential {})",
            subject,
            comparable,
            format::signed_percentage(percentage)
        ),
        None if comparable.eq_ignore_ascii_case(subject) => {
            format!("Zoning: subject and comparable both zoned {}", subject)
        }
        None => format!(
            "Zoning: subject {} vs comparable {} (no differential supplied)",
            subject, comparable
        ),
    };

    let comparison = Comparison {
        attribute,
        comparable_value: comparable.to_string(),
        subject_value: subject.to_string(),
        description,
        policy_gap: false,
    };
    Some(comparison.percentage(ctx.base_price, supplied.unwrap_or(0.0)))
}

fn external_improvements(ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    let attribute = AttributeKey::ExternalImprovements;
    let comparable = usable_money(attribute, ctx.comparable_features().improvements_value)?;
    let subject = usable_money(attribute, ctx.subject_features().improvements_value)?;
    let dollar = subject - comparable;

    let comparison = Comparison {
        attribute,
        comparable_value: format::money(comparable),
        subject_value: format::money(subject),
        description: format!(
            "External Improvements: subject {} vs comparable {} ({})",
            format::money(subject),
            format::money(comparable),
            format::signed_money(dollar)
        ),
        policy_gap: false,
    };
    Some(comparison.lump_sum(ctx.base_price, dollar))
}

fn usable_money(attribute: AttributeKey, value: Option<Money>) -> Option<Money> {
    let value = value?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        warn!(attribute = attribute.key(), value, "ignoring unusable amount");
        None
    }
}

fn judged_percentage(
    ctx: &RuleContext<'_>,
    attribute: AttributeKey,
    supplied: Option<f64>,
    comparable: Option<&str>,
    subject: Option<&str>,
    missing_label: &str,
) -> Option<AdjustmentResult> {
    let percentage = finite_judgement(attribute, supplied)?;
    let comparable = non_empty(comparable).unwrap_or(missing_label);
    let subject = non_empty(subject).unwrap_or(missing_label);

    let comparison = Comparison {
        attribute,
        comparable_value: comparable.to_string(),
        subject_value: subject.to_string(),
        description: format!(
            "{}: subject {} vs comparable {} (valuer differential {})",
            attribute.label(),
            subject,
            comparable,
            format::signed_percentage(percentage)
        ),
        policy_gap: false,
    };
    Some(comparison.percentage(ctx.base_price, percentage))
}

fn market_conditions(ctx: &RuleContext<'_>) -> Option<AdjustmentResult> {
    let attribute = AttributeKey::MarketConditions;
    let trend = ctx.subject.market_trend;
    let comparable_value = match ctx.comparable.transaction_date {
        Some(date) => format!("{} {}", ctx.comparable.transaction.label(), date),
        None => ctx.comparable.transaction.label().to_string(),
    };
    let subject_value = match ctx.subject.valuation_date {
        Some(date) => format!("valued {} ({})", date, trend.label()),
        None => trend.label().to_string(),
    };

    if let Some(percentage) =
        finite_judgement(attribute, ctx.comparable.judgements.market_movement_pct)
    {
        let comparison = Comparison {
            attribute,
            comparable_value,
            subject_value,
            description: format!(
                "Market Conditions: valuer-assessed movement of {} in a {} market",
                format::signed_percentage(percentage),
                trend.label()
            ),
            policy_gap: false,
        };
        return Some(comparison.percentage(ctx.base_price, percentage));
    }

    let transacted = ctx.comparable.transaction_date?;
    let valued = ctx.subject.valuation_date?;
    let movement = ctx.policy.rate(attribute, |policy| policy.market_movement)?;

    let months = whole_months_between(transacted, valued);
    let monthly = movement.value.monthly_rate(trend);
    let percentage = months as f64 * monthly;

    let comparison = Comparison {
        attribute,
        comparable_value,
        subject_value,
        description: format!(
            "Market Conditions: {} month(s) from {} to valuation at {}%/month ({} market)",
            months,
            ctx.comparable.transaction.label(),
            format::trim_number(monthly),
            trend.label()
        ),
        policy_gap: movement.policy_gap,
    };
    Some(comparison.percentage(ctx.base_price, percentage))
}

/// Whole calendar months from `from` to `to`; negative when `to` is earlier.
pub(crate) fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12
        + (i64::from(to.month()) - i64::from(from.month()));
    if months > 0 && to.day() < from.day() {
        months -= 1;
    } else if months < 0 && to.day() > from.day() {
        months += 1;
    }
    months
}

fn finite_judgement(attribute: AttributeKey, value: Option<f64>) -> Option<f64> {
    let value = value?;
    if value.is_finite() {
        Some(value)
    } else {
        warn!(attribute = attribute.key(), "ignoring non-finite valuer judgement");
        None
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn signed_number(value: f64) -> String {
    if format::round_to(value, 2) > 0.0 {
        format!("+{}", format::trim_number(value))
    } else {
        format::trim_number(value)
    }
}

fn signed_count(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn months_count_only_completed_months() {
        assert_eq!(whole_months_between(date(2024, 3, 15), date(2025, 3, 15)), 12);
        assert_eq!(whole_months_between(date(2024, 3, 15), date(2025, 3, 14)), 11);
        assert_eq!(whole_months_between(date(2024, 3, 15), date(2024, 3, 30)), 0);
        assert_eq!(whole_months_between(date(2025, 3, 15), date(2024, 12, 20)), -2);
    }

    #[test]
    fn signed_helpers_mark_direction() {
        assert_eq!(signed_number(50.0), "+50");
        assert_eq!(signed_number(-12.5), "-12.5");
        assert_eq!(signed_number(0.0), "0");
        assert_eq!(signed_count(5), "+5");
        assert_eq!(signed_count(-1), "-1");
    }
}
