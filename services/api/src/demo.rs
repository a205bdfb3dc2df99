use crate::infra::{load_calculator, parse_attribute, parse_date, read_request};
use chrono::NaiveDate;
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};
use valuation_engine::config::AppConfig;
use valuation_engine::error::AppError;
use valuation_engine::valuation::format;
use valuation_engine::valuation::{
    write_adjustment_grid, AdjustmentCalculator, AdjustmentPolicy, AssetClass, AttributeKey,
    Condition, IncludedAttributes, MarketTrend, Measurement, PropertyAttributes,
    PropertyFeatures, RelativeRating, SubjectProperty, UnitRate, ValuationIndication,
};

#[derive(Args, Debug)]
pub(crate) struct AdjustArgs {
    /// JSON file holding `comparable`, `subject` and optional `policy`/`excluded`/`yield_rate`
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Write the adjustment grid as CSV to this path
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Attributes to leave out of the totals (comma separated, e.g. age,zoning)
    #[arg(long, value_delimiter = ',', value_parser = parse_attribute)]
    pub(crate) exclude: Vec<AttributeKey>,
    /// Override the yield used for capitalised income
    #[arg(long)]
    pub(crate) yield_rate: Option<f64>,
    /// Print the indication as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Asset class preset to adjust with (defaults to residential)
    #[arg(long)]
    pub(crate) asset_class: Option<AssetClass>,
    /// Valuation date for the subject (YYYY-MM-DD). Defaults to 2025-09-01.
    #[arg(long, value_parser = parse_date)]
    pub(crate) valuation_date: Option<NaiveDate>,
    /// Yield applied to the indicated value, in percent
    #[arg(long, default_value_t = 5.0)]
    pub(crate) yield_rate: f64,
    /// Write the adjustment grid as CSV to this path
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_adjust(args: AdjustArgs) -> Result<(), AppError> {
    let AdjustArgs {
        request,
        csv,
        exclude,
        yield_rate,
        json,
    } = args;

    let config = AppConfig::load()?;
    let default_calculator = load_calculator(&config.valuation)?;
    let mut request = read_request(&request)?;
    request.excluded.extend(exclude);
    if yield_rate.is_some() {
        request.yield_rate = yield_rate;
    }

    let calculator = request.calculator(&default_calculator);
    let included = request.included();
    let indication = calculator.indicate(
        &request.comparable,
        &request.subject,
        &included,
        request.yield_rate,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&indication)?);
    } else {
        render_indication(&indication, &included);
    }

    if let Some(path) = csv {
        export_grid(&path, &indication, &included)?;
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        asset_class,
        valuation_date,
        yield_rate,
        csv,
    } = args;

    let asset_class = asset_class.unwrap_or_default();
    let comparable = sample_comparable();
    let subject = sample_subject(valuation_date.or_else(|| NaiveDate::from_ymd_opt(2025, 9, 1)));
    let calculator = AdjustmentCalculator::new(AdjustmentPolicy::for_asset_class(asset_class));
    let included = IncludedAttributes::all();

    println!("Comparable adjustment demo ({asset_class} policy)");
    println!(
        "Comparable: {} sold {} on {}",
        comparable.features.address.as_deref().unwrap_or("unnamed comparable"),
        format::money(comparable.price),
        comparable
            .transaction_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "an unknown date".to_string())
    );
    println!(
        "Subject: {} valued {} in a {} market",
        subject.features.address.as_deref().unwrap_or("unnamed subject"),
        subject
            .valuation_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "as at an unknown date".to_string()),
        subject.market_trend.label()
    );

    let indication = calculator.indicate(&comparable, &subject, &included, Some(yield_rate))?;
    render_indication(&indication, &included);

    if let Some(path) = csv {
        export_grid(&path, &indication, &included)?;
    }

    Ok(())
}

fn render_indication(indication: &ValuationIndication, included: &IncludedAttributes) {
    println!(
        "\n{:<22} {:>16} {:>16} {:>9} {:>13}",
        "Attribute", "Comparable", "Subject", "Adj %", "Adj $"
    );
    for result in &indication.adjustments {
        let marker = match (included.contains(result.attribute), result.policy_gap) {
            (false, _) => " (excluded)",
            (true, true) => " (default rate)",
            (true, false) => "",
        };
        println!(
            "{:<22} {:>16} {:>16} {:>9} {:>13}{}",
            result.attribute.label(),
            result.comparable_value,
            result.subject_value,
            format::signed_percentage(result.percentage_adjustment),
            format::signed_money(result.dollar_adjustment),
            marker
        );
        println!("    {}", result.description);
    }

    let totals = &indication.totals;
    println!(
        "\nTotal adjustment: {} ({})",
        format::signed_money(totals.total_dollar),
        format::signed_percentage(totals.total_percentage)
    );
    println!(
        "Indicated value: {} from base {}",
        format::money(indication.adjusted_value),
        format::money(totals.base_price)
    );

    let rates = &indication.indicated_rates;
    println!("Indicated rates:");
    println!("  - land: {}", per_unit(rates.land_rate_per_sqm, "/sqm"));
    println!("  - building: {}", per_unit(rates.building_rate_per_sqm, "/sqm"));
    println!("  - per bedroom: {}", per_unit(rates.rate_per_bedroom, ""));
    println!("  - per room: {}", per_unit(rates.rate_per_room, ""));
    println!(
        "  - capitalised income: {}",
        per_unit(rates.capitalised_income, " p.a.")
    );
    println!(
        "  - assumed {:.0}% land share: land {} ({}), improvements {} ({})",
        rates.assumed_split.land_share * 100.0,
        format::money(rates.assumed_split.land_value),
        per_unit(rates.assumed_split.land_rate_per_sqm, "/sqm"),
        format::money(rates.assumed_split.improvements_value),
        per_unit(rates.assumed_split.improvements_rate_per_sqm, "/sqm"),
    );
}

fn per_unit(rate: UnitRate, suffix: &str) -> String {
    match rate {
        UnitRate::Applicable(value) => format!("{}{}", format::rate(value), suffix),
        UnitRate::NotApplicable => "n/a".to_string(),
    }
}

fn export_grid(
    path: &Path,
    indication: &ValuationIndication,
    included: &IncludedAttributes,
) -> Result<(), AppError> {
    let file = File::create(path)?;
    write_adjustment_grid(file, &indication.adjustments, included, &indication.totals)?;
    println!("\nAdjustment grid written to {}", path.display());
    Ok(())
}

fn sample_comparable() -> PropertyAttributes {
    PropertyAttributes {
        price: 2_500_000.0,
        transaction_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        yield_rate: Some(4.0),
        features: PropertyFeatures {
            address: Some("22 Wattle Crescent".to_string()),
            land_area: Some(Measurement::square_metres(800.0)),
            building_area: Some(Measurement::square_metres(240.0)),
            bedrooms: Some(3),
            bathrooms: Some(2),
            car_spaces: Some(15),
            year_built: Some(2004),
            condition: Some(Condition::Average),
            location: Some(RelativeRating::Similar),
            position: Some(RelativeRating::Similar),
            zoning: Some("R2".to_string()),
            improvements_value: Some(40_000.0),
            ..PropertyFeatures::default()
        },
        ..PropertyAttributes::default()
    }
}

fn sample_subject(valuation_date: Option<NaiveDate>) -> SubjectProperty {
    SubjectProperty {
        market_trend: MarketTrend::Improving,
        valuation_date,
        features: PropertyFeatures {
            address: Some("18 Wattle Crescent".to_string()),
            land_area: Some(Measurement::square_metres(850.0)),
            building_area: Some(Measurement::square_metres(240.0)),
            bedrooms: Some(4),
            bathrooms: Some(2),
            car_spaces: Some(20),
            year_built: Some(2004),
            condition: Some(Condition::Good),
            location: Some(RelativeRating::Similar),
            position: Some(RelativeRating::Similar),
            zoning: Some("R2".to_string()),
            improvements_value: Some(40_000.0),
            ..PropertyFeatures::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_pair_indicates_above_base_price() {
        let comparable = sample_comparable();
        let subject = sample_subject(NaiveDate::from_ymd_opt(2025, 9, 1));

        let indication = AdjustmentCalculator::default()
            .indicate(&comparable, &subject, &IncludedAttributes::all(), Some(5.0))
            .expect("demo indication computes");

        // land +22,500, bedroom +15,000, cars +8,500, condition +5%, market +3%.
        let expected = 2_500_000.0 + 22_500.0 + 15_000.0 + 8_500.0 + 125_000.0 + 75_000.0;
        assert!((indication.adjusted_value - expected).abs() < 1e-6);
        assert!(indication.indicated_rates.capitalised_income.is_applicable());
    }

    #[test]
    fn per_unit_marks_missing_rates() {
        assert_eq!(per_unit(UnitRate::NotApplicable, "/sqm"), "n/a");
        assert_eq!(per_unit(UnitRate::Applicable(450.0), "/sqm"), "$450/sqm");
    }
}
