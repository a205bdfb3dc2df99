use std::io::Write;

use serde::Serialize;

use super::aggregate::{AdjustmentTotals, IncludedAttributes};
use super::domain::AdjustmentResult;
use super::format;

#[derive(Debug, Serialize)]
struct GridRow<'a> {
    #[serde(rename = "Attribute")]
    attribute: &'a str,
    #[serde(rename = "Comparable")]
    comparable: &'a str,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "Kind")]
    kind: &'a str,
    #[serde(rename = "Type")]
    adjustment_type: &'a str,
    #[serde(rename = "Percentage")]
    percentage: f64,
    #[serde(rename = "Dollar")]
    dollar: f64,
    #[serde(rename = "Included")]
    included: bool,
    #[serde(rename = "Description")]
    description: &'a str,
}

/// Writes the adjustment grid as CSV, one row per result followed by a totals row.
///
/// Amounts are rounded to cents and hundredths of a percent for presentation.
pub fn write_adjustment_grid<W: Write>(
    writer: W,
    results: &[AdjustmentResult],
    included: &IncludedAttributes,
    totals: &AdjustmentTotals,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for result in results {
        csv_writer.serialize(GridRow {
            attribute: result.attribute.label(),
            comparable: &result.comparable_value,
            subject: &result.subject_value,
            kind: result.kind.label(),
            adjustment_type: result.adjustment_type.label(),
            percentage: format::round_percentage(result.percentage_adjustment),
            dollar: format::round_currency(result.dollar_adjustment),
            included: included.contains(result.attribute),
            description: &result.description,
        })?;
    }

    let adjusted = format::money(totals.adjusted_value());
    let summary = format!(
        "Adjusted value {} from base {}",
        adjusted,
        format::money(totals.base_price)
    );
    csv_writer.serialize(GridRow {
        attribute: "Total",
        comparable: "",
        subject: "",
        kind: "",
        adjustment_type: "",
        percentage: format::round_percentage(totals.total_percentage),
        dollar: format::round_currency(totals.total_dollar),
        included: true,
        description: &summary,
    })?;

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::aggregate::aggregate;
    use crate::valuation::domain::{AdjustmentKind, AdjustmentType, AttributeKey};

    fn result(attribute: AttributeKey, percentage: f64, dollar: f64) -> AdjustmentResult {
        AdjustmentResult {
            attribute,
            comparable_value: "3".to_string(),
            subject_value: "4".to_string(),
            kind: AdjustmentKind::LumpSum,
            adjustment_type: AdjustmentType::from_amount(dollar),
            percentage_adjustment: percentage,
            dollar_adjustment: dollar,
            description: "test row".to_string(),
            policy_gap: false,
        }
    }

    #[test]
    fn grid_marks_excluded_rows_and_appends_totals() {
        let results = vec![
            result(AttributeKey::Bedrooms, 0.6, 15_000.0),
            result(AttributeKey::Bathrooms, -0.4, -10_000.0),
        ];
        let included = IncludedAttributes::excluding([AttributeKey::Bathrooms]);
        let totals = aggregate(&results, 2_500_000.0, &included);

        let mut buffer = Vec::new();
        write_adjustment_grid(&mut buffer, &results, &included, &totals)
            .expect("grid writes");
        let output = String::from_utf8(buffer).expect("utf8 csv");
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "Attribute,Comparable,Subject,Kind,Type,Percentage,Dollar,Included,Description"
        );
        assert!(lines[1].starts_with("Bedrooms,3,4,lump_sum,positive,0.6,15000.0,true"));
        assert!(lines[2].starts_with("Bathrooms,3,4,lump_sum,negative,-0.4,-10000.0,false"));
        assert!(lines[3].starts_with("Total,,,,,0.6,15000.0,true"));
        assert!(lines[3].contains("$2,515,000"));
    }
}
