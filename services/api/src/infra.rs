use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use valuation_engine::config::ValuationConfig;
use valuation_engine::error::AppError;
use valuation_engine::valuation::{AdjustmentCalculator, AttributeKey, IndicationRequest};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_calculator(config: &ValuationConfig) -> Result<AdjustmentCalculator, AppError> {
    Ok(AdjustmentCalculator::new(config.policy()?))
}

pub(crate) fn read_request(path: &Path) -> Result<IndicationRequest, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_attribute(raw: &str) -> Result<AttributeKey, String> {
    let wanted = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    AttributeKey::ALL
        .iter()
        .copied()
        .find(|attribute| attribute.key() == wanted)
        .ok_or_else(|| {
            let known: Vec<&str> = AttributeKey::ALL.iter().map(|key| key.key()).collect();
            format!("unknown attribute '{raw}' (expected one of {})", known.join(", "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_attribute_accepts_wire_names_and_dashes() {
        assert_eq!(parse_attribute("land_area"), Ok(AttributeKey::LandArea));
        assert_eq!(parse_attribute("Car-Spaces"), Ok(AttributeKey::CarSpaces));
        assert!(parse_attribute("swimming_pool")
            .expect_err("unknown attribute rejected")
            .contains("land_area"));
    }

    #[test]
    fn parse_date_requires_iso_format() {
        assert_eq!(
            parse_date(" 2025-09-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"))
        );
        assert!(parse_date("01/09/2025").is_err());
    }
}
