use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::adjustments::{AdjustmentCalculator, ValuationError};
use super::aggregate::IncludedAttributes;
use super::domain::{AttributeKey, PropertyAttributes, SubjectProperty};
use super::policy::AdjustmentPolicy;

/// Comparable/subject pair, optionally with its own policy and inclusion toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicationRequest {
    pub comparable: PropertyAttributes,
    pub subject: SubjectProperty,
    #[serde(default)]
    pub policy: Option<AdjustmentPolicy>,
    #[serde(default)]
    pub excluded: Vec<AttributeKey>,
    #[serde(default)]
    pub yield_rate: Option<f64>,
}

impl IndicationRequest {
    /// The request's own policy wins over the service default.
    pub fn calculator(&self, default: &AdjustmentCalculator) -> AdjustmentCalculator {
        match &self.policy {
            Some(policy) => AdjustmentCalculator::new(policy.clone()),
            None => default.clone(),
        }
    }

    pub fn included(&self) -> IncludedAttributes {
        IncludedAttributes::excluding(self.excluded.iter().copied())
    }
}

/// Router builder exposing the calculator over JSON.
pub fn valuation_router(calculator: Arc<AdjustmentCalculator>) -> Router {
    Router::new()
        .route("/api/v1/valuation/adjustments", post(adjustments_handler))
        .route("/api/v1/valuation/indication", post(indication_handler))
        .with_state(calculator)
}

pub(crate) async fn adjustments_handler(
    State(calculator): State<Arc<AdjustmentCalculator>>,
    Json(request): Json<IndicationRequest>,
) -> Response {
    let calculator = request.calculator(&calculator);
    match calculator.calculate(&request.comparable, &request.subject) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => invalid_input(error),
    }
}

pub(crate) async fn indication_handler(
    State(calculator): State<Arc<AdjustmentCalculator>>,
    Json(request): Json<IndicationRequest>,
) -> Response {
    let calculator = request.calculator(&calculator);
    let included = request.included();
    match calculator.indicate(
        &request.comparable,
        &request.subject,
        &included,
        request.yield_rate,
    ) {
        Ok(indication) => (StatusCode::OK, Json(indication)).into_response(),
        Err(error) => invalid_input(error),
    }
}

fn invalid_input(error: ValuationError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}
