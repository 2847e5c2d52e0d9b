//! Fee calculator handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use rust_decimal::Decimal;

use super::dto::{
    FeeCalculationRequest, FeeCalculationResponse, FeeInfoResponse, FeeRateInfo, MeteredFeeResponse,
};
use crate::application::{FeeCalculator, MeteredFeeService};
use crate::domain::SaleInput;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedCustomer;

const FEES_SOURCE: &str = "https://www.etsy.com/legal/fees";

#[derive(Clone)]
pub struct FeesHandlerState {
    pub calculator: Arc<FeeCalculator>,
    pub metered: Arc<MeteredFeeService>,
}

fn sale_input(calculator: &FeeCalculator, request: FeeCalculationRequest) -> SaleInput {
    calculator.sale_input(
        request.sale_price,
        request.production_cost.unwrap_or(Decimal::ZERO),
        request.shipping_cost.unwrap_or(Decimal::ZERO),
        request.offsite_ads,
        request.offsite_ads_rate,
        request.offsite_ads_tier.map(Into::into),
    )
}

fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Unmetered fee and margin calculation
#[utoipa::path(
    post,
    path = "/api/v1/calculate-fees",
    tag = "Fees",
    request_body = FeeCalculationRequest,
    responses(
        (status = 200, description = "Fee breakdown", body = ApiResponse<FeeCalculationResponse>),
        (status = 422, description = "Invalid amounts")
    )
)]
pub async fn calculate_fees(
    State(state): State<FeesHandlerState>,
    ValidatedJson(request): ValidatedJson<FeeCalculationRequest>,
) -> Result<Json<ApiResponse<FeeCalculationResponse>>, ApiError> {
    let sale = sale_input(&state.calculator, request);
    let breakdown = state.calculator.calculate(&sale).map_err(domain_error)?;
    let currency = &state.calculator.schedule().currency;

    Ok(Json(ApiResponse::success(FeeCalculationResponse::new(
        currency, breakdown,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/fees/info",
    tag = "Fees",
    responses((status = 200, description = "Configured fee schedule", body = ApiResponse<FeeInfoResponse>))
)]
pub async fn fees_info(State(state): State<FeesHandlerState>) -> Json<ApiResponse<FeeInfoResponse>> {
    let s = state.calculator.schedule();

    let fees = vec![
        FeeRateInfo {
            name: "transaction_fee".into(),
            rate: percent(s.transaction_rate),
            description: "Charged on the sale price plus shipping".into(),
            note: None,
        },
        FeeRateInfo {
            name: "listing_fee".into(),
            rate: format!("{:.2} {}", s.listing_fee, s.currency),
            description: "Flat fee per listing, valid for four months".into(),
            note: None,
        },
        FeeRateInfo {
            name: "payment_processing".into(),
            rate: format!(
                "{} + {:.2} {}",
                percent(s.payment_processing_rate),
                s.payment_processing_flat_fee,
                s.currency
            ),
            description: "Payment processing on the order total".into(),
            note: None,
        },
        FeeRateInfo {
            name: "offsite_ads".into(),
            rate: format!(
                "{} / {}",
                percent(s.offsite_ads_standard_rate),
                percent(s.offsite_ads_reduced_rate)
            ),
            description: "Commission on sales attributed to offsite ads".into(),
            note: Some(format!(
                "Reduced rate and mandatory participation above {:.2} {} trailing yearly sales",
                s.offsite_ads_reduced_threshold, s.currency
            )),
        },
    ];

    Json(ApiResponse::success(FeeInfoResponse {
        currency: s.currency.clone(),
        fees,
        source: FEES_SOURCE.into(),
    }))
}

/// Fee calculation counted against the caller's quota
#[utoipa::path(
    post,
    path = "/api/v1/analyses/fees",
    tag = "Fees",
    request_body = FeeCalculationRequest,
    responses(
        (status = 200, description = "Fee breakdown and updated usage", body = ApiResponse<MeteredFeeResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Invalid amounts"),
        (status = 429, description = "Usage quota exhausted")
    ),
    security(("bearer_auth" = []))
)]
pub async fn calculate_metered_fees(
    State(state): State<FeesHandlerState>,
    Extension(caller): Extension<AuthenticatedCustomer>,
    ValidatedJson(request): ValidatedJson<FeeCalculationRequest>,
) -> Result<Json<ApiResponse<MeteredFeeResponse>>, ApiError> {
    let sale = sale_input(&state.calculator, request);
    let result = state
        .metered
        .calculate(&caller.customer_id, &sale)
        .await
        .map_err(domain_error)?;
    let currency = &state.calculator.schedule().currency;

    Ok(Json(ApiResponse::success(MeteredFeeResponse {
        calculation: FeeCalculationResponse::new(currency, result.breakdown),
        usage: result.usage.into(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_drops_trailing_zeros() {
        assert_eq!(percent(dec!(0.065)), "6.5%");
        assert_eq!(percent(dec!(0.030)), "3%");
        assert_eq!(percent(dec!(0.15)), "15%");
    }
}
