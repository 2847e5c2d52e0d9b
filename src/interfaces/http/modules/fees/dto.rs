//! Fee calculator DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::{FeeBreakdown, OffsiteAdsTier};
use crate::interfaces::http::modules::usage::QuotaStatusResponse;

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    Ok(())
}

fn unit_rate(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE {
        return Err(ValidationError::new("rate").with_message("must be between 0 and 1".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OffsiteAdsTierParam {
    Standard,
    Reduced,
}

impl From<OffsiteAdsTierParam> for OffsiteAdsTier {
    fn from(tier: OffsiteAdsTierParam) -> Self {
        match tier {
            OffsiteAdsTierParam::Standard => OffsiteAdsTier::Standard,
            OffsiteAdsTierParam::Reduced => OffsiteAdsTier::Reduced,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FeeCalculationRequest {
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = f64, example = 29.99)]
    pub sale_price: Decimal,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<f64>, example = 12.0)]
    pub production_cost: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<f64>, example = 4.0)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub offsite_ads: bool,
    /// Overrides the tier rate
    #[validate(custom(function = "unit_rate"))]
    #[schema(value_type = Option<f64>)]
    pub offsite_ads_rate: Option<Decimal>,
    pub offsite_ads_tier: Option<OffsiteAdsTierParam>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeeLines {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub listing_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub transaction_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub payment_processing_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub offsite_ads_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_fees: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeeCalculationResponse {
    pub currency: String,
    pub fees: FeeLines,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_costs: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub net_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub margin: Decimal,
    /// Percent of the sale price, one decimal place
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub margin_percent: Decimal,
}

impl FeeCalculationResponse {
    pub fn new(currency: &str, b: FeeBreakdown) -> Self {
        Self {
            currency: currency.to_string(),
            fees: FeeLines {
                listing_fee: b.listing_fee,
                transaction_fee: b.transaction_fee,
                payment_processing_fee: b.payment_processing_fee,
                offsite_ads_fee: b.offsite_ads_fee,
                total_fees: b.total_fees,
            },
            total_costs: b.total_costs,
            net_revenue: b.net_revenue,
            margin: b.margin,
            margin_percent: b.margin_percent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeteredFeeResponse {
    pub calculation: FeeCalculationResponse,
    pub usage: QuotaStatusResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeeRateInfo {
    pub name: String,
    pub rate: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeeInfoResponse {
    pub currency: String,
    pub fees: Vec<FeeRateInfo>,
    pub source: String,
}
