//! Fee calculator bound to the configured fee schedule

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{calculate_fees, DomainResult, FeeBreakdown, FeeSchedule, OffsiteAdsTier, SaleInput};

/// Stateless apart from the immutable schedule; share freely across tasks.
#[derive(Debug, Clone)]
pub struct FeeCalculator {
    schedule: FeeSchedule,
}

impl FeeCalculator {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Build a sale input. Without an explicit rate the tier rate is used
    /// (standard when no tier is given).
    pub fn sale_input(
        &self,
        sale_price: Decimal,
        production_cost: Decimal,
        shipping_cost: Decimal,
        offsite_ads_enabled: bool,
        offsite_ads_rate: Option<Decimal>,
        tier: Option<OffsiteAdsTier>,
    ) -> SaleInput {
        let rate = offsite_ads_rate
            .unwrap_or_else(|| self.schedule.offsite_ads_rate(tier.unwrap_or_default()));
        SaleInput {
            sale_price,
            production_cost,
            shipping_cost,
            offsite_ads_enabled,
            offsite_ads_rate: rate,
        }
    }

    pub fn calculate(&self, sale: &SaleInput) -> DomainResult<FeeBreakdown> {
        let breakdown = calculate_fees(&self.schedule, sale)?;
        metrics::counter!("fee_calculations_total").increment(1);
        debug!(
            sale_price = %sale.sale_price,
            total_fees = %breakdown.total_fees,
            net_revenue = %breakdown.net_revenue,
            "Fees calculated"
        );
        Ok(breakdown)
    }

    /// `calculate_fees(sale_price, production_cost, shipping_cost, offsite_ads[, rate])`
    pub fn calculate_fees(
        &self,
        sale_price: Decimal,
        production_cost: Decimal,
        shipping_cost: Decimal,
        offsite_ads_enabled: bool,
        offsite_ads_rate: Option<Decimal>,
    ) -> DomainResult<FeeBreakdown> {
        let sale = self.sale_input(
            sale_price,
            production_cost,
            shipping_cost,
            offsite_ads_enabled,
            offsite_ads_rate,
            None,
        );
        self.calculate(&sale)
    }
}
