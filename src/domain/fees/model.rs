//! Fee schedule, sale input and fee breakdown

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::domain::{DomainError, DomainResult};

/// Marketplace fee schedule. Rates are fractions (0.065 = 6.5%).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Currency code (ISO 4217)
    pub currency: String,
    /// Flat fee per listing
    pub listing_fee: Decimal,
    /// Applied to sale price + shipping
    pub transaction_rate: Decimal,
    /// Applied to sale price + shipping
    pub payment_processing_rate: Decimal,
    /// Flat add-on per payment
    pub payment_processing_flat_fee: Decimal,
    /// Offsite ads rate for sellers below the revenue threshold
    pub offsite_ads_standard_rate: Decimal,
    /// Offsite ads rate for sellers above the revenue threshold
    pub offsite_ads_reduced_rate: Decimal,
    /// Trailing yearly revenue above which the reduced rate applies.
    /// Informational: the tier is picked by the caller.
    pub offsite_ads_reduced_threshold: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            listing_fee: dec!(0.20),
            transaction_rate: dec!(0.065),
            payment_processing_rate: dec!(0.03),
            payment_processing_flat_fee: dec!(0.25),
            offsite_ads_standard_rate: dec!(0.15),
            offsite_ads_reduced_rate: dec!(0.12),
            offsite_ads_reduced_threshold: dec!(10000),
        }
    }
}

/// Offsite ads pricing tier, chosen from the seller's trailing revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsiteAdsTier {
    #[default]
    Standard,
    Reduced,
}

impl std::fmt::Display for OffsiteAdsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Reduced => write!(f, "reduced"),
        }
    }
}

impl FeeSchedule {
    pub fn offsite_ads_rate(&self, tier: OffsiteAdsTier) -> Decimal {
        match tier {
            OffsiteAdsTier::Standard => self.offsite_ads_standard_rate,
            OffsiteAdsTier::Reduced => self.offsite_ads_reduced_rate,
        }
    }

    /// Rates must be fractions in `[0, 1]`, flat amounts non-negative.
    pub fn validate(&self) -> DomainResult<()> {
        check_non_negative("listing_fee", self.listing_fee)?;
        check_non_negative("payment_processing_flat_fee", self.payment_processing_flat_fee)?;
        check_non_negative("offsite_ads_reduced_threshold", self.offsite_ads_reduced_threshold)?;
        check_rate("transaction_rate", self.transaction_rate)?;
        check_rate("payment_processing_rate", self.payment_processing_rate)?;
        check_rate("offsite_ads_standard_rate", self.offsite_ads_standard_rate)?;
        check_rate("offsite_ads_reduced_rate", self.offsite_ads_reduced_rate)?;
        Ok(())
    }
}

/// One sale to price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleInput {
    pub sale_price: Decimal,
    pub production_cost: Decimal,
    pub shipping_cost: Decimal,
    pub offsite_ads_enabled: bool,
    /// Used only when `offsite_ads_enabled`
    pub offsite_ads_rate: Decimal,
}

impl SaleInput {
    pub fn validate(&self) -> DomainResult<()> {
        check_non_negative("sale_price", self.sale_price)?;
        check_non_negative("production_cost", self.production_cost)?;
        check_non_negative("shipping_cost", self.shipping_cost)?;
        check_rate("offsite_ads_rate", self.offsite_ads_rate)?;
        check_max("sale_price", self.sale_price)?;
        check_max("production_cost", self.production_cost)?;
        check_max("shipping_cost", self.shipping_cost)?;
        Ok(())
    }
}

/// Fee and margin decomposition of one sale, in currency units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub listing_fee: Decimal,
    pub transaction_fee: Decimal,
    pub payment_processing_fee: Decimal,
    pub offsite_ads_fee: Decimal,
    /// Exactly the sum of the four components above
    pub total_fees: Decimal,
    /// Production + shipping
    pub total_costs: Decimal,
    pub net_revenue: Decimal,
    pub margin: Decimal,
    /// Net revenue as a percentage of the sale price, one decimal place
    pub margin_percent: Decimal,
}

/// Round to the currency precision (cents).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn check_non_negative(field: &'static str, value: Decimal) -> DomainResult<()> {
    if value < Decimal::ZERO {
        return Err(DomainError::invalid_input(field, "must be non-negative"));
    }
    Ok(())
}

/// Largest accepted amount for any single input, in currency units
pub const MAX_AMOUNT: Decimal = dec!(1000000000);

fn check_max(field: &'static str, value: Decimal) -> DomainResult<()> {
    if value > MAX_AMOUNT {
        return Err(DomainError::invalid_input(field, "amount too large"));
    }
    Ok(())
}

/// Overflowed arithmetic is reported against the field that fed it.
fn checked(field: &'static str, value: Option<Decimal>) -> DomainResult<Decimal> {
    value.ok_or_else(|| DomainError::invalid_input(field, "amount too large"))
}

fn check_rate(field: &'static str, value: Decimal) -> DomainResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(DomainError::invalid_input(field, "must be between 0 and 1"));
    }
    Ok(())
}

/// Decompose a sale into fees and margin.
///
/// Each fee component is rounded to cents before summing, so `total_fees`
/// always equals the sum of the components. A zero sale price means no sale
/// happened: every fee is zero and `margin_percent` is zero.
pub fn calculate_fees(schedule: &FeeSchedule, input: &SaleInput) -> DomainResult<FeeBreakdown> {
    input.validate()?;

    let total_costs = round_money(checked(
        "production_cost",
        input.production_cost.checked_add(input.shipping_cost),
    )?);

    if input.sale_price.is_zero() {
        let net_revenue = -total_costs;
        return Ok(FeeBreakdown {
            listing_fee: Decimal::ZERO,
            transaction_fee: Decimal::ZERO,
            payment_processing_fee: Decimal::ZERO,
            offsite_ads_fee: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            total_costs,
            net_revenue,
            margin: net_revenue,
            margin_percent: Decimal::ZERO,
        });
    }

    let order_total = checked("sale_price", input.sale_price.checked_add(input.shipping_cost))?;

    let listing_fee = round_money(schedule.listing_fee);
    let transaction_fee = round_money(checked(
        "sale_price",
        schedule.transaction_rate.checked_mul(order_total),
    )?);
    let payment_processing_fee = round_money(checked(
        "sale_price",
        schedule
            .payment_processing_rate
            .checked_mul(order_total)
            .and_then(|fee| fee.checked_add(schedule.payment_processing_flat_fee)),
    )?);
    let offsite_ads_fee = if input.offsite_ads_enabled {
        round_money(checked(
            "sale_price",
            input.offsite_ads_rate.checked_mul(input.sale_price),
        )?)
    } else {
        Decimal::ZERO
    };

    let total_fees = checked(
        "sale_price",
        listing_fee
            .checked_add(transaction_fee)
            .and_then(|t| t.checked_add(payment_processing_fee))
            .and_then(|t| t.checked_add(offsite_ads_fee)),
    )?;
    let net_revenue = round_money(checked(
        "production_cost",
        input
            .sale_price
            .checked_sub(total_fees)
            .and_then(|n| n.checked_sub(total_costs)),
    )?);
    let margin_percent = checked(
        "sale_price",
        net_revenue
            .checked_div(input.sale_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
    )?
    .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    Ok(FeeBreakdown {
        listing_fee,
        transaction_fee,
        payment_processing_fee,
        offsite_ads_fee,
        total_fees,
        total_costs,
        net_revenue,
        margin: net_revenue,
        margin_percent,
    })
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(price: Decimal, production: Decimal, shipping: Decimal) -> SaleInput {
        SaleInput {
            sale_price: price,
            production_cost: production,
            shipping_cost: shipping,
            offsite_ads_enabled: false,
            offsite_ads_rate: dec!(0.15),
        }
    }

    #[test]
    fn reference_sale_without_offsite_ads() {
        let schedule = FeeSchedule::default();
        let bd = calculate_fees(&schedule, &sale(dec!(29.99), dec!(12.00), dec!(4.00))).unwrap();

        assert_eq!(bd.listing_fee, dec!(0.20));
        assert_eq!(bd.transaction_fee, dec!(2.21));
        assert_eq!(bd.payment_processing_fee, dec!(1.27));
        assert_eq!(bd.offsite_ads_fee, dec!(0));
        assert_eq!(bd.total_fees, dec!(3.68));
        assert_eq!(bd.total_costs, dec!(16.00));
        assert_eq!(bd.net_revenue, dec!(10.31));
        assert_eq!(bd.margin, bd.net_revenue);
        assert_eq!(bd.margin_percent, dec!(34.4));
    }

    #[test]
    fn offsite_ads_standard_and_reduced() {
        let schedule = FeeSchedule::default();

        let mut input = sale(dec!(29.99), dec!(12.00), dec!(4.00));
        input.offsite_ads_enabled = true;
        input.offsite_ads_rate = schedule.offsite_ads_rate(OffsiteAdsTier::Standard);
        let bd = calculate_fees(&schedule, &input).unwrap();
        // 29.99 * 0.15 = 4.4985
        assert_eq!(bd.offsite_ads_fee, dec!(4.50));
        assert_eq!(bd.total_fees, dec!(8.18));
        assert_eq!(bd.net_revenue, dec!(5.81));

        input.offsite_ads_rate = schedule.offsite_ads_rate(OffsiteAdsTier::Reduced);
        let bd = calculate_fees(&schedule, &input).unwrap();
        // 29.99 * 0.12 = 3.5988
        assert_eq!(bd.offsite_ads_fee, dec!(3.60));
        assert_eq!(bd.total_fees, dec!(7.28));
        assert_eq!(bd.net_revenue, dec!(6.71));
    }

    #[test]
    fn offsite_rate_ignored_when_disabled() {
        let schedule = FeeSchedule::default();
        let mut input = sale(dec!(50), dec!(0), dec!(0));
        input.offsite_ads_rate = dec!(0.99);
        let bd = calculate_fees(&schedule, &input).unwrap();
        assert_eq!(bd.offsite_ads_fee, Decimal::ZERO);
    }

    #[test]
    fn zero_sale_has_no_fees_and_no_division() {
        let schedule = FeeSchedule::default();
        let bd = calculate_fees(&schedule, &sale(dec!(0), dec!(0), dec!(0))).unwrap();

        assert_eq!(bd.listing_fee, Decimal::ZERO);
        assert_eq!(bd.transaction_fee, Decimal::ZERO);
        assert_eq!(bd.payment_processing_fee, Decimal::ZERO);
        assert_eq!(bd.offsite_ads_fee, Decimal::ZERO);
        assert_eq!(bd.total_fees, Decimal::ZERO);
        assert_eq!(bd.net_revenue, Decimal::ZERO);
        assert_eq!(bd.margin_percent, Decimal::ZERO);
    }

    #[test]
    fn zero_sale_with_costs_is_a_loss() {
        let schedule = FeeSchedule::default();
        let bd = calculate_fees(&schedule, &sale(dec!(0), dec!(5), dec!(2.5))).unwrap();
        assert_eq!(bd.net_revenue, dec!(-7.50));
        assert_eq!(bd.margin_percent, Decimal::ZERO);
    }

    #[test]
    fn negative_inputs_name_the_field() {
        let schedule = FeeSchedule::default();

        let cases = [
            (sale(dec!(-1), dec!(0), dec!(0)), "sale_price"),
            (sale(dec!(10), dec!(-0.01), dec!(0)), "production_cost"),
            (sale(dec!(10), dec!(0), dec!(-3)), "shipping_cost"),
        ];
        for (input, expected) in cases {
            match calculate_fees(&schedule, &input) {
                Err(DomainError::InvalidInput { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidInput for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn offsite_rate_out_of_range_is_rejected() {
        let schedule = FeeSchedule::default();
        let mut input = sale(dec!(10), dec!(0), dec!(0));
        input.offsite_ads_enabled = true;
        input.offsite_ads_rate = dec!(15);
        assert!(matches!(
            calculate_fees(&schedule, &input),
            Err(DomainError::InvalidInput { field: "offsite_ads_rate", .. })
        ));
    }

    #[test]
    fn total_is_sum_of_components() {
        let schedule = FeeSchedule::default();
        let prices = [dec!(0.01), dec!(1.99), dec!(12.345), dec!(29.99), dec!(100), dec!(2499.95)];
        let shipping = [dec!(0), dec!(0.99), dec!(4), dec!(17.25)];

        for price in prices {
            for ship in shipping {
                for offsite in [false, true] {
                    let mut input = sale(price, dec!(3), ship);
                    input.offsite_ads_enabled = offsite;
                    let bd = calculate_fees(&schedule, &input).unwrap();
                    assert_eq!(
                        bd.total_fees,
                        bd.listing_fee
                            + bd.transaction_fee
                            + bd.payment_processing_fee
                            + bd.offsite_ads_fee
                    );
                    assert_eq!(bd.total_fees, round_money(bd.total_fees));
                }
            }
        }
    }

    #[test]
    fn amounts_above_the_cap_are_rejected() {
        let schedule = FeeSchedule::default();

        let cases = [
            (sale(dec!(0.01), Decimal::from_i128_with_scale(10_i128.pow(27), 0), dec!(0)), "production_cost"),
            (sale(Decimal::MAX, dec!(0), dec!(0)), "sale_price"),
            (sale(dec!(10), dec!(0), MAX_AMOUNT + dec!(0.01)), "shipping_cost"),
        ];
        for (input, expected) in cases {
            match calculate_fees(&schedule, &input) {
                Err(DomainError::InvalidInput { field, reason }) => {
                    assert_eq!(field, expected);
                    assert_eq!(reason, "amount too large");
                }
                other => panic!("expected InvalidInput for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn extreme_but_valid_amounts_do_not_overflow() {
        let schedule = FeeSchedule::default();

        let bd = calculate_fees(&schedule, &sale(dec!(0.01), MAX_AMOUNT, MAX_AMOUNT)).unwrap();
        assert_eq!(bd.total_costs, dec!(2000000000));
        assert!(bd.margin_percent < Decimal::ZERO);

        let mut input = sale(MAX_AMOUNT, MAX_AMOUNT, MAX_AMOUNT);
        input.offsite_ads_enabled = true;
        assert!(calculate_fees(&schedule, &input).is_ok());

        // Sub-cent price: the margin ratio overflows and is reported, not panicked on
        let tiny = Decimal::new(1, 28);
        assert!(matches!(
            calculate_fees(&schedule, &sale(tiny, MAX_AMOUNT, dec!(0))),
            Err(DomainError::InvalidInput { .. })
        ));
    }

    #[test]
    fn calculation_is_deterministic() {
        let schedule = FeeSchedule::default();
        let input = sale(dec!(42.42), dec!(7.77), dec!(3.33));
        assert_eq!(
            calculate_fees(&schedule, &input).unwrap(),
            calculate_fees(&schedule, &input).unwrap()
        );
    }

    #[test]
    fn margin_percent_rounds_to_one_place() {
        let schedule = FeeSchedule::default();
        // fees: 0.20 + 6.50 + 3.25 = 9.95, net 90.05
        let bd = calculate_fees(&schedule, &sale(dec!(100), dec!(0), dec!(0))).unwrap();
        assert_eq!(bd.total_fees, dec!(9.95));
        assert_eq!(bd.net_revenue, dec!(90.05));
        assert_eq!(bd.margin_percent, dec!(90.1));
    }

    #[test]
    fn schedule_validation() {
        assert!(FeeSchedule::default().validate().is_ok());

        let mut schedule = FeeSchedule::default();
        schedule.transaction_rate = dec!(6.5);
        assert!(matches!(
            schedule.validate(),
            Err(DomainError::InvalidInput { field: "transaction_rate", .. })
        ));

        let mut schedule = FeeSchedule::default();
        schedule.listing_fee = dec!(-0.20);
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn tier_display() {
        assert_eq!(OffsiteAdsTier::Standard.to_string(), "standard");
        assert_eq!(OffsiteAdsTier::Reduced.to_string(), "reduced");
    }
}
