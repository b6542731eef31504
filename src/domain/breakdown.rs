//! Cost/payout breakdown arithmetic.
//!
//! A pure decimal projection of an order's charged amount into fees and the
//! producer's net payout. No rounding happens here; presentation helpers
//! round to 2 decimal places for display only, the stored values stay exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::FeeRate;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub base_price: Decimal,
    pub producer_cost: Decimal,
    pub shipping_cost: Decimal,
    pub platform_fee_rate: Decimal,
    pub payment_gateway_fee_rate: Decimal,
    pub platform_fee: Decimal,
    pub payment_gateway_fee: Decimal,
    pub total_deductions: Decimal,
    pub net_payout: Decimal,
}

impl CostBreakdown {
    /// Projects fees and net payout from the charged amount and pass-through
    /// costs. Accepts any decimal inputs; a negative `net_payout` means the
    /// order was under-priced and is left as-is for downstream flagging.
    pub fn calculate(
        base_price: Decimal,
        producer_cost: Decimal,
        shipping_cost: Decimal,
        platform_rate: FeeRate,
        payment_gateway_rate: FeeRate,
    ) -> Self {
        let platform_fee = base_price * platform_rate.value();
        let payment_gateway_fee = base_price * payment_gateway_rate.value();
        let total_deductions = producer_cost + shipping_cost + platform_fee + payment_gateway_fee;
        let net_payout = base_price - total_deductions;
        tracing::debug!(%base_price, %total_deductions, %net_payout, "calculated payout breakdown");
        Self {
            base_price,
            producer_cost,
            shipping_cost,
            platform_fee_rate: platform_rate.value(),
            payment_gateway_fee_rate: payment_gateway_rate.value(),
            platform_fee,
            payment_gateway_fee,
            total_deductions,
            net_payout,
        }
    }

    pub fn with_default_rates(base_price: Decimal, producer_cost: Decimal, shipping_cost: Decimal) -> Self {
        Self::calculate(
            base_price,
            producer_cost,
            shipping_cost,
            FeeRate::platform_default(),
            FeeRate::payment_gateway_default(),
        )
    }

    pub fn is_negative(&self) -> bool {
        self.net_payout < Decimal::ZERO
    }

    /// Presentation lines: deductions carried as negative contributions,
    /// net payout last.
    pub fn lines(&self) -> Vec<BreakdownLine> {
        vec![
            BreakdownLine::new("Base price", self.base_price),
            BreakdownLine::new("Producer cost", -self.producer_cost),
            BreakdownLine::new("Shipping", -self.shipping_cost),
            BreakdownLine::new("Platform fee", -self.platform_fee),
            BreakdownLine::new("Payment gateway fee", -self.payment_gateway_fee),
            BreakdownLine::new("Net payout", self.net_payout),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreakdownLine {
    pub label: &'static str,
    pub amount: Decimal,
}

impl BreakdownLine {
    fn new(label: &'static str, amount: Decimal) -> Self {
        Self { label, amount }
    }

    /// Fixed 2-decimal rendering for display; the `amount` field itself
    /// keeps full precision.
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }
}
