//! Payment records created by a distribution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::breakdown::CostBreakdown;

/// Lifecycle of a payment record. Distribution creates records as
/// `Pending`; later transitions are driven by order-fulfillment workflows
/// outside this service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Insert payload for a distribution. Snapshot of the breakdown at
/// computation time.
#[derive(Clone, Debug)]
pub struct NewPayment {
    pub order_id: Uuid,
    pub producer_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub producer_cost: Decimal,
    pub shipping_cost: Decimal,
    pub platform_fee: Decimal,
    pub payment_gateway_fee: Decimal,
    pub net_payout: Decimal,
}

impl NewPayment {
    pub fn from_breakdown(user_id: Uuid, order_id: Uuid, producer_id: Uuid, breakdown: &CostBreakdown) -> Self {
        Self {
            order_id,
            producer_id,
            user_id,
            amount: breakdown.base_price,
            producer_cost: breakdown.producer_cost,
            shipping_cost: breakdown.shipping_cost,
            platform_fee: breakdown.platform_fee,
            payment_gateway_fee: breakdown.payment_gateway_fee,
            net_payout: breakdown.net_payout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub producer_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub producer_cost: Decimal,
    pub shipping_cost: Decimal,
    pub platform_fee: Decimal,
    pub payment_gateway_fee: Decimal,
    pub net_payout: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
