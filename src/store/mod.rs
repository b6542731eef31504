//! Storage ports for the distribution workflow.
//!
//! Order and producer rows are owned by the surrounding platform; the
//! store exposes only the cost columns the calculator needs.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::payment::{NewPayment, PaymentRecord};
use crate::Result;

pub mod postgres;
pub use postgres::PgPaymentStore;

/// Cost inputs read from an order row. `shipping_cost` is what the customer
/// was charged for shipping, already included in `total_amount`.
#[derive(Clone, Copy, Debug)]
pub struct OrderCosts {
    pub total_amount: Decimal,
    pub shipping_cost: Decimal,
}

/// Cost inputs read from a producer row. `shipping_cost` is the producer's
/// own shipping charge, deducted from the payout when present.
#[derive(Clone, Copy, Debug)]
pub struct ProducerCosts {
    pub base_cost: Decimal,
    pub shipping_cost: Option<Decimal>,
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn order_costs(&self, order_id: Uuid) -> Result<Option<OrderCosts>>;

    async fn producer_costs(&self, producer_id: Uuid) -> Result<Option<ProducerCosts>>;

    /// Inserts a pending payment. Returns `None` when the order already has
    /// a payment record (one distribution per order).
    async fn insert_payment(&self, new: NewPayment) -> Result<Option<PaymentRecord>>;

    async fn payment(&self, id: Uuid) -> Result<Option<PaymentRecord>>;

    async fn list_payments(&self, limit: i64, offset: i64) -> Result<(Vec<PaymentRecord>, i64)>;
}
