//! Postgres-backed payment store.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{OrderCosts, PaymentStore, ProducerCosts};
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use crate::Result;

#[derive(Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn order_costs(&self, order_id: Uuid) -> Result<Option<OrderCosts>> {
        let row: Option<(Decimal, Decimal)> =
            sqlx::query_as("SELECT total_amount, shipping_cost FROM orders WHERE id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(total_amount, shipping_cost)| OrderCosts { total_amount, shipping_cost }))
    }

    async fn producer_costs(&self, producer_id: Uuid) -> Result<Option<ProducerCosts>> {
        let row: Option<(Decimal, Option<Decimal>)> =
            sqlx::query_as("SELECT base_cost, shipping_cost FROM producers WHERE id = $1")
                .bind(producer_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(base_cost, shipping_cost)| ProducerCosts { base_cost, shipping_cost }))
    }

    async fn insert_payment(&self, new: NewPayment) -> Result<Option<PaymentRecord>> {
        // UNIQUE(order_id) + DO NOTHING: a duplicate distribution returns no
        // row instead of racing a read-then-write check.
        let record = sqlx::query_as::<_, PaymentRecord>(
            "INSERT INTO payments (id, order_id, producer_id, user_id, amount, producer_cost, shipping_cost, platform_fee, payment_gateway_fee, net_payout, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW()) \
             ON CONFLICT (order_id) DO NOTHING RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(new.order_id)
        .bind(new.producer_id)
        .bind(new.user_id)
        .bind(new.amount)
        .bind(new.producer_cost)
        .bind(new.shipping_cost)
        .bind(new.platform_fee)
        .bind(new.payment_gateway_fee)
        .bind(new.net_payout)
        .bind(PaymentStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn payment(&self, id: Uuid) -> Result<Option<PaymentRecord>> {
        let record = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list_payments(&self, limit: i64, offset: i64) -> Result<(Vec<PaymentRecord>, i64)> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            "SELECT * FROM payments ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok((records, total.0))
    }
}
