//! Payment distribution orchestration.
//!
//! Reads the order's charged total and the producer's pass-through costs,
//! projects the fee breakdown, and records a pending payment. One payment
//! per order: a second distribution for the same order is rejected by the
//! storage layer's uniqueness guarantee.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::domain::breakdown::CostBreakdown;
use crate::domain::payment::{NewPayment, PaymentRecord};
use crate::domain::value_objects::FeeRate;
use crate::store::PaymentStore;
use crate::{PayoutError, Result};

/// Fee rates applied to every distribution.
#[derive(Clone, Copy, Debug)]
pub struct DistributionConfig {
    pub platform_rate: FeeRate,
    pub payment_gateway_rate: FeeRate,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            platform_rate: FeeRate::platform_default(),
            payment_gateway_rate: FeeRate::payment_gateway_default(),
        }
    }
}

impl DistributionConfig {
    /// Reads `PLATFORM_FEE_RATE` / `GATEWAY_FEE_RATE` overrides from the
    /// environment; unset variables keep the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(rate) = rate_from_env("PLATFORM_FEE_RATE")? {
            config.platform_rate = rate;
        }
        if let Some(rate) = rate_from_env("GATEWAY_FEE_RATE")? {
            config.payment_gateway_rate = rate;
        }
        Ok(config)
    }
}

fn rate_from_env(var: &str) -> Result<Option<FeeRate>> {
    let Ok(raw) = std::env::var(var) else { return Ok(None) };
    let value: Decimal = raw
        .trim()
        .parse()
        .map_err(|e| PayoutError::InvalidInput(format!("{}: {}", var, e)))?;
    let rate = FeeRate::new(value).map_err(|e| PayoutError::InvalidInput(format!("{}: {}", var, e)))?;
    Ok(Some(rate))
}

/// Distributes an order's payment to its producer: fetches both rows,
/// computes the breakdown, and persists a pending record.
///
/// The order's own shipping line is customer-paid revenue already inside
/// `total_amount` and is not deducted; only a producer-declared shipping
/// charge reduces the payout.
pub async fn distribute_payment<S: PaymentStore + ?Sized>(
    store: &S,
    config: DistributionConfig,
    user_id: Uuid,
    order_id: Uuid,
    producer_id: Uuid,
) -> Result<PaymentRecord> {
    let order = store.order_costs(order_id).await?.ok_or(PayoutError::OrderNotFound)?;
    let producer = store
        .producer_costs(producer_id)
        .await?
        .ok_or(PayoutError::ProducerNotFound)?;

    let shipping = producer.shipping_cost.unwrap_or(Decimal::ZERO);
    let breakdown = CostBreakdown::calculate(
        order.total_amount,
        producer.base_cost,
        shipping,
        config.platform_rate,
        config.payment_gateway_rate,
    );

    let record = store
        .insert_payment(NewPayment::from_breakdown(user_id, order_id, producer_id, &breakdown))
        .await?
        .ok_or(PayoutError::AlreadyDistributed)?;

    info!(
        payment_id = %record.id,
        %order_id,
        %producer_id,
        order_shipping = %order.shipping_cost,
        net_payout = %record.net_payout,
        "payment distributed"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{OrderCosts, ProducerCosts};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemStore {
        orders: HashMap<Uuid, OrderCosts>,
        producers: HashMap<Uuid, ProducerCosts>,
        payments: Mutex<Vec<PaymentRecord>>,
    }

    impl MemStore {
        fn payment_count(&self) -> usize {
            self.payments.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl PaymentStore for MemStore {
        async fn order_costs(&self, order_id: Uuid) -> crate::Result<Option<OrderCosts>> {
            Ok(self.orders.get(&order_id).copied())
        }

        async fn producer_costs(&self, producer_id: Uuid) -> crate::Result<Option<ProducerCosts>> {
            Ok(self.producers.get(&producer_id).copied())
        }

        async fn insert_payment(&self, new: NewPayment) -> crate::Result<Option<PaymentRecord>> {
            let mut payments = self.payments.lock().unwrap();
            if payments.iter().any(|p| p.order_id == new.order_id) {
                return Ok(None);
            }
            let now = Utc::now();
            let record = PaymentRecord {
                id: Uuid::now_v7(),
                order_id: new.order_id,
                producer_id: new.producer_id,
                user_id: new.user_id,
                amount: new.amount,
                producer_cost: new.producer_cost,
                shipping_cost: new.shipping_cost,
                platform_fee: new.platform_fee,
                payment_gateway_fee: new.payment_gateway_fee,
                net_payout: new.net_payout,
                status: "pending".into(),
                created_at: now,
                updated_at: now,
            };
            payments.push(record.clone());
            Ok(Some(record))
        }

        async fn payment(&self, id: Uuid) -> crate::Result<Option<PaymentRecord>> {
            Ok(self.payments.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn list_payments(&self, limit: i64, offset: i64) -> crate::Result<(Vec<PaymentRecord>, i64)> {
            let payments = self.payments.lock().unwrap();
            let page = payments
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Ok((page, payments.len() as i64))
        }
    }

    fn seeded_store() -> (MemStore, Uuid, Uuid) {
        let mut store = MemStore::default();
        let order_id = Uuid::new_v4();
        let producer_id = Uuid::new_v4();
        store.orders.insert(
            order_id,
            OrderCosts {
                total_amount: Decimal::new(50, 0),
                shipping_cost: Decimal::new(5, 0),
            },
        );
        store.producers.insert(
            producer_id,
            ProducerCosts {
                base_cost: Decimal::new(20, 0),
                shipping_cost: None,
            },
        );
        (store, order_id, producer_id)
    }

    #[tokio::test]
    async fn test_distribute_persists_pending_record() {
        let (store, order_id, producer_id) = seeded_store();
        let user_id = Uuid::new_v4();

        let record = distribute_payment(&store, DistributionConfig::default(), user_id, order_id, producer_id)
            .await
            .unwrap();

        assert_eq!(record.amount, Decimal::new(50, 0));
        assert_eq!(record.producer_cost, Decimal::new(20, 0));
        assert_eq!(record.platform_fee, Decimal::new(75, 1));
        assert_eq!(record.payment_gateway_fee, Decimal::new(15, 1));
        assert_eq!(record.net_payout, Decimal::new(21, 0));
        assert_eq!(record.status, "pending");
        assert_eq!(record.user_id, user_id);
        assert_eq!(store.payment_count(), 1);
    }

    #[tokio::test]
    async fn test_producer_shipping_reduces_payout() {
        let (mut store, order_id, producer_id) = seeded_store();
        store.producers.get_mut(&producer_id).unwrap().shipping_cost = Some(Decimal::new(3, 0));

        let record = distribute_payment(&store, DistributionConfig::default(), Uuid::new_v4(), order_id, producer_id)
            .await
            .unwrap();

        assert_eq!(record.shipping_cost, Decimal::new(3, 0));
        // 50 - 20 - 3 - 7.5 - 1.5
        assert_eq!(record.net_payout, Decimal::new(18, 0));
    }

    #[tokio::test]
    async fn test_missing_order_writes_nothing() {
        let (store, _, producer_id) = seeded_store();

        let err = distribute_payment(&store, DistributionConfig::default(), Uuid::new_v4(), Uuid::new_v4(), producer_id)
            .await
            .unwrap_err();

        assert!(matches!(err, PayoutError::OrderNotFound));
        assert_eq!(store.payment_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_producer_writes_nothing() {
        let (store, order_id, _) = seeded_store();

        let err = distribute_payment(&store, DistributionConfig::default(), Uuid::new_v4(), order_id, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, PayoutError::ProducerNotFound));
        assert_eq!(store.payment_count(), 0);
    }

    #[tokio::test]
    async fn test_second_distribution_for_same_order_rejected() {
        let (store, order_id, producer_id) = seeded_store();
        let config = DistributionConfig::default();

        distribute_payment(&store, config, Uuid::new_v4(), order_id, producer_id)
            .await
            .unwrap();
        let err = distribute_payment(&store, config, Uuid::new_v4(), order_id, producer_id)
            .await
            .unwrap_err();

        assert!(matches!(err, PayoutError::AlreadyDistributed));
        assert_eq!(store.payment_count(), 1);
    }

    #[test]
    fn test_config_from_env_rejects_bad_rates() {
        // Runs in one test to avoid env races across parallel tests.
        std::env::set_var("PLATFORM_FEE_RATE", "0.20");
        std::env::set_var("GATEWAY_FEE_RATE", "0.025");
        let config = DistributionConfig::from_env().unwrap();
        assert_eq!(config.platform_rate.value(), Decimal::new(20, 2));
        assert_eq!(config.payment_gateway_rate.value(), Decimal::new(25, 3));

        std::env::set_var("PLATFORM_FEE_RATE", "1.5");
        assert!(DistributionConfig::from_env().is_err());

        std::env::set_var("PLATFORM_FEE_RATE", "not-a-number");
        assert!(DistributionConfig::from_env().is_err());

        std::env::remove_var("PLATFORM_FEE_RATE");
        std::env::remove_var("GATEWAY_FEE_RATE");
    }
}
