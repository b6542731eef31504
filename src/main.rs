//! Marketplace Payout Service - payment distribution over marketplace orders

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use payout_service::distribution::{distribute_payment, DistributionConfig};
use payout_service::domain::breakdown::{BreakdownLine, CostBreakdown};
use payout_service::domain::events::{DomainEvent, PaymentEvent};
use payout_service::domain::payment::PaymentRecord;
use payout_service::domain::value_objects::FeeRate;
use payout_service::store::{PaymentStore, PgPaymentStore};
use payout_service::PayoutError;

#[derive(Clone)]
pub struct AppState {
    pub store: PgPaymentStore,
    pub config: DistributionConfig,
    pub nats: Option<async_nats::Client>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match std::env::var("NATS_URL") {
        Ok(url) => async_nats::connect(&url).await.ok(),
        Err(_) => None,
    };
    let config = DistributionConfig::from_env()?;
    let state = AppState { store: PgPaymentStore::new(db), config, nats };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "payout-service"})) }))
        .route("/api/v1/payouts/preview", post(preview_payout))
        .route("/api/v1/payouts/distribute", post(distribute))
        .route("/api/v1/payouts", get(list_payouts))
        .route("/api/v1/payouts/:id", get(get_payout))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8086".to_string());
    tracing::info!("payout service listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

fn fraction(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value >= Decimal::ONE {
        return Err(ValidationError::new("rate_out_of_range"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[validate(custom = "non_negative")]
    pub base_price: Decimal,
    #[validate(custom = "non_negative")]
    pub producer_cost: Decimal,
    #[validate(custom = "non_negative")]
    pub shipping_cost: Decimal,
    #[validate(custom = "fraction")]
    pub platform_fee_rate: Option<Decimal>,
    #[validate(custom = "fraction")]
    pub payment_gateway_fee_rate: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    pub lines: Vec<BreakdownLine>,
    pub negative_payout: bool,
}

async fn preview_payout(
    State(s): State<AppState>,
    Json(r): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, PayoutError> {
    r.validate().map_err(|e| PayoutError::InvalidInput(e.to_string()))?;
    let platform = match r.platform_fee_rate {
        Some(v) => FeeRate::new(v).map_err(|e| PayoutError::InvalidInput(e.to_string()))?,
        None => s.config.platform_rate,
    };
    let gateway = match r.payment_gateway_fee_rate {
        Some(v) => FeeRate::new(v).map_err(|e| PayoutError::InvalidInput(e.to_string()))?,
        None => s.config.payment_gateway_rate,
    };
    let breakdown = CostBreakdown::calculate(r.base_price, r.producer_cost, r.shipping_cost, platform, gateway);
    Ok(Json(PreviewResponse {
        lines: breakdown.lines(),
        negative_payout: breakdown.is_negative(),
        breakdown,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DistributeRequest {
    pub order_id: Uuid,
    pub producer_id: Uuid,
}

async fn distribute(
    State(s): State<AppState>,
    headers: HeaderMap,
    Json(r): Json<DistributeRequest>,
) -> Result<(StatusCode, Json<PaymentRecord>), PayoutError> {
    let user_id = bearer_user(&headers)?;
    let record = distribute_payment(&s.store, s.config, user_id, r.order_id, r.producer_id).await?;
    publish_distributed(&s, &record).await;
    Ok((StatusCode::CREATED, Json(record)))
}

// The edge gateway validates tokens upstream; the token body carries the
// acting user's id.
fn bearer_user(headers: &HeaderMap) -> Result<Uuid, PayoutError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| PayoutError::InvalidInput("missing bearer token".into()))?;
    Uuid::parse_str(token.trim()).map_err(|_| PayoutError::InvalidInput("malformed bearer token".into()))
}

async fn publish_distributed(state: &AppState, record: &PaymentRecord) {
    let Some(nats) = &state.nats else { return };
    let event = DomainEvent::Payment(PaymentEvent::Distributed {
        payment_id: record.id,
        order_id: record.order_id,
        producer_id: record.producer_id,
        net_payout: record.net_payout,
    });
    match serde_json::to_vec(&event) {
        Ok(payload) => {
            if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!("event publish failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("event encode failed: {}", e),
    }
}

async fn list_payouts(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<PaymentRecord>>, PayoutError> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let (data, total) = s
        .store
        .list_payments(per_page as i64, list_offset(page, per_page))
        .await?;
    Ok(Json(PaginatedResponse { data, total, page }))
}

// i64 arithmetic: a huge page query parameter must not overflow u32.
fn list_offset(page: u32, per_page: u32) -> i64 {
    (page as i64 - 1) * per_page as i64
}

async fn get_payout(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<PaymentRecord>, PayoutError> {
    s.store.payment(id).await?.map(Json).ok_or(PayoutError::PaymentNotFound)
}
