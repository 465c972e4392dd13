//! In-memory stand-in for the DVD rental backend.
//!
//! Routes mirror the production API under `/api`, with `/health` at the
//! root. State lives in a single `RwLock<Store>`; handlers read the wall
//! clock once per request and hand it to the store.

pub mod reports;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;

use reports::{CustomerRentalsParams, EarningsParams, PageQuery, TopFilmsParams, UnreturnedParams};
use store::{NewRental, Store, StoreError};

pub type Db = Arc<RwLock<Store>>;

/// Router over a freshly seeded store.
pub fn app() -> Router {
    app_with(Store::seeded(Utc::now()))
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/customers", get(list_customers))
        .route("/customers/search/query", get(search_customers))
        .route("/customers/{id}", get(get_customer))
        .route("/films/available/list", get(available_films))
        .route("/rentals", get(list_rentals).post(create_rental))
        .route("/rentals/{id}", get(get_rental).delete(cancel_rental))
        // POST is kept for older desk clients.
        .route("/rentals/{id}/return", put(return_rental).post(return_rental))
        .route("/reports/customer/{customer_id}/rentals", get(customer_rentals))
        .route("/reports/unreturned", get(unreturned))
        .route("/reports/top-films", get(top_films))
        .route("/reports/staff-earnings", get(staff_earnings))
        .route("/reports/summary", get(summary));
    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_customers(State(db): State<Db>, Query(query): Query<PageQuery>) -> Json<Value> {
    Json(reports::list_customers(&*db.read().await, &query))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search_customers(
    State(db): State<Db>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, StoreError> {
    reports::search_customers(&*db.read().await, query.q.as_deref()).map(Json)
}

async fn get_customer(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<Value>, StoreError> {
    reports::get_customer(&*db.read().await, id).map(Json)
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<u32>,
}

async fn available_films(State(db): State<Db>, Query(query): Query<LimitQuery>) -> Json<Value> {
    Json(reports::available_films(&*db.read().await, query.limit))
}

async fn list_rentals(State(db): State<Db>, Query(query): Query<PageQuery>) -> Json<Value> {
    Json(reports::list_rentals(&*db.read().await, &query))
}

async fn create_rental(
    State(db): State<Db>,
    Json(input): Json<NewRental>,
) -> Result<(StatusCode, Json<Value>), StoreError> {
    let mut store = db.write().await;
    let rental = store.create_rental(input, Utc::now())?;
    info!(
        rental_id = rental.rental_id,
        inventory_id = rental.inventory_id,
        customer_id = rental.customer_id,
        "rental created"
    );
    let body = json!({
        "success": true,
        "message": "rental created",
        "data": reports::rental_summary(&store, &rental),
    });
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_rental(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<Value>, StoreError> {
    reports::rental_detail(&*db.read().await, id).map(Json)
}

async fn return_rental(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<Value>, StoreError> {
    let (rental, payment) = db.write().await.return_rental(id, Utc::now())?;
    info!(rental_id = id, amount = payment.amount, "rental returned");
    Ok(Json(reports::return_receipt(&rental, &payment)))
}

async fn cancel_rental(State(db): State<Db>, Path(id): Path<u32>) -> Result<Json<Value>, StoreError> {
    db.write().await.cancel_rental(id)?;
    info!(rental_id = id, "rental cancelled");
    Ok(Json(json!({
        "success": true,
        "message": "rental cancelled",
        "data": { "rental_id": id, "cancelled_at": Utc::now() },
    })))
}

async fn customer_rentals(
    State(db): State<Db>,
    Path(customer_id): Path<u32>,
    Query(params): Query<CustomerRentalsParams>,
) -> Result<Json<Value>, StoreError> {
    reports::customer_rentals(&*db.read().await, customer_id, &params, Utc::now()).map(Json)
}

async fn unreturned(State(db): State<Db>, Query(params): Query<UnreturnedParams>) -> Json<Value> {
    Json(reports::unreturned(&*db.read().await, &params, Utc::now()))
}

async fn top_films(State(db): State<Db>, Query(params): Query<TopFilmsParams>) -> Json<Value> {
    Json(reports::top_films(&*db.read().await, &params, Utc::now()))
}

async fn staff_earnings(State(db): State<Db>, Query(params): Query<EarningsParams>) -> Json<Value> {
    Json(reports::staff_earnings(&*db.read().await, &params))
}

async fn summary(State(db): State<Db>) -> Json<Value> {
    Json(reports::summary(&*db.read().await))
}
