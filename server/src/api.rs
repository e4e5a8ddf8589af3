//! # REST API
//!
//! Builds the axum router that exposes the storefront's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                                         | Description                      |
//! |--------|----------------------------------------------|----------------------------------|
//! | GET    | `/health`                                    | Liveness probe                   |
//! | POST   | `/api/validate-ordinal`                      | Ownership check for an ordinal   |
//! | GET    | `/api/mint-candidates/:collectionName`       | Random unminted collectible      |
//! | POST   | `/api/mint`                                  | Mint a collectible               |
//! | GET    | `/api/transaction/:txId`                     | Transaction status               |
//! | GET    | `/api/collection/:collectionName/stats`      | Supply statistics                |
//! | GET    | `/api/collection/:collectionName/items`      | Paginated items (`page`, `limit`)|
//! | GET    | `/api/wallet/:walletAddress/transactions`    | Mints made by a wallet           |
//!
//! ## Envelopes
//!
//! Every body carries a `success` boolean, except `validate-ordinal` which
//! uses `isValid`. Failures add a fixed human-readable `message`; there are
//! no field-level details or error codes.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use ordmint_core::allocation::pick_unminted;
use ordmint_core::catalog::{paginate, CollectionStats, PageRequest, Pagination};
use ordmint_core::ownership::OwnershipOracle;
use ordmint_core::txid::generate_tx_id;
use ordmint_core::{
    Collectible, EntityStore, StoreError, Transaction, TransactionSimulator, TransactionStatus,
};

use crate::metrics::{reject, SharedMetrics};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

const ORDINAL_NOT_FOUND: &str = "Ordinal not found";
const NO_CANDIDATES: &str = "No unminted ordinals available in this collection";
const TRANSACTION_NOT_FOUND: &str = "Transaction not found";
const COLLECTION_NOT_FOUND: &str = "Collection not found";
const INTERNAL_ERROR: &str = "Internal server error";

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Collectibles and transactions.
    pub store: Arc<EntityStore>,
    /// Advances minted transactions to `completed`.
    pub simulator: TransactionSimulator,
    /// External ownership check for `validate-ordinal`.
    pub oracle: Arc<dyn OwnershipOracle>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, panic
/// handling and tracing.
pub fn create_router(state: AppState) -> Router {
    with_middleware(routes(), state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/validate-ordinal", post(validate_ordinal_handler))
        .route(
            "/api/mint-candidates/:collection_name",
            get(mint_candidate_handler),
        )
        .route("/api/mint", post(mint_handler))
        .route("/api/transaction/:tx_id", get(transaction_handler))
        .route(
            "/api/collection/:collection_name/stats",
            get(collection_stats_handler),
        )
        .route(
            "/api/collection/:collection_name/items",
            get(collection_items_handler),
        )
        .route(
            "/api/wallet/:wallet_address/transactions",
            get(wallet_transactions_handler),
        )
}

fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AnyOrigin);

    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turns a handler panic into the generic 500 envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");
    ApiError::Internal(INTERNAL_ERROR).into_response()
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Body of `POST /api/validate-ordinal`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOrdinalRequest {
    pub ordinal_id: String,
    pub wallet_address: String,
}

/// Body of `POST /api/mint`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub wallet_address: String,
    pub ordinal_id: String,
    /// Fee details reported by the wallet. Logged, not enforced. May be
    /// omitted, but an explicit `null` is rejected.
    #[serde(default, deserialize_with = "present_tx_details")]
    pub tx_details: Option<TxDetails>,
}

fn present_tx_details<'de, D>(deserializer: D) -> Result<Option<TxDetails>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    TxDetails::deserialize(deserializer).map(Some)
}

/// Optional wallet-side fee information attached to a mint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TxDetails {
    pub fee: f64,
}

/// Query string of `GET /api/collection/:name/items`. Raw strings so that
/// garbage falls back to defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Ordinal as returned by a successful validation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdinalSummary {
    pub ordinal_id: String,
    pub collection_name: String,
    pub image_url: String,
}

/// Response payload for `POST /api/validate-ordinal`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<OrdinalSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A collectible offered for minting.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintCandidate {
    pub ordinal_id: String,
    pub collection_name: String,
    pub image_url: String,
    pub name: String,
    pub mint_fee: u64,
}

impl From<Collectible> for MintCandidate {
    fn from(c: Collectible) -> Self {
        Self {
            ordinal_id: c.ordinal_id,
            collection_name: c.collection_name,
            image_url: c.image_url,
            name: c.metadata.name,
            mint_fee: c.mint_fee,
        }
    }
}

/// Response payload for `GET /api/mint-candidates/:collectionName`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub success: bool,
    pub ordinal: MintCandidate,
}

/// The transaction created by a mint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedTransaction {
    pub tx_id: String,
    pub status: TransactionStatus,
}

/// Response payload for `POST /api/mint`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MintResponse {
    pub success: bool,
    pub transaction: MintedTransaction,
}

/// Transaction status as polled by the client.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub tx_id: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            tx_id: tx.tx_id,
            status: tx.status,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

/// Response payload for `GET /api/transaction/:txId`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: TransactionView,
}

/// Response payload for `GET /api/collection/:name/stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: CollectionStats,
}

/// One row of a collection listing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub ordinal_id: String,
    pub name: String,
    pub image_url: String,
    pub mint_fee: u64,
    pub is_minted: bool,
}

impl From<Collectible> for ItemView {
    fn from(c: Collectible) -> Self {
        Self {
            ordinal_id: c.ordinal_id,
            name: c.metadata.name,
            image_url: c.image_url,
            mint_fee: c.mint_fee,
            is_minted: c.is_minted,
        }
    }
}

/// Response payload for `GET /api/collection/:name/items`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub success: bool,
    pub items: Vec<ItemView>,
    pub pagination: Pagination,
}

/// A wallet's transaction, including which collectible it minted.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransactionView {
    pub tx_id: String,
    pub ordinal_id: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for WalletTransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            tx_id: tx.tx_id,
            ordinal_id: tx.ordinal_id,
            status: tx.status,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

/// Response payload for `GET /api/wallet/:walletAddress/transactions`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletTransactionsResponse {
    pub success: bool,
    pub transactions: Vec<WalletTransactionView>,
}

/// Generic failure body returned by `success`-envelope endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything a handler can fail with. Rendered as `{success:false, message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body missing, malformed, or the wrong shape.
    #[error("Invalid request data")]
    InvalidRequest,
    /// Entity lookup came back empty.
    #[error("{0}")]
    NotFound(&'static str),
    /// The oracle says the wallet does not hold the ordinal.
    #[error("You don't own this ordinal")]
    NotOwner,
    /// The collectible was minted by an earlier request.
    #[error("This ordinal has already been minted")]
    AlreadyMinted,
    /// Anything unexpected.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest | ApiError::AlreadyMinted => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotOwner => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for `mint_rejections_total`.
    fn rejection_reason(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest => reject::INVALID_REQUEST,
            ApiError::NotFound(_) => reject::NOT_FOUND,
            ApiError::AlreadyMinted => reject::ALREADY_MINTED,
            ApiError::NotOwner | ApiError::Internal(_) => reject::INTERNAL,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::CollectibleNotFound(_) => ApiError::NotFound(ORDINAL_NOT_FOUND),
            StoreError::AlreadyMinted(_) => ApiError::AlreadyMinted,
            StoreError::TransactionNotFound(_) => ApiError::NotFound(TRANSACTION_NOT_FOUND),
            other => {
                tracing::error!(error = %other, "unexpected store error");
                ApiError::Internal(INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// An [`ApiError`] rendered in the `{isValid:false, message}` envelope.
#[derive(Debug)]
pub struct ValidationFailure(pub ApiError);

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        let body = ValidationResponse {
            is_valid: false,
            ordinal: None,
            message: Some(self.0.to_string()),
        };
        (self.0.status(), Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: returns 200 if the server is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `POST /api/validate-ordinal`: confirms the ordinal exists and that the
/// wallet owns it.
async fn validate_ordinal_handler(
    State(state): State<AppState>,
    payload: Result<Json<ValidateOrdinalRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>, ValidationFailure> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected validate-ordinal body");
        ValidationFailure(ApiError::InvalidRequest)
    })?;

    let ordinal = state
        .store
        .get(&req.ordinal_id)
        .ok_or(ValidationFailure(ApiError::NotFound(ORDINAL_NOT_FOUND)))?;

    state.metrics.ownership_validations_total.inc();
    if !state
        .oracle
        .is_owner(&req.ordinal_id, &req.wallet_address)
        .await
    {
        return Err(ValidationFailure(ApiError::NotOwner));
    }

    Ok(Json(ValidationResponse {
        is_valid: true,
        ordinal: Some(OrdinalSummary {
            ordinal_id: ordinal.ordinal_id,
            collection_name: ordinal.collection_name,
            image_url: ordinal.image_url,
        }),
        message: None,
    }))
}

/// `GET /api/mint-candidates/:collectionName`: a random unminted
/// collectible. Not reserved; see [`pick_unminted`].
async fn mint_candidate_handler(
    Path(collection_name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CandidateResponse>, ApiError> {
    let candidate = pick_unminted(&state.store, &collection_name, &mut rand::thread_rng())
        .ok_or(ApiError::NotFound(NO_CANDIDATES))?;

    state.metrics.candidates_served_total.inc();
    Ok(Json(CandidateResponse {
        success: true,
        ordinal: candidate.into(),
    }))
}

/// `POST /api/mint`: mints a collectible and starts its simulated
/// confirmation.
async fn mint_handler(
    State(state): State<AppState>,
    payload: Result<Json<MintRequest>, JsonRejection>,
) -> Result<Json<MintResponse>, ApiError> {
    let started = Instant::now();
    state.metrics.mint_requests_total.inc();

    let result = mint(&state, payload);
    state
        .metrics
        .mint_latency_seconds
        .observe(started.elapsed().as_secs_f64());

    match result {
        Ok(resp) => Ok(Json(resp)),
        Err(e) => {
            state.metrics.reject_mint(e.rejection_reason());
            Err(e)
        }
    }
}

fn mint(
    state: &AppState,
    payload: Result<Json<MintRequest>, JsonRejection>,
) -> Result<MintResponse, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected mint body");
        ApiError::InvalidRequest
    })?;

    if let Some(details) = &req.tx_details {
        tracing::debug!(fee = details.fee, ordinal_id = %req.ordinal_id, "wallet fee details");
    }

    let tx_id = generate_tx_id();
    let (_, tx) = state
        .store
        .mint(&req.ordinal_id, &req.wallet_address, &tx_id)?;

    state.simulator.schedule(&tx.tx_id);
    state.metrics.mints_total.inc();
    state
        .metrics
        .simulations_in_flight
        .set(state.simulator.in_flight() as i64);

    Ok(MintResponse {
        success: true,
        transaction: MintedTransaction {
            tx_id: tx.tx_id,
            status: tx.status,
        },
    })
}

/// `GET /api/transaction/:txId`: current status of a transaction.
async fn transaction_handler(
    Path(tx_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let tx = state
        .store
        .get_transaction(&tx_id)
        .ok_or(ApiError::NotFound(TRANSACTION_NOT_FOUND))?;

    state
        .metrics
        .simulations_in_flight
        .set(state.simulator.in_flight() as i64);

    Ok(Json(TransactionResponse {
        success: true,
        transaction: tx.into(),
    }))
}

/// `GET /api/collection/:collectionName/stats`: supply statistics.
async fn collection_stats_handler(
    Path(collection_name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let items = state.store.list_by_collection(&collection_name);
    let stats = CollectionStats::compute(&collection_name, &items)
        .ok_or(ApiError::NotFound(COLLECTION_NOT_FOUND))?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// `GET /api/collection/:collectionName/items?page&limit`: one page of the
/// collection in listing order.
async fn collection_items_handler(
    Path(collection_name): Path<String>,
    Query(query): Query<ItemsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let all = state.store.list_by_collection(&collection_name);
    if all.is_empty() {
        return Err(ApiError::NotFound(COLLECTION_NOT_FOUND));
    }

    let request = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());
    let page = paginate(&all, request);

    Ok(Json(ItemsResponse {
        success: true,
        items: page.items.into_iter().map(ItemView::from).collect(),
        pagination: page.pagination,
    }))
}

/// `GET /api/wallet/:walletAddress/transactions`: every mint made by a
/// wallet, oldest first. Unknown wallets get an empty list.
async fn wallet_transactions_handler(
    Path(wallet_address): Path<String>,
    State(state): State<AppState>,
) -> Json<WalletTransactionsResponse> {
    let transactions = state
        .store
        .transactions_by_wallet(&wallet_address)
        .into_iter()
        .map(WalletTransactionView::from)
        .collect();

    Json(WalletTransactionsResponse {
        success: true,
        transactions,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
