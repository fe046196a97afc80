use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use stakinghub_core::{calldata, Addresses, Environment, SafeInfo};
use stakinghub_relay::{
    Balance, ChainClient, HistoryRow, HubStore, NodeStatus, PendingRow, ProposedTransaction,
    RelayClient, SafeBalances, Watcher,
};

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct SelectQuery {
    /// Management module of the safe, when known. Needed to recognize
    /// node-onboarding proposals.
    pub module: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// Connected owner; classification of the required user action is
    /// relative to them.
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page_size")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub nonce: u64,
    /// Hash of the replacement transaction, computed wallet-side.
    pub contract_transaction_hash: String,
    pub sender: String,
    pub signature: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    /// Raw token amount in base units, as a decimal string.
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterNodeRequest {
    pub node: String,
    /// Defaults to the deployment's management module.
    pub module: Option<String>,
}

/// A transaction skeleton for the wallet to sign and propose.
#[derive(Debug, Serialize)]
pub struct PreparedTransaction {
    pub to: Address,
    pub value: String,
    pub data: String,
    pub operation: u8,
}

impl PreparedTransaction {
    fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: "0".to_string(),
            data: format!("0x{}", hex::encode(&data)),
            operation: 0,
        }
    }

    fn delegatecall(to: Address, data: Bytes) -> Self {
        Self {
            operation: 1,
            ..Self::call(to, data)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn default_page_size() -> u64 {
    10
}

fn parse_address(value: &str, what: &str) -> Result<Address, ApiError> {
    Address::from_str(value).map_err(|_| ApiError::BadRequest(format!("invalid {what}: {value}")))
}

fn parse_amount(value: &str) -> Result<U256, ApiError> {
    U256::from_str_radix(value, 10)
        .map_err(|_| ApiError::BadRequest(format!("invalid amount: {value}")))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("relay request failed: {0}")]
    Relay(#[from] stakinghub_relay::RelayError),

    #[error("chain read failed: {0}")]
    Chain(#[from] stakinghub_relay::ChainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Relay(_) | ApiError::Chain(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}

// ============================================================================
// Application State
// ============================================================================

struct AppState {
    relay: Arc<RelayClient>,
    chain: Arc<ChainClient>,
    store: Arc<HubStore>,
}

impl AppState {
    fn book(&self) -> &Addresses {
        self.store.book()
    }

    /// Points the store at `safe` unless it is already selected.
    fn ensure_selected(&self, safe: Address, module: Option<Address>) {
        let current = self.store.selected_safe();
        let already = current.is_some_and(|selected| {
            selected.safe_address == safe
                && (module.is_none() || selected.module_address == module)
        });
        if !already {
            self.store.select_safe(safe, module.or(current.and_then(|s| s.module_address)));
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain_id: state.book().chain_id,
    })
}

/// Safes the owner participates in.
async fn owner_safes(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let owner = parse_address(&owner, "owner address")?;
    let safes = state.relay.safes_by_owner(owner).await?;

    let ticket = state.store.with_state(|s| s.safes_by_owner.begin());
    state
        .store
        .with_state(|s| s.safes_by_owner.commit(ticket, safes.clone()));

    Ok(Json(safes))
}

/// Selects a safe and returns its relay info.
async fn safe_info(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
    Query(query): Query<SelectQuery>,
) -> Result<Json<SafeInfo>, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    let module = query
        .module
        .as_deref()
        .map(|m| parse_address(m, "module address"))
        .transpose()?;
    state.ensure_selected(safe, module);

    let ticket = state.store.with_state(|s| s.info.begin());
    match state.relay.safe_info(safe).await {
        Ok(info) => {
            state.store.with_state(|s| s.info.commit(ticket, info.clone()));
            Ok(Json(info))
        }
        Err(err) => {
            state.store.with_state(|s| s.info.abort(ticket));
            Err(err.into())
        }
    }
}

/// Classified pending queue of the safe.
async fn pending(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<PendingRow>>, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    let owner = query
        .owner
        .as_deref()
        .map(|o| parse_address(o, "owner address"))
        .transpose()?;
    state.ensure_selected(safe, None);

    // Delegates feed the node-onboarding match; a failed fetch only
    // degrades that one label.
    let ticket = state.store.with_state(|s| s.delegates.begin());
    match state.relay.delegates(safe).await {
        Ok(page) => {
            let delegates = page.results;
            state
                .store
                .with_state(|s| s.delegates.commit(ticket, delegates));
        }
        Err(err) => {
            tracing::warn!(%safe, error = %err, "delegate fetch failed");
            state.store.with_state(|s| s.delegates.abort(ticket));
        }
    }

    let current_nonce = state
        .store
        .read_state(|s| s.info.get().map(|info| info.nonce))
        .unwrap_or(0);
    let ticket = state.store.with_state(|s| s.pending.begin());
    match state.relay.pending_transactions(safe, current_nonce).await {
        Ok(page) => {
            state.store.commit_pending(ticket, page);
        }
        Err(err) => {
            state.store.with_state(|s| s.pending.abort(ticket));
            return Err(err.into());
        }
    }

    Ok(Json(state.store.pending_view(owner)))
}

/// Classified history feed, merged across pages.
async fn history(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRow>>, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    state.ensure_selected(safe, None);

    let ticket = state.store.with_state(|s| s.history.begin());
    match state.relay.all_transactions(safe, query.limit, query.offset).await {
        Ok(page) => {
            state.store.with_state(|s| {
                let mut feed = s.history.get().cloned().unwrap_or_default();
                feed.merge_page(query.offset, page);
                s.history.commit(ticket, feed);
            });
        }
        Err(err) => {
            state.store.with_state(|s| s.history.abort(ticket));
            return Err(err.into());
        }
    }

    Ok(Json(state.store.history_view()))
}

/// Safe balances read from the chain.
async fn balances(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
) -> Result<Json<SafeBalances>, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    let book = state.book().clone();

    let native = state.chain.native_balance(safe).await?;
    let xhopr = state.chain.token_balance(book.xhopr_token, safe).await?;
    let wxhopr = state.chain.token_balance(book.wxhopr_token, safe).await?;

    let balances = SafeBalances {
        native: Balance::from_raw(native, 18),
        xhopr: Balance::from_raw(xhopr, 18),
        wxhopr: Balance::from_raw(wxhopr, 18),
    };

    let ticket = state.store.with_state(|s| s.balances.begin());
    state
        .store
        .with_state(|s| s.balances.commit(ticket, balances.clone()));

    Ok(Json(balances))
}

/// Registry standing of one node relative to the safe.
async fn node_status(
    State(state): State<Arc<AppState>>,
    Path((safe, node)): Path<(String, String)>,
) -> Result<Json<NodeStatus>, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    let node = parse_address(&node, "node address")?;
    let book = state.book().clone();

    let module = state
        .store
        .selected_safe()
        .and_then(|s| s.module_address)
        .unwrap_or(book.node_management_module);

    let included = state.chain.node_included_in_module(module, node).await?;
    let registered = state
        .chain
        .node_registered_to_safe(book.node_safe_registry, node, safe)
        .await?;
    let native = state.chain.native_balance(node).await?;

    let status = NodeStatus {
        node_address: node,
        included_in_module: included,
        registered_in_safe_registry: registered,
        balance: Some(Balance::from_raw(native, 18)),
    };

    let ticket = state.store.with_state(|s| s.nodes.begin());
    state.store.with_state(|s| {
        let mut nodes = s.nodes.get().cloned().unwrap_or_default();
        nodes.retain(|n| n.node_address != node);
        nodes.push(status.clone());
        s.nodes.commit(ticket, nodes);
    });

    Ok(Json(status))
}

/// Relay-tracked metadata for one token.
async fn token_info(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<stakinghub_core::TokenDetails>, ApiError> {
    let token = parse_address(&token, "token address")?;
    Ok(Json(state.relay.token_info(token).await?))
}

/// Forwards a wallet-signed proposal to the relay.
async fn propose(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
    Json(proposal): Json<ProposedTransaction>,
) -> Result<StatusCode, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    info!(%safe, nonce = proposal.nonce, "forwarding proposal");
    state.relay.propose_transaction(safe, &proposal).await?;
    Ok(StatusCode::CREATED)
}

/// Proposes a same-nonce rejection placeholder.
async fn reject(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<StatusCode, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    let sender = parse_address(&request.sender, "sender address")?;
    info!(%safe, nonce = request.nonce, "proposing rejection");
    state
        .relay
        .propose_rejection(
            safe,
            request.nonce,
            request.contract_transaction_hash,
            sender,
            request.signature,
        )
        .await?;
    Ok(StatusCode::CREATED)
}

/// Adds a co-signature to an existing proposal.
async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
    Json(request): Json<ConfirmRequest>,
) -> Result<StatusCode, ApiError> {
    state.relay.confirm_transaction(&hash, &request.signature).await?;
    Ok(StatusCode::CREATED)
}

/// Builds the xHOPR -> wxHOPR wrap transaction.
async fn prepare_wrap(
    State(state): State<Arc<AppState>>,
    Path(_safe): Path<String>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<PreparedTransaction>, ApiError> {
    let amount = parse_amount(&request.amount)?;
    let book = state.book();
    let data = calldata::wrap(book, amount);
    Ok(Json(PreparedTransaction::call(book.xhopr_token, data)))
}

/// Builds the wxHOPR -> xHOPR unwrap transaction.
async fn prepare_unwrap(
    State(state): State<Arc<AppState>>,
    Path(_safe): Path<String>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<PreparedTransaction>, ApiError> {
    let amount = parse_amount(&request.amount)?;
    let book = state.book();
    let data = calldata::unwrap(book, amount);
    Ok(Json(PreparedTransaction::call(book.wxhopr_token, data)))
}

/// Builds the ERC-1820 interface registration for the safe.
async fn prepare_register_erc1820(
    State(state): State<Arc<AppState>>,
    Path(safe): Path<String>,
) -> Result<Json<PreparedTransaction>, ApiError> {
    let safe = parse_address(&safe, "safe address")?;
    let book = state.book();
    let data = calldata::register_erc1820(book, safe);
    Ok(Json(PreparedTransaction::call(book.erc1820_registry, data)))
}

/// Builds the node-onboarding module configuration batch.
async fn prepare_register_node(
    State(state): State<Arc<AppState>>,
    Path(_safe): Path<String>,
    Json(request): Json<RegisterNodeRequest>,
) -> Result<Json<PreparedTransaction>, ApiError> {
    let node = parse_address(&request.node, "node address")?;
    let book = state.book();
    let module = request
        .module
        .as_deref()
        .map(|m| parse_address(m, "module address"))
        .transpose()?
        .or_else(|| state.store.selected_safe().and_then(|s| s.module_address))
        .unwrap_or(book.node_management_module);

    let data = calldata::node_config(module, node, book.announcement);
    Ok(Json(PreparedTransaction::delegatecall(book.multisend, data)))
}

// ============================================================================
// Main Application
// ============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting Staking Hub API Server");

    let environment = std::env::var("HUB_ENVIRONMENT")
        .ok()
        .and_then(|e| e.parse::<Environment>().ok())
        .unwrap_or_default();
    let relay_url = std::env::var("RELAY_URL")
        .unwrap_or_else(|_| stakinghub_core::config::DEFAULT_RELAY_URL.to_string());
    let rpc_url =
        std::env::var("RPC_URL").unwrap_or_else(|_| "https://rpc.gnosischain.com".to_string());

    let book = Addresses::for_environment(environment);
    let relay = Arc::new(RelayClient::new(relay_url));
    let chain = Arc::new(ChainClient::new(rpc_url));
    let store = Arc::new(HubStore::new(book));

    // Keep the selected safe's pending queue fresh in the background.
    let watcher = Watcher::new(Arc::clone(&store), Arc::clone(&relay)).spawn();

    let state = Arc::new(AppState {
        relay,
        chain,
        store,
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/owners/:owner/safes", get(owner_safes))
        .route("/api/v1/safes/:safe", get(safe_info))
        .route("/api/v1/safes/:safe/pending", get(pending))
        .route("/api/v1/safes/:safe/history", get(history))
        .route("/api/v1/safes/:safe/balances", get(balances))
        .route("/api/v1/safes/:safe/nodes/:node", get(node_status))
        .route("/api/v1/tokens/:token", get(token_info))
        .route("/api/v1/safes/:safe/propose", post(propose))
        .route("/api/v1/safes/:safe/reject", post(reject))
        .route("/api/v1/transactions/:hash/confirm", post(confirm))
        .route("/api/v1/safes/:safe/prepare/wrap", post(prepare_wrap))
        .route("/api/v1/safes/:safe/prepare/unwrap", post(prepare_unwrap))
        .route(
            "/api/v1/safes/:safe/prepare/register-erc1820",
            post(prepare_register_erc1820),
        )
        .route(
            "/api/v1/safes/:safe/prepare/register-node",
            post(prepare_register_node),
        )
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    // Get port from environment or use default
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = format!("0.0.0.0:{}", port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!("Staking Hub API is ready!");
    info!("  - Health check: http://localhost:{}/health", port);
    info!("  - Pending queue: GET http://localhost:{}/api/v1/safes/:safe/pending", port);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");

    watcher.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepared_transaction_encodes_hex_data() {
        let book = Addresses::default();
        let prepared =
            PreparedTransaction::call(book.xhopr_token, calldata::wrap(&book, U256::from(1u64)));
        assert!(prepared.data.starts_with("0x4000aea0"));
        assert_eq!(prepared.operation, 0);
        assert_eq!(prepared.value, "0");
    }

    #[test]
    fn node_config_is_a_delegatecall() {
        let book = Addresses::default();
        let node: Address = "0x9090909090909090909090909090909090909090".parse().unwrap();
        let data = calldata::node_config(book.node_management_module, node, book.announcement);
        let prepared = PreparedTransaction::delegatecall(book.multisend, data);
        assert_eq!(prepared.operation, 1);
        assert_eq!(prepared.to, book.multisend);
    }
}
