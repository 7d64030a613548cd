use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use df_api_types::{AssetKind, StoreSnapshot, WalletId, WalletSwitchRequest};
use df_pab_client::{ActionEncoder, PabTransport};
use df_pab_http::{PabHttpClient, UniswapEncoder};
use df_store::Store;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

mod config;

use config::ServiceConfig;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;
    let transport = Arc::new(PabHttpClient::new(config.pab_url.clone()));
    info!("using PAB at {}", transport.endpoint());

    let store = Arc::new(Store::new(transport, UniswapEncoder));
    tokio::spawn({
        let store = store.clone();
        async move { store.init_project().await }
    });

    let app = router(store).layer(CorsLayer::permissive());

    info!("dex-service listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router<T, E>(store: Arc<Store<T, E>>) -> Router
where
    T: PabTransport + 'static,
    E: ActionEncoder + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/state", get(state::<T, E>))
        .route("/init", post(init::<T, E>))
        .route("/wallet/switch", post(switch_wallet::<T, E>))
        .route("/assets/{kind}", post(fetch_assets::<T, E>))
        .route("/action/{name}", post(call_action::<T, E>))
        .with_state(store)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "dex-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "dex-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn state<T, E>(State(store): State<Arc<Store<T, E>>>) -> Json<StoreSnapshot>
where
    T: PabTransport + 'static,
    E: ActionEncoder + 'static,
{
    Json(store.snapshot().await)
}

async fn init<T, E>(State(store): State<Arc<Store<T, E>>>) -> Json<StoreSnapshot>
where
    T: PabTransport + 'static,
    E: ActionEncoder + 'static,
{
    store.init_project().await;
    Json(store.snapshot().await)
}

async fn switch_wallet<T, E>(
    State(store): State<Arc<Store<T, E>>>,
    Json(request): Json<WalletSwitchRequest>,
) -> ApiResult<StoreSnapshot>
where
    T: PabTransport + 'static,
    E: ActionEncoder + 'static,
{
    if request.wallet_id.trim().is_empty() {
        return Err(bad_request("wallet_id is required"));
    }

    store.switch_wallet(WalletId(request.wallet_id)).await;
    Ok(Json(store.snapshot().await))
}

async fn fetch_assets<T, E>(
    State(store): State<Arc<Store<T, E>>>,
    Path(kind): Path<String>,
) -> ApiResult<StoreSnapshot>
where
    T: PabTransport + 'static,
    E: ActionEncoder + 'static,
{
    let kind = AssetKind::parse(&kind).ok_or_else(|| bad_request("kind must be funds or pools"))?;

    store.fetch_assets(kind).await;
    Ok(Json(store.snapshot().await))
}

async fn call_action<T, E>(
    State(store): State<Arc<Store<T, E>>>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> ApiResult<StoreSnapshot>
where
    T: PabTransport + 'static,
    E: ActionEncoder + 'static,
{
    if name.trim().is_empty() {
        return Err(bad_request("action name is required"));
    }

    store.call_action(&name, params).await;
    Ok(Json(store.snapshot().await))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}
