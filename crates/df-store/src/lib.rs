//! Orchestration of the DEX front end.
//!
//! [`Store`] owns every UI-observable field (loading flags, global error,
//! wallets, asset collections, activity log) and sequences the backend calls
//! behind `init_project`, `switch_wallet`, `fetch_assets` and `call_action`.
//! None of the entry points return errors: failures are turned into log
//! entries and flag resets, and every mutation is published to subscribers.

use df_api_types::{
    Asset, AssetKind, ContractInstanceId, CurrencySymbol, LoadingModule, Loadings, LogEntry,
    LogType, RECOGNIZED_TOKENS, StoreSnapshot, WalletId,
};
use df_pab_client::{ActionEncoder, PabTransport};
use df_state_decoder::{contract_failure, decode_assets, decode_baskets, find_basket_symbol};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

mod activity;
mod error;
mod events;
mod registry;

pub use activity::{ActivityLog, LoggingHook};
pub use error::StoreError;
pub use events::StoreEvent;
pub use registry::ContractRegistry;

pub const PAB_MISSING: &str = "PAB does not exist";
pub const INIT_ERROR: &str = "Initialization error";

const EVENT_CAPACITY: usize = 1024;

#[derive(Default)]
struct StoreState {
    loadings: Loadings,
    global_error: Option<String>,
    wallets: Vec<WalletId>,
    current_wallet: WalletId,
    funds: Vec<Asset>,
    pools: Vec<Asset>,
    registry: ContractRegistry,
    symbol: Option<CurrencySymbol>,
    /// Set once a run gets past the availability check. Registry, symbol
    /// and logging hook are written by that run only.
    initialized: bool,
}

pub struct Store<T, E> {
    transport: Arc<T>,
    encoder: E,
    state: RwLock<StoreState>,
    log: Arc<ActivityLog>,
    events: broadcast::Sender<StoreEvent>,
}

impl<T, E> Store<T, E>
where
    T: PabTransport + 'static,
    E: ActionEncoder,
{
    pub fn new(transport: Arc<T>, encoder: E) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            encoder,
            state: RwLock::new(StoreState::default()),
            log: Arc::new(ActivityLog::new(events.clone())),
            events,
        }
    }

    /// Receives every field mutation from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let logs = self.log.entries().await;
        let state = self.state.read().await;
        StoreSnapshot {
            loadings: state.loadings,
            global_error: state.global_error.clone(),
            wallets: state.wallets.clone(),
            current_wallet: state.current_wallet.clone(),
            funds: state.funds.clone(),
            pools: state.pools.clone(),
            logs,
        }
    }

    pub async fn loadings(&self) -> Loadings {
        self.state.read().await.loadings
    }

    pub async fn global_error(&self) -> Option<String> {
        self.state.read().await.global_error.clone()
    }

    pub async fn wallets(&self) -> Vec<WalletId> {
        self.state.read().await.wallets.clone()
    }

    pub async fn current_wallet(&self) -> WalletId {
        self.state.read().await.current_wallet.clone()
    }

    pub async fn funds(&self) -> Vec<Asset> {
        self.state.read().await.funds.clone()
    }

    pub async fn pools(&self) -> Vec<Asset> {
        self.state.read().await.pools.clone()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.log.entries().await
    }

    pub async fn currency_symbol(&self) -> Option<CurrencySymbol> {
        self.state.read().await.symbol.clone()
    }

    /// Checks the backend, discovers wallets and the basket currency symbol,
    /// then loads both asset collections.
    ///
    /// Only the first run that finds the backend available does any work;
    /// later calls return without touching the state. A run aborted by an
    /// unavailable backend may be retried.
    pub async fn init_project(&self) {
        if self.state.read().await.initialized {
            debug!("store already initialized, skipping");
            return;
        }

        self.set_loading(LoadingModule::Actions, true).await;
        self.set_loading(LoadingModule::Assets, true).await;

        if !self.transport.check_backend_available().await {
            warn!("backend unavailable, initialization aborted");
            self.set_global_error(PAB_MISSING).await;
            self.clear_loadings().await;
            return;
        }

        if !self.claim_initialization().await {
            debug!("concurrent initialization won, skipping");
            self.clear_loadings().await;
            return;
        }
        self.transport
            .install_hook(Arc::new(LoggingHook::new(self.log.clone())))
            .await;

        if let Err(err) = self.bootstrap().await {
            warn!("initialization failed: {}", err);
            self.set_global_error(INIT_ERROR).await;
            self.log.append(LogType::Error, err.to_string()).await;
        }
        self.clear_loadings().await;
    }

    /// Selects `wallet` and refreshes its funds. Pools are left as they are.
    pub async fn switch_wallet(&self, wallet: WalletId) {
        {
            let mut state = self.state.write().await;
            state.current_wallet = wallet.clone();
        }
        self.publish(StoreEvent::CurrentWalletChanged(wallet));

        self.fetch_assets(AssetKind::Funds).await;
    }

    /// Reloads one asset collection for the current wallet. On failure the
    /// previous collection stays in place.
    pub async fn fetch_assets(&self, kind: AssetKind) {
        self.set_loading(LoadingModule::Assets, true).await;

        match self.load_assets(kind).await {
            Ok(assets) => {
                let count = assets.len();
                self.replace_assets(kind, assets).await;
                self.log
                    .append(LogType::Success, format!("Fetched {kind} ({count} assets)"))
                    .await;
            }
            Err(err) => {
                self.log
                    .append(LogType::Error, format!("Failed to fetch {kind}: {err}"))
                    .await;
            }
        }

        self.set_loading(LoadingModule::Assets, false).await;
    }

    /// Runs a user action against the current wallet's contract and, when it
    /// succeeds, refreshes funds then pools.
    pub async fn call_action(&self, action: &str, params: Value) {
        self.set_loading(LoadingModule::Actions, true).await;
        self.set_loading(LoadingModule::Assets, true).await;

        match self.dispatch(action, &params).await {
            Ok(()) => {
                self.log
                    .append(LogType::Success, format!("Action {action} succeeded"))
                    .await;
                self.set_loading(LoadingModule::Actions, false).await;
                self.fetch_assets(AssetKind::Funds).await;
                self.fetch_assets(AssetKind::Pools).await;
            }
            Err(err) => {
                self.log
                    .append(LogType::Error, format!("Action {action} failed: {err}"))
                    .await;
                self.clear_loadings().await;
            }
        }
    }

    async fn bootstrap(&self) -> Result<(), StoreError> {
        let instances = self
            .transport
            .list_contracts()
            .await
            .map_err(StoreError::Transport)?;
        let (registry, wallets) = ContractRegistry::from_instances(&instances);
        let Some(current) = wallets.first().cloned() else {
            return Err(StoreError::NoContracts);
        };
        info!(
            "registered {} wallets, {} contract instances",
            wallets.len(),
            registry.len()
        );

        {
            let mut state = self.state.write().await;
            state.registry = registry;
            state.wallets = wallets.clone();
            state.current_wallet = current.clone();
        }
        self.publish(StoreEvent::WalletsChanged(wallets));
        self.publish(StoreEvent::CurrentWalletChanged(current));

        let instance = self.current_instance().await?;
        let raw = self
            .transport
            .call_endpoint(&instance, AssetKind::Funds.endpoint_name(), json!([]))
            .await
            .map_err(StoreError::Transport)?;
        let baskets = decode_baskets(&raw)?;
        let symbol = find_basket_symbol(&baskets, &RECOGNIZED_TOKENS)
            .ok_or_else(|| StoreError::SymbolNotFound(RECOGNIZED_TOKENS.join(",")))?;

        self.state.write().await.symbol = Some(symbol.clone());
        self.log
            .append(LogType::Success, format!("Currency symbol {} resolved", symbol.0))
            .await;

        self.fetch_assets(AssetKind::Funds).await;
        self.fetch_assets(AssetKind::Pools).await;
        Ok(())
    }

    async fn claim_initialization(&self) -> bool {
        let mut state = self.state.write().await;
        !std::mem::replace(&mut state.initialized, true)
    }

    async fn load_assets(&self, kind: AssetKind) -> Result<Vec<Asset>, StoreError> {
        let instance = self.current_instance().await?;
        let raw = self
            .transport
            .call_endpoint(&instance, kind.endpoint_name(), json!([]))
            .await
            .map_err(StoreError::Transport)?;
        Ok(decode_assets(kind, &raw)?)
    }

    async fn dispatch(&self, action: &str, params: &Value) -> Result<(), StoreError> {
        let instance = self.current_instance().await?;
        let symbol = self.currency_symbol().await;
        let body = self
            .encoder
            .encode_action_body(action, params, symbol.as_ref())
            .map_err(StoreError::Encode)?;

        let state = self
            .transport
            .call_endpoint(&instance, action, body)
            .await
            .map_err(StoreError::Transport)?;
        match contract_failure(&state) {
            Some(message) => Err(StoreError::Contract(message)),
            None => Ok(()),
        }
    }

    async fn current_instance(&self) -> Result<ContractInstanceId, StoreError> {
        let state = self.state.read().await;
        state
            .registry
            .instance(&state.current_wallet)
            .cloned()
            .ok_or_else(|| StoreError::UnknownWallet(state.current_wallet.0.clone()))
    }

    async fn replace_assets(&self, kind: AssetKind, assets: Vec<Asset>) {
        {
            let mut state = self.state.write().await;
            match kind {
                AssetKind::Funds => state.funds = assets.clone(),
                AssetKind::Pools => state.pools = assets.clone(),
            }
        }
        self.publish(StoreEvent::AssetsReplaced { kind, assets });
    }

    async fn set_loading(&self, module: LoadingModule, value: bool) {
        self.state.write().await.loadings.set(module, value);
        self.publish(StoreEvent::LoadingChanged { module, value });
    }

    async fn clear_loadings(&self) {
        self.set_loading(LoadingModule::Actions, false).await;
        self.set_loading(LoadingModule::Assets, false).await;
    }

    async fn set_global_error(&self, message: &str) {
        self.state.write().await.global_error = Some(message.to_owned());
        self.publish(StoreEvent::GlobalErrorSet(message.to_owned()));
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}
