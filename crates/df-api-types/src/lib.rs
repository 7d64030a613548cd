use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct WalletId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContractInstanceId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencySymbol(pub String);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenName(pub String);

/// Token names of the basket whose currency symbol is used for every action.
pub const RECOGNIZED_TOKENS: [&str; 4] = ["A", "B", "C", "D"];

/// Normalized on-chain value, independent of the collection it was read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub currency_symbol: CurrencySymbol,
    pub token_name: TokenName,
    pub amount: i128,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Funds,
    Pools,
}

impl AssetKind {
    /// Contract endpoint queried for this collection.
    pub fn endpoint_name(self) -> &'static str {
        match self {
            AssetKind::Funds => "funds",
            AssetKind::Pools => "pools",
        }
    }

    /// Tag the contract puts on the observable state answering this query.
    pub fn state_tag(self) -> &'static str {
        match self {
            AssetKind::Funds => "Funds",
            AssetKind::Pools => "Pools",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "funds" => Some(AssetKind::Funds),
            "pools" => Some(AssetKind::Pools),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint_name())
    }
}

/// One running contract instance as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractInstance {
    pub wallet_id: WalletId,
    pub instance_id: ContractInstanceId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub time_epoch_ms: u128,
    pub message: String,
}

impl LogEntry {
    pub fn new(kind: LogType, message: impl Into<String>, time_epoch_ms: u128) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            time_epoch_ms,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadingModule {
    Actions,
    Assets,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Loadings {
    pub actions: bool,
    pub assets: bool,
}

impl Loadings {
    pub fn set(&mut self, module: LoadingModule, value: bool) {
        match module {
            LoadingModule::Actions => self.actions = value,
            LoadingModule::Assets => self.assets = value,
        }
    }

    pub fn any(&self) -> bool {
        self.actions || self.assets
    }
}

/// Every UI-observable field of the store at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub loadings: Loadings,
    pub global_error: Option<String>,
    pub wallets: Vec<WalletId>,
    pub current_wallet: WalletId,
    pub funds: Vec<Asset>,
    pub pools: Vec<Asset>,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSwitchRequest {
    pub wallet_id: String,
}
