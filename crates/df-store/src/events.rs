use df_api_types::{Asset, AssetKind, LoadingModule, LogEntry, WalletId};

/// Field mutation published to store subscribers, in mutation order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    LoadingChanged { module: LoadingModule, value: bool },
    GlobalErrorSet(String),
    WalletsChanged(Vec<WalletId>),
    CurrentWalletChanged(WalletId),
    AssetsReplaced { kind: AssetKind, assets: Vec<Asset> },
    LogAppended(LogEntry),
}
