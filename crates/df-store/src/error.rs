use df_state_decoder::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend reported no contract instances")]
    NoContracts,
    #[error("no contract instance registered for wallet '{0}'")]
    UnknownWallet(String),
    #[error("no basket holding exactly the tokens {0} was found in funds")]
    SymbolNotFound(String),
    #[error("contract rejected the request: {0}")]
    Contract(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{0:#}")]
    Transport(anyhow::Error),
    #[error("{0:#}")]
    Encode(anyhow::Error),
}
