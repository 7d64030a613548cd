use anyhow::Context;
use std::net::SocketAddr;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    /// `PAB_URL`; `None` lets the transport apply its own default.
    pub(crate) pab_url: Option<String>,
    /// `DEX_SERVICE_ADDR`
    pub(crate) bind_addr: SocketAddr,
}

impl ServiceConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let pab_url = lookup("PAB_URL")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let raw_addr = lookup("DEX_SERVICE_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid DEX_SERVICE_ADDR: {raw_addr}"))?;

        Ok(Self { pab_url, bind_addr })
    }
}
