use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use df_api_types::{ContractInstance, ContractInstanceId, WalletId};
use df_pab_client::{ExchangeFailure, ExchangeHook, ExchangeRequest, HookSet, PabTransport};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

mod encoder;

pub use encoder::UniswapEncoder;

pub const DEFAULT_PAB_URL: &str = "http://localhost:9080";

/// HTTP transport for the Plutus Application Backend.
///
/// Reads `PAB_URL` from environment at construction time
/// (default: `http://localhost:9080`).
pub struct PabHttpClient {
    endpoint: String,
    http: reqwest::Client,
    hooks: HookSet,
}

impl Default for PabHttpClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PabHttpClient {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("PAB_URL").ok())
            .unwrap_or_else(|| DEFAULT_PAB_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            hooks: HookSet::default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Performs one request, reporting it to every installed hook, and
    /// returns the response body of a 2xx answer.
    async fn send(&self, method: Method, url: String, body: Option<Value>) -> Result<String> {
        let request = ExchangeRequest {
            method: method.to_string(),
            url: url.clone(),
            body: body.clone(),
        };

        let mut builder = self.http.request(method, &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                self.hooks
                    .notify_failure(&ExchangeFailure {
                        request: request.clone(),
                        status: None,
                        response_body: err.to_string(),
                    })
                    .await;
                return Err(anyhow!(err).context(format!("{request} transport")));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                self.hooks
                    .notify_failure(&ExchangeFailure {
                        request: request.clone(),
                        status: Some(status.as_u16()),
                        response_body: err.to_string(),
                    })
                    .await;
                return Err(anyhow!(err).context(format!("{request} body")));
            }
        };

        if !status.is_success() {
            self.hooks
                .notify_failure(&ExchangeFailure {
                    request: request.clone(),
                    status: Some(status.as_u16()),
                    response_body: text.clone(),
                })
                .await;
            anyhow::bail!("{request} HTTP {status}: {text}");
        }

        self.hooks.notify_success(&request).await;
        Ok(text)
    }
}

// ── PAB REST API types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct InstanceStatus {
    #[serde(rename = "cicContract")]
    contract: InstanceIdWire,
    #[serde(rename = "cicWallet")]
    wallet: WalletWire,
}

#[derive(Debug, Deserialize)]
struct InstanceIdWire {
    #[serde(rename = "unContractInstanceId")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct WalletWire {
    // Older PAB releases number wallets, newer ones use hex ids.
    #[serde(rename = "getWalletId")]
    id: Value,
}

#[derive(Debug, Deserialize)]
struct ContractStatus {
    #[serde(rename = "cicCurrentState")]
    current_state: CurrentState,
}

#[derive(Debug, Deserialize)]
struct CurrentState {
    #[serde(rename = "observableState")]
    observable_state: Value,
}

pub(crate) fn parse_instances(text: &str) -> Result<Vec<ContractInstance>> {
    let statuses: Vec<InstanceStatus> =
        serde_json::from_str(text).context("pab contract instances parse")?;

    Ok(statuses
        .into_iter()
        .map(|status| ContractInstance {
            wallet_id: WalletId(match status.wallet.id {
                Value::String(id) => id,
                other => other.to_string(),
            }),
            instance_id: ContractInstanceId(status.contract.id),
        })
        .collect())
}

pub(crate) fn parse_observable_state(text: &str) -> Result<Value> {
    let status: ContractStatus =
        serde_json::from_str(text).context("pab contract status parse")?;
    Ok(status.current_state.observable_state)
}

#[async_trait]
impl PabTransport for PabHttpClient {
    async fn check_backend_available(&self) -> bool {
        match self
            .send(Method::GET, self.url("/api/healthcheck"), None)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                warn!("pab healthcheck failed: {:#}", err);
                false
            }
        }
    }

    async fn list_contracts(&self) -> Result<Vec<ContractInstance>> {
        let text = self
            .send(Method::GET, self.url("/api/contract/instances"), None)
            .await?;
        let instances = parse_instances(&text)?;
        debug!("pab reported {} contract instances", instances.len());
        Ok(instances)
    }

    async fn call_endpoint(
        &self,
        instance: &ContractInstanceId,
        endpoint: &str,
        body: Value,
    ) -> Result<Value> {
        let url = self.url(&format!(
            "/api/contract/instance/{}/endpoint/{}",
            instance.0, endpoint
        ));
        self.send(Method::POST, url, Some(body)).await?;

        let url = self.url(&format!("/api/contract/instance/{}/status", instance.0));
        let text = self.send(Method::GET, url, None).await?;
        parse_observable_state(&text)
    }

    async fn install_hook(&self, hook: Arc<dyn ExchangeHook>) {
        self.hooks.install(hook).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Recorder {
        failures: Mutex<Vec<ExchangeFailure>>,
    }

    #[async_trait]
    impl ExchangeHook for Recorder {
        async fn on_success(&self, _request: &ExchangeRequest) {}

        async fn on_failure(&self, failure: &ExchangeFailure) {
            self.failures.lock().unwrap().push(failure.clone());
        }
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = PabHttpClient::new(Some("http://pab.local:9080/".to_owned()));
        assert_eq!(client.endpoint(), "http://pab.local:9080");
        assert_eq!(
            client.url("/api/healthcheck"),
            "http://pab.local:9080/api/healthcheck"
        );
    }

    #[test]
    fn instances_keep_backend_order() -> anyhow::Result<()> {
        let text = json!([
            {
                "cicContract": {"unContractInstanceId": "inst-2"},
                "cicWallet": {"getWalletId": "7d0ac1"},
                "cicDefinition": {"tag": "UniswapUser"}
            },
            {
                "cicContract": {"unContractInstanceId": "inst-1"},
                "cicWallet": {"getWalletId": 3}
            }
        ])
        .to_string();

        let instances = parse_instances(&text)?;

        assert_eq!(
            instances,
            vec![
                ContractInstance {
                    wallet_id: WalletId("7d0ac1".to_owned()),
                    instance_id: ContractInstanceId("inst-2".to_owned()),
                },
                ContractInstance {
                    wallet_id: WalletId("3".to_owned()),
                    instance_id: ContractInstanceId("inst-1".to_owned()),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn observable_state_is_extracted_from_status() -> anyhow::Result<()> {
        let state = json!({"Right": {"tag": "Pools", "contents": []}});
        let text = json!({
            "cicCurrentState": {"observableState": state, "logs": []},
            "cicContract": {"unContractInstanceId": "inst-1"}
        })
        .to_string();

        assert_eq!(parse_observable_state(&text)?, state);
        assert!(parse_observable_state("{\"cicCurrentState\": {}}").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn truncated_body_is_a_failure() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 64\r\n\r\n{\"partial")
                    .await;
                let _ = socket.shutdown().await;
            }
        });

        let client = PabHttpClient::new(Some(format!("http://{addr}")));
        let recorder = Arc::new(Recorder::default());
        client.install_hook(recorder.clone()).await;

        assert!(!client.check_backend_available().await);

        let failures = recorder.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].status, Some(200));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable_and_reported() {
        let client = PabHttpClient::new(Some("http://127.0.0.1:1".to_owned()));
        let recorder = Arc::new(Recorder::default());
        client.install_hook(recorder.clone()).await;

        assert!(!client.check_backend_available().await);

        let failures = recorder.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].status, None);
        assert_eq!(failures[0].request.method, "GET");
        assert_eq!(failures[0].request.url, "http://127.0.0.1:1/api/healthcheck");
    }
}
