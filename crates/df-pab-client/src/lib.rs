use anyhow::Result;
use async_trait::async_trait;
use df_api_types::{ContractInstance, ContractInstanceId, CurrencySymbol};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outgoing request as seen by exchange hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Value>,
}

impl fmt::Display for ExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A request that failed, either with an HTTP error status or before any
/// response arrived (`status` is `None` then).
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeFailure {
    pub request: ExchangeRequest,
    pub status: Option<u16>,
    pub response_body: String,
}

/// Observer attached to every call made through a transport.
///
/// Hooks only observe: the transport returns the same result whether or not
/// any hook is installed.
#[async_trait]
pub trait ExchangeHook: Send + Sync {
    async fn on_success(&self, request: &ExchangeRequest);
    async fn on_failure(&self, failure: &ExchangeFailure);
}

/// Registered hooks of one transport, notified in installation order.
#[derive(Default)]
pub struct HookSet {
    hooks: RwLock<Vec<Arc<dyn ExchangeHook>>>,
}

impl HookSet {
    pub async fn install(&self, hook: Arc<dyn ExchangeHook>) {
        self.hooks.write().await.push(hook);
    }

    pub async fn count(&self) -> usize {
        self.hooks.read().await.len()
    }

    pub async fn notify_success(&self, request: &ExchangeRequest) {
        let hooks = self.hooks.read().await.clone();
        for hook in hooks {
            hook.on_success(request).await;
        }
    }

    pub async fn notify_failure(&self, failure: &ExchangeFailure) {
        let hooks = self.hooks.read().await.clone();
        for hook in hooks {
            hook.on_failure(failure).await;
        }
    }
}

/// Contract-execution backend as consumed by the store.
#[async_trait]
pub trait PabTransport: Send + Sync {
    /// Never fails: an unreachable backend is simply unavailable.
    async fn check_backend_available(&self) -> bool;
    async fn list_contracts(&self) -> Result<Vec<ContractInstance>>;
    /// Invoke `endpoint` on the instance and return its observable state.
    async fn call_endpoint(
        &self,
        instance: &ContractInstanceId,
        endpoint: &str,
        body: Value,
    ) -> Result<Value>;
    async fn install_hook(&self, hook: Arc<dyn ExchangeHook>);
}

/// Builds the request body of a user action.
pub trait ActionEncoder: Send + Sync {
    /// `symbol` is `None` when no currency symbol has been resolved yet.
    fn encode_action_body(
        &self,
        action: &str,
        params: &Value,
        symbol: Option<&CurrencySymbol>,
    ) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExchangeHook for Recorder {
        async fn on_success(&self, request: &ExchangeRequest) {
            self.seen.lock().unwrap().push(format!("ok {request}"));
        }

        async fn on_failure(&self, failure: &ExchangeFailure) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("fail {:?} {}", failure.status, failure.request));
        }
    }

    #[tokio::test]
    async fn hooks_are_notified_in_order() {
        let hooks = HookSet::default();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        hooks.install(first.clone()).await;
        hooks.install(second.clone()).await;
        assert_eq!(hooks.count().await, 2);

        let request = ExchangeRequest {
            method: "GET".to_owned(),
            url: "http://pab/api/healthcheck".to_owned(),
            body: None,
        };
        hooks.notify_success(&request).await;
        hooks
            .notify_failure(&ExchangeFailure {
                request,
                status: Some(500),
                response_body: "boom".to_owned(),
            })
            .await;

        let expected = vec![
            "ok GET http://pab/api/healthcheck".to_owned(),
            "fail Some(500) GET http://pab/api/healthcheck".to_owned(),
        ];
        assert_eq!(*first.seen.lock().unwrap(), expected);
        assert_eq!(*second.seen.lock().unwrap(), expected);
    }
}
