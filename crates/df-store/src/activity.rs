use async_trait::async_trait;
use df_api_types::{LogEntry, LogType};
use df_pab_client::{ExchangeFailure, ExchangeHook, ExchangeRequest};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::events::StoreEvent;

/// Append-only activity log shown to the user.
///
/// Shared between the store and the transport hook, so entries from both
/// land in one sequence in insertion order.
pub struct ActivityLog {
    entries: RwLock<Vec<LogEntry>>,
    events: broadcast::Sender<StoreEvent>,
}

impl ActivityLog {
    pub(crate) fn new(events: broadcast::Sender<StoreEvent>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            events,
        }
    }

    pub async fn append(&self, kind: LogType, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry::new(kind, message, epoch_ms());
        match kind {
            LogType::Info => debug!("activity: {}", entry.message),
            LogType::Success => info!("activity: {}", entry.message),
            LogType::Warning | LogType::Error => warn!("activity: {}", entry.message),
        }

        self.entries.write().await.push(entry.clone());
        let _ = self.events.send(StoreEvent::LogAppended(entry.clone()));
        entry
    }

    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().await.clone()
    }
}

/// Records every request made through the transport in the activity log.
pub struct LoggingHook {
    log: Arc<ActivityLog>,
}

impl LoggingHook {
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl ExchangeHook for LoggingHook {
    async fn on_success(&self, request: &ExchangeRequest) {
        let message = match &request.body {
            Some(body) => format!("{request} {body}"),
            None => request.to_string(),
        };
        self.log.append(LogType::Info, message).await;
    }

    async fn on_failure(&self, failure: &ExchangeFailure) {
        let status = failure
            .status
            .map(|code| code.to_string())
            .unwrap_or_else(|| "no response".to_owned());
        self.log
            .append(
                LogType::Warning,
                format!("{status} {}: {}", failure.request, failure.response_body),
            )
            .await;
    }
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
