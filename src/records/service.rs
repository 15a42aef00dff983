//! Record service composing the latest-message slot and the append-only message log.

use crate::{
    config::Config,
    metrics::{MetricsSnapshot, RecordMetrics},
    records::{
        codec,
        latest::LatestMessageStore,
        log_store::AppendLogStore,
        types::{ASSISTANT_SOURCE, PlainMessage, PostedMessage, Record, RecordError, USER_SOURCE},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Owns the two file-backed stores and the message counters.
///
/// Construct it once near process start and share it through an `Arc`.
pub struct RecordService {
    latest: LatestMessageStore,
    log: AppendLogStore,
    metrics: Arc<RecordMetrics>,
}

/// Abstraction over the record service used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Persist an assistant message as the latest message and append it to the log.
    async fn record_assistant_message(&self, message: PostedMessage) -> Result<(), RecordError>;

    /// Append a user message to the log.
    async fn record_user_message(&self, message: PlainMessage) -> Result<(), RecordError>;

    /// Parse every non-empty log line, in append order.
    async fn list_entries(&self) -> Result<Vec<Record>, RecordError>;

    /// Raw contents of the latest-message slot.
    async fn load_latest(&self) -> Result<Vec<u8>, RecordError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl RecordService {
    /// Build a service over explicit store handles.
    pub fn new(latest: LatestMessageStore, log: AppendLogStore) -> Self {
        Self {
            latest,
            log,
            metrics: Arc::new(RecordMetrics::new()),
        }
    }

    /// Build a service over the file locations named in `config`.
    pub fn from_config(config: &Config) -> Self {
        tracing::info!(
            latest = %config.latest_message_path.display(),
            log = %config.message_log_path.display(),
            "Initializing record stores"
        );
        Self::new(
            LatestMessageStore::new(&config.latest_message_path),
            AppendLogStore::new(&config.message_log_path),
        )
    }

    async fn append_record(&self, record: &Record) -> Result<(), RecordError> {
        self.log
            .append(&codec::format_line(record))
            .await
            .map_err(RecordError::AppendLog)
    }
}

#[async_trait]
impl RecordApi for RecordService {
    /// The slot is written first. If the append then fails the two stores diverge; nothing is
    /// rolled back.
    async fn record_assistant_message(&self, message: PostedMessage) -> Result<(), RecordError> {
        self.latest
            .save(&message)
            .await
            .map_err(RecordError::SaveLatest)?;
        let record = codec::stamp(ASSISTANT_SOURCE, &message.message, Some(&message.image_url));
        self.append_record(&record).await?;
        self.metrics.record_assistant_message();
        tracing::info!(
            source = ASSISTANT_SOURCE,
            has_image = record.image_reference.is_some(),
            "Recorded message"
        );
        Ok(())
    }

    async fn record_user_message(&self, message: PlainMessage) -> Result<(), RecordError> {
        let record = codec::stamp(USER_SOURCE, &message.message, None);
        self.append_record(&record).await?;
        self.metrics.record_user_message();
        tracing::info!(source = USER_SOURCE, "Recorded message");
        Ok(())
    }

    async fn list_entries(&self) -> Result<Vec<Record>, RecordError> {
        let lines = self.log.read_all().await.map_err(RecordError::ReadLog)?;
        let entries: Vec<Record> = lines.iter().map(|line| codec::parse_line(line)).collect();
        self.metrics.record_log_query();
        tracing::debug!(entries = entries.len(), "Listed log entries");
        Ok(entries)
    }

    async fn load_latest(&self) -> Result<Vec<u8>, RecordError> {
        self.latest.load().await.map_err(RecordError::LoadLatest)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
