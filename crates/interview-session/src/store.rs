//! The interview session store: cached records plus step advancement.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use interview_fields::FormValues;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::record::{InterviewStateRecord, Metadata, record_id};
use crate::response::{InterviewStateResponse, UpdateRequest};
use crate::storage::SessionStorage;
use crate::transport::InterviewTransport;

/// Bounded, persisted map of interview records, oldest first.
///
/// Every mutation rewrites the whole set to the storage slot. Loading is
/// best effort: a missing or corrupt slot yields an empty store.
pub struct InterviewStateStore {
    storage: Arc<dyn SessionStorage>,
    transport: Arc<dyn InterviewTransport>,
    records: VecDeque<(String, InterviewStateRecord)>,
    storage_key: String,
    max_records: usize,
    id_prefix_len: usize,
}

impl InterviewStateStore {
    pub fn new(storage: Arc<dyn SessionStorage>, transport: Arc<dyn InterviewTransport>) -> Self {
        Self::with_config(&SessionConfig::default(), storage, transport)
    }

    pub fn with_config(
        config: &SessionConfig,
        storage: Arc<dyn SessionStorage>,
        transport: Arc<dyn InterviewTransport>,
    ) -> Self {
        let mut store = Self {
            storage,
            transport,
            records: VecDeque::new(),
            storage_key: config.storage_key.clone(),
            max_records: config.max_records.max(1),
            id_prefix_len: config.id_prefix_len.max(1),
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let raw = match self.storage.get_item(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                warn!(
                    key = %self.storage_key,
                    error = %err,
                    "failed to read persisted interview state"
                );
                return;
            }
        };
        let records: Vec<InterviewStateRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    key = %self.storage_key,
                    error = %err,
                    "ignoring corrupt persisted interview state"
                );
                return;
            }
        };
        self.records.clear();
        for record in records {
            self.insert(record);
        }
        self.trim();
        debug!(records = self.records.len(), "loaded interview state");
    }

    fn save(&self) {
        let records: Vec<&InterviewStateRecord> =
            self.records.iter().map(|(_, record)| record).collect();
        let serialized = match serde_json::to_string(&records) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(error = %err, "failed to serialize interview state");
                return;
            }
        };
        if let Err(err) = self.storage.set_item(&self.storage_key, &serialized) {
            warn!(key = %self.storage_key, error = %err, "failed to persist interview state");
        }
    }

    /// Inserts or overwrites by id. An overwritten record keeps its position.
    fn insert(&mut self, record: InterviewStateRecord) -> String {
        let id = self.record_id(&record);
        match self.records.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = record,
            None => self.records.push_back((id.clone(), record)),
        }
        id
    }

    fn trim(&mut self) {
        while self.records.len() > self.max_records {
            if let Some((id, _)) = self.records.pop_front() {
                debug!(id = %id, "evicted oldest interview record");
            }
        }
    }

    /// Id of a record under this store's prefix length.
    pub fn record_id(&self, record: &InterviewStateRecord) -> String {
        record_id(record.response.state(), self.id_prefix_len)
    }

    /// Stores a record, evicts beyond capacity and persists. Returns its id.
    pub fn save_record(&mut self, record: InterviewStateRecord) -> String {
        let id = self.insert(record);
        self.trim();
        self.save();
        id
    }

    pub fn get_record(&self, id: &str) -> Option<&InterviewStateRecord> {
        self.records
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, record)| record)
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl Iterator<Item = &InterviewStateRecord> {
        self.records.iter().map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Starts an interview from the first response the server handed out.
    ///
    /// The response is saved as a record, then advanced until it has content
    /// or is complete.
    pub async fn start_interview(
        &mut self,
        response: InterviewStateResponse,
        metadata: Option<Metadata>,
    ) -> Result<InterviewStateRecord, SessionError> {
        let record = InterviewStateRecord::new(
            response,
            FormValues::new(),
            metadata.unwrap_or_default(),
        );
        info!(id = %self.record_id(&record), "starting interview");
        self.save_record(record.clone());
        self.advance(record).await
    }

    /// Submits answers for `record` and advances to the next step with content.
    pub async fn update_interview(
        &mut self,
        record: &InterviewStateRecord,
        responses: Option<FormValues>,
        button: Option<usize>,
    ) -> Result<InterviewStateRecord, SessionError> {
        let updated = self.update_state(record, responses, button).await?;
        self.advance(updated).await
    }

    /// Posts empty updates while the server has nothing to show.
    async fn advance(
        &mut self,
        mut record: InterviewStateRecord,
    ) -> Result<InterviewStateRecord, SessionError> {
        while record.response.is_pending() {
            record = self.update_state(&record, None, None).await?;
        }
        if record.response.is_complete() {
            info!(id = %self.record_id(&record), "interview complete");
        }
        Ok(record)
    }

    async fn update_state(
        &mut self,
        record: &InterviewStateRecord,
        responses: Option<FormValues>,
        button: Option<usize>,
    ) -> Result<InterviewStateRecord, SessionError> {
        let update_url = match &record.response {
            InterviewStateResponse::Incomplete(response) => response.update_url.as_deref(),
            InterviewStateResponse::Complete(_) => None,
        }
        .ok_or_else(|| {
            SessionError::Protocol(format!(
                "interview state {} is not updatable",
                self.record_id(record)
            ))
        })?
        .to_string();

        let request = UpdateRequest {
            state: record.response.state().to_string(),
            responses,
            button,
        };
        debug!(url = %update_url, button = ?button, "posting interview update");
        let response = self.transport.post_update(&update_url, &request).await?;

        let updated =
            InterviewStateRecord::new(response, FormValues::new(), record.metadata.clone());
        self.save_record(updated.clone());
        Ok(updated)
    }
}

impl fmt::Debug for InterviewStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterviewStateStore")
            .field("storage_key", &self.storage_key)
            .field("records", &self.records.len())
            .field("max_records", &self.max_records)
            .finish_non_exhaustive()
    }
}
