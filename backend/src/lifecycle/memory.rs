use crate::error::Result;
use crate::lifecycle::repository::SignatureRepository;
use async_trait::async_trait;
use common::model::signature::SignatureRecord;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Process-local repository.
///
/// An optional latency is awaited before every call to stand in for a remote
/// backend; it is configuration, never business logic.
#[derive(Default)]
pub struct InMemoryRepository {
    records: RwLock<HashMap<String, Vec<SignatureRecord>>>,
    latency: Option<Duration>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            latency: Some(latency).filter(|d| !d.is_zero()),
        }
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn upsert(records: &mut Vec<SignatureRecord>, record: SignatureRecord) {
    match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

#[async_trait]
impl SignatureRepository for InMemoryRepository {
    async fn list(&self, user_id: &str) -> Result<Vec<SignatureRecord>> {
        self.round_trip().await;
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<SignatureRecord>> {
        self.round_trip().await;
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .and_then(|list| list.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn put(&self, user_id: &str, record: SignatureRecord) -> Result<()> {
        self.round_trip().await;
        let mut records = self.records.write().await;
        upsert(records.entry(user_id.to_string()).or_default(), record);
        Ok(())
    }

    async fn put_all(&self, user_id: &str, batch: Vec<SignatureRecord>) -> Result<()> {
        self.round_trip().await;
        // One write guard for the whole batch; readers never see half of it.
        let mut records = self.records.write().await;
        let list = records.entry(user_id.to_string()).or_default();
        for record in batch {
            upsert(list, record);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        self.round_trip().await;
        let mut records = self.records.write().await;
        let Some(list) = records.get_mut(user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|r| r.id != id);
        Ok(list.len() != before)
    }
}
