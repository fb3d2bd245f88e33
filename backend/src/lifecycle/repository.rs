use crate::error::Result;
use async_trait::async_trait;
use common::model::signature::SignatureRecord;

/// Durable store of signature records, keyed by user.
///
/// Every call is a round trip to the backing store; callers must not assume it
/// completes synchronously. Records of one user keep their insertion order.
#[async_trait]
pub trait SignatureRepository: Send + Sync {
    async fn list(&self, user_id: &str) -> Result<Vec<SignatureRecord>>;

    async fn get(&self, user_id: &str, id: &str) -> Result<Option<SignatureRecord>>;

    /// Inserts a record at the end of the user's list, or replaces it in place.
    async fn put(&self, user_id: &str, record: SignatureRecord) -> Result<()>;

    /// Writes several records as a single atomic update: either all of them
    /// become visible or none do.
    async fn put_all(&self, user_id: &str, records: Vec<SignatureRecord>) -> Result<()>;

    /// Returns false when no such record existed.
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool>;
}
