//! Persistence seam for the `books` collection.

use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{models::BookRecord, validation::ValidationErrors};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Book not found.")]
    NotFound,

    /// The database rejected or failed the operation.
    #[error("{0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw document operations. Implementations neither validate nor log; `BookService` does both.
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert(&self, record: BookRecord) -> StoreResult<BookRecord>;

    /// All records in insertion order.
    async fn find_all(&self) -> StoreResult<Vec<BookRecord>>;

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<BookRecord>>;

    /// Replace the record with the same id, returning the stored document, or `None` if it
    /// no longer exists.
    async fn replace(&self, record: BookRecord) -> StoreResult<Option<BookRecord>>;

    async fn delete(&self, id: ObjectId) -> StoreResult<Option<BookRecord>>;

    /// Records whose `genres` contains `genre` exactly.
    async fn find_by_genre(&self, genre: &str) -> StoreResult<Vec<BookRecord>>;

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Process-local repository backed by a `Vec`, used by tests and for running without MongoDB.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    records: RwLock<Vec<BookRecord>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn insert(&self, record: BookRecord) -> StoreResult<BookRecord> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(StoreError::Backend(format!(
                "duplicate key: book {} already exists",
                record.id
            )));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> StoreResult<Vec<BookRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<BookRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn replace(&self, record: BookRecord) -> StoreResult<Option<BookRecord>> {
        let mut records = self.records.write().await;
        Ok(records
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .map(|existing| {
                *existing = record;
                existing.clone()
            }))
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<Option<BookRecord>> {
        let mut records = self.records.write().await;
        Ok(records
            .iter()
            .position(|record| record.id == id)
            .map(|index| records.remove(index)))
    }

    async fn find_by_genre(&self, genre: &str) -> StoreResult<Vec<BookRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.genres.iter().any(|g| g == genre))
            .cloned()
            .collect())
    }
}
