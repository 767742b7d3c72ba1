use std::sync::Arc;

use bson::oid::ObjectId;

use super::{
    models::{Book, BookFields},
    repository::{BookRepository, StoreError, StoreResult},
    validation::{current_year, validate},
};

/// Book operations over an injected repository.
///
/// Validation runs on every write against the current calendar year. Writes are logged before
/// and after they reach the repository.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, fields: BookFields) -> StoreResult<Book> {
        let record = validate(fields, current_year())?.into_record(ObjectId::new());

        tracing::info!(title = %record.title, "saving book");
        let saved = self.repository.insert(record).await?;
        tracing::info!(id = %saved.id, title = %saved.title, "saved book");

        Ok(saved.into())
    }

    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        let records = self.repository.find_all().await?;
        Ok(records.into_iter().map(Book::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Book> {
        let id = parse_id(id)?;
        self.repository
            .find_by_id(id)
            .await?
            .map(Book::from)
            .ok_or(StoreError::NotFound)
    }

    /// Overlay `patch` onto the stored book and re-validate the whole result.
    pub async fn update(&self, id: &str, patch: BookFields) -> StoreResult<Book> {
        let id = parse_id(id)?;
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let record = validate(existing.to_fields().merge(patch), current_year())?.into_record(id);

        tracing::info!(id = %id, title = %record.title, "saving book");
        let saved = self
            .repository
            .replace(record)
            .await?
            .ok_or(StoreError::NotFound)?;
        tracing::info!(id = %saved.id, title = %saved.title, "saved book");

        Ok(saved.into())
    }

    pub async fn delete(&self, id: &str) -> StoreResult<Book> {
        let id = parse_id(id)?;
        let book = self
            .repository
            .delete(id)
            .await?
            .map(Book::from)
            .ok_or(StoreError::NotFound)?;

        tracing::info!(id = %book.id, "deleted book: {}", book.info());
        Ok(book)
    }

    pub async fn find_by_genre(&self, genre: &str) -> StoreResult<Vec<Book>> {
        let records = self.repository.find_by_genre(genre).await?;
        Ok(records.into_iter().map(Book::from).collect())
    }

    pub async fn close(&self) -> StoreResult<()> {
        self.repository.close().await
    }
}

/// Identifiers that are not ObjectIds cannot match any record.
fn parse_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::NotFound)
}
