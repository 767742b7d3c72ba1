//! MongoDB-backed book repository.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{options::ReturnDocument, Collection};

use bookshelf_db::Connection;

use super::{
    models::BookRecord,
    repository::{BookRepository, StoreResult},
};

pub const COLLECTION: &str = "books";

#[derive(Debug, Clone)]
pub struct MongoBookRepository {
    connection: Connection,
    collection: Collection<BookRecord>,
}

impl MongoBookRepository {
    pub fn new(connection: Connection) -> Self {
        let collection = connection.database().collection(COLLECTION);
        Self {
            connection,
            collection,
        }
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn insert(&self, record: BookRecord) -> StoreResult<BookRecord> {
        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    async fn find_all(&self) -> StoreResult<Vec<BookRecord>> {
        Ok(self
            .collection
            .find(doc! {})
            .await?
            .try_collect::<Vec<_>>()
            .await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<BookRecord>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn replace(&self, record: BookRecord) -> StoreResult<Option<BookRecord>> {
        Ok(self
            .collection
            .find_one_and_replace(doc! { "_id": record.id }, &record)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: ObjectId) -> StoreResult<Option<BookRecord>> {
        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?)
    }

    async fn find_by_genre(&self, genre: &str) -> StoreResult<Vec<BookRecord>> {
        // An equality filter on an array field matches any element.
        Ok(self
            .collection
            .find(doc! { "genres": genre })
            .await?
            .try_collect::<Vec<_>>()
            .await?)
    }

    async fn close(&self) -> StoreResult<()> {
        self.connection.clone().close().await;
        Ok(())
    }
}
