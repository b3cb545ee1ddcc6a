pub mod mongo_repository;
pub mod test_repository;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use crate::error;

pub trait Entity {
    fn id(&self) -> ObjectId;
    fn timestamp(&self) -> i64;
}

#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn insert(&self, item: &T) -> error::Result<bool>;
    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>>;
    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>>;
    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>>;
    async fn find_all(&self) -> error::Result<Vec<T>>;
    /// One page of matches, newest first, plus the total match count.
    async fn find_page(
        &self,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> error::Result<(Vec<T>, u64)>;
    async fn count(&self, filter: Document) -> error::Result<u64>;
    /// Single store-side update (`$set` / `$push` operators); returns the
    /// document as it is after the update, or None when nothing matched.
    async fn update_one(&self, filter: Document, update: Document) -> error::Result<Option<T>>;
}

pub type RepositoryObject<T> = Arc<dyn Repository<T>>;
