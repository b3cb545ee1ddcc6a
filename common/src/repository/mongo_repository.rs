use async_trait::async_trait;
use futures::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error;

use super::{Entity, Repository};

pub struct MongoRepository<T> {
    pub collection: mongodb::Collection<T>,
}

impl<T> MongoRepository<T> {
    pub async fn new(mongo_uri: &str, database: &str, collection: &str) -> Self {
        let collection = mongodb::Client::with_uri_str(mongo_uri)
            .await
            .unwrap()
            .database(database)
            .collection(collection);
        Self { collection }
    }
}

#[async_trait]
impl<T> Repository<T> for MongoRepository<T>
where
    T: Entity + Serialize + DeserializeOwned + Unpin + Clone + Send + Sync,
{
    async fn insert(&self, item: &T) -> error::Result<bool> {
        let result = self
            .collection
            .find_one(doc! {"id": item.id()}, None)
            .await?
            .is_none();

        if result {
            self.collection.insert_one(item, None).await?;
        }
        Ok(result)
    }

    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>> {
        let result = self.collection.find_one(doc! {field: value}, None).await?;
        Ok(result)
    }

    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>> {
        let result = self
            .collection
            .find_one_and_delete(doc! {field: id}, None)
            .await?;
        Ok(result)
    }

    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>> {
        let result: Vec<mongodb::error::Result<T>> = self
            .collection
            .find(doc! {field: value}, None)
            .await?
            .collect()
            .await;
        Ok(result.into_iter().collect::<mongodb::error::Result<_>>()?)
    }

    async fn find_all(&self) -> error::Result<Vec<T>> {
        let result: Vec<mongodb::error::Result<T>> =
            self.collection.find(None, None).await?.collect().await;
        Ok(result.into_iter().collect::<mongodb::error::Result<_>>()?)
    }

    async fn find_page(
        &self,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> error::Result<(Vec<T>, u64)> {
        let find_options = FindOptions::builder()
            .sort(doc! {"created_at": -1})
            .skip(skip)
            .limit(limit)
            .build();

        let result: Vec<mongodb::error::Result<T>> = self
            .collection
            .find(filter.clone(), find_options)
            .await?
            .collect()
            .await;

        let total = self.collection.count_documents(filter, None).await?;

        Ok((
            result.into_iter().collect::<mongodb::error::Result<_>>()?,
            total,
        ))
    }

    async fn count(&self, filter: Document) -> error::Result<u64> {
        Ok(self.collection.count_documents(filter, None).await?)
    }

    async fn update_one(&self, filter: Document, update: Document) -> error::Result<Option<T>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let result = self
            .collection
            .find_one_and_update(filter, update, options)
            .await?;
        Ok(result)
    }
}
