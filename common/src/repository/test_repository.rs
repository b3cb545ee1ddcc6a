use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::error;

use super::{Entity, Repository};

/// In-memory stand-in for a mongo collection, used by service and handler
/// tests. Understands the equality filters and the `$set` / `$push`
/// operators the services actually issue.
pub struct TestRepository<T> {
    _t: std::marker::PhantomData<T>,
    pub db: Mutex<Vec<Bson>>,
}

impl<T> TestRepository<T> {
    pub fn new() -> Self {
        Self {
            _t: std::marker::PhantomData,
            db: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Default for TestRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

fn apply_update(doc: &mut Document, update: &Document) {
    if let Some(Bson::Document(set)) = update.get("$set") {
        for (key, value) in set {
            doc.insert(key, value.clone());
        }
    }
    if let Some(Bson::Document(push)) = update.get("$push") {
        for (key, value) in push {
            match doc.get_mut(key) {
                Some(Bson::Array(array)) => array.push(value.clone()),
                _ => {
                    doc.insert(key, Bson::Array(vec![value.clone()]));
                }
            }
        }
    }
}

#[async_trait]
impl<T> Repository<T> for TestRepository<T>
where
    T: Entity + Clone + Send + Sync + Serialize + DeserializeOwned,
{
    async fn insert(&self, item: &T) -> error::Result<bool> {
        let mut db = self.db.lock().unwrap();

        let contains = db
            .iter()
            .any(|x| x.as_document().unwrap().get_object_id("id").unwrap() == item.id());
        if !contains {
            db.push(bson::to_bson(&item).unwrap());
        }
        Ok(!contains)
    }

    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .find(|x| x.as_document().unwrap().get(field) == Some(value))
            .cloned()
            .map(|x| bson::from_bson(x).unwrap()))
    }

    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>> {
        let mut db = self.db.lock().unwrap();
        let pos = db.iter().position(|x| {
            x.as_document()
                .unwrap()
                .get_object_id(field)
                .map(|found| found == *id)
                .unwrap_or(false)
        });

        Ok(pos.map(|pos| bson::from_bson(db.remove(pos)).unwrap()))
    }

    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .filter(|x| x.as_document().unwrap().get(field) == Some(value))
            .map(|x| bson::from_bson(x.clone()).unwrap())
            .collect())
    }

    async fn find_all(&self) -> error::Result<Vec<T>> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .map(|x| bson::from_bson(x.clone()).unwrap())
            .collect())
    }

    async fn find_page(
        &self,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> error::Result<(Vec<T>, u64)> {
        let db = self.db.lock().unwrap();

        let mut matched: Vec<&Bson> = db
            .iter()
            .filter(|x| matches(x.as_document().unwrap(), &filter))
            .collect();
        matched.sort_by_key(|x| {
            std::cmp::Reverse(x.as_document().unwrap().get_i64("created_at").unwrap_or(0))
        });

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|x| bson::from_bson(x.clone()).unwrap())
            .collect();

        Ok((page, total))
    }

    async fn count(&self, filter: Document) -> error::Result<u64> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .filter(|x| matches(x.as_document().unwrap(), &filter))
            .count() as u64)
    }

    async fn update_one(&self, filter: Document, update: Document) -> error::Result<Option<T>> {
        let mut db = self.db.lock().unwrap();

        let Some(pos) = db
            .iter()
            .position(|x| matches(x.as_document().unwrap(), &filter))
        else {
            return Ok(None);
        };

        let mut doc = db[pos].as_document().unwrap().clone();
        apply_update(&mut doc, &update);
        db[pos] = Bson::Document(doc.clone());

        Ok(Some(bson::from_bson(Bson::Document(doc)).unwrap()))
    }
}
