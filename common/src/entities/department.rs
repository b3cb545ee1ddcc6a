use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{default_timestamp, entities::issue::Category, repository::Entity};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Department {
    pub id: ObjectId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub contact: Contact,
    pub head: Option<ObjectId>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default = "default_timestamp")]
    pub created_at: i64,
    #[serde(default = "default_timestamp")]
    pub last_modified: i64,
}

fn default_is_active() -> bool {
    true
}

impl Entity for Department {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn timestamp(&self) -> i64 {
        self.created_at
    }
}
