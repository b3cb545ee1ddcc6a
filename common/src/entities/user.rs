use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{default_timestamp, entities::role::Role, repository::Entity};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    pub pincode: Option<String>,
}

fn default_state() -> String {
    "Jharkhand".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub salt: String,
    pub phone: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub role: Role,
    pub department: Option<ObjectId>,
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

impl Entity for User {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn timestamp(&self) -> i64 {
        self.created_at
    }
}

/// Wire form of a user. Password hash and salt never leave the service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub role: Role,
    pub department: Option<String>,
    pub is_active: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            role: user.role,
            department: user.department.map(|id| id.to_hex()),
            is_active: user.is_active,
        }
    }
}
