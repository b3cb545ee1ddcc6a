use mongodb::bson::{oid::ObjectId, Bson};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, Edit},
    context::GeneralContext,
    default_timestamp,
    entities::{
        role::Role,
        user::{Address, PublicUser, User},
    },
    error::{self, AddCode},
};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap());

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: Option<Address>,
    pub role: Option<Role>,
    pub department: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UserChange {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub address: Option<Address>,
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut password = password.to_string();
    password.push_str(salt);
    sha256::digest(password)
}

pub struct UserService {
    context: GeneralContext,
}

impl UserService {
    pub fn new(context: GeneralContext) -> Self {
        Self { context }
    }

    pub async fn create(&self, user: CreateUser) -> error::Result<PublicUser> {
        let auth = self.context.auth();
        let users = self.context.try_get_repository::<User>()?;

        let name = user.name.trim().to_string();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Please add a name").code(400));
        }
        let email = user.email.to_lowercase();
        if !EMAIL_REGEX.is_match(&email) {
            return Err(anyhow::anyhow!("Please add a valid email").code(400));
        }
        if user.phone.trim().is_empty() {
            return Err(anyhow::anyhow!("Please add a phone number").code(400));
        }
        if user.password.chars().count() < 6 {
            return Err(anyhow::anyhow!("Password must be at least 6 characters").code(400));
        }

        if users.find("email", &Bson::String(email.clone())).await?.is_some() {
            return Err(anyhow::anyhow!("Email already registered").code(400));
        }

        // citizens cannot grant themselves elevated roles
        let role = match user.role {
            Some(role) if auth.full_access() => role,
            _ => Role::default(),
        };

        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let password = hash_password(&user.password, &salt);

        let user = User {
            id: ObjectId::new(),
            name,
            email,
            password,
            salt,
            phone: user.phone,
            address: user.address.unwrap_or_default(),
            role,
            department: user.department.map(|id| id.parse()).transpose()?,
            is_active: true,
            created_at: default_timestamp(),
            last_modified: default_timestamp(),
        };

        users.insert(&user).await?;

        Ok(user.into())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<PublicUser> {
        let users = self.context.try_get_repository::<User>()?;

        let Some(user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No user found").code(404));
        };

        Ok(user.into())
    }

    pub async fn my_user(&self) -> error::Result<PublicUser> {
        let auth = self.context.auth();

        let Some(id) = auth.id().copied() else {
            return Err(anyhow::anyhow!("Not authorized").code(401));
        };

        self.find(id).await
    }

    pub async fn change(&self, id: ObjectId, change: UserChange) -> error::Result<PublicUser> {
        let auth = self.context.auth();

        let users = self.context.try_get_repository::<User>()?;

        let Some(mut user) = users.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("No user found").code(404));
        };

        if !Edit.get_access(&auth, &user) {
            return Err(anyhow::anyhow!("Not authorized to change this user").code(403));
        }

        if let Some(name) = change.name {
            user.name = name;
        }
        if let Some(phone) = change.phone {
            user.phone = phone;
        }
        if let Some(address) = change.address {
            user.address = address;
        }
        if let Some(password) = change.password {
            if password.chars().count() < 6 {
                return Err(anyhow::anyhow!("Password must be at least 6 characters").code(400));
            }
            let salt: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(10)
                .map(char::from)
                .collect();
            user.password = hash_password(&password, &salt);
            user.salt = salt;
        }

        user.last_modified = default_timestamp();

        users.delete("id", &id).await?;
        users.insert(&user).await?;

        Ok(user.into())
    }
}
