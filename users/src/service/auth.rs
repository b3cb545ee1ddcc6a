use mongodb::bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use common::{
    auth::Auth,
    context::GeneralContext,
    entities::user::{PublicUser, User},
    error::{self, AddCode},
};

use super::user::hash_password;

#[derive(Debug, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

pub struct AuthService {
    context: GeneralContext,
}

impl AuthService {
    pub fn new(context: GeneralContext) -> Self {
        Self { context }
    }

    pub async fn login(&self, login: Login) -> error::Result<LoginResponse> {
        let users = self.context.try_get_repository::<User>()?;

        let email = login.email.to_lowercase();
        let Some(user) = users.find("email", &Bson::String(email)).await? else {
            return Err(anyhow::anyhow!("Invalid credentials").code(401));
        };

        if !user.is_active {
            return Err(anyhow::anyhow!("Account is deactivated").code(401));
        }

        if hash_password(&login.password, &user.salt) != user.password {
            return Err(anyhow::anyhow!("Invalid credentials").code(401));
        }

        let token = Auth::from_role(user.role, user.id).to_token()?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }
}
