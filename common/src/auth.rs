use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{
    entities::role::Role,
    error::{self, AddCode},
};

pub static ENCODING_KEY: Lazy<EncodingKey> = Lazy::new(|| {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    EncodingKey::from_secret(secret.as_bytes())
});

pub static DECODING_KEY: Lazy<DecodingKey> = Lazy::new(|| {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    DecodingKey::from_secret(secret.as_bytes())
});

pub static DURATION: Lazy<Duration> = Lazy::new(|| Duration::days(7));

/// Verified caller identity carried by every request.
#[derive(Debug, Clone, PartialEq)]
pub enum Auth {
    Service(String),
    Admin(ObjectId),
    Staff(ObjectId),
    User(ObjectId),
    None,
}

impl Auth {
    pub fn id(&self) -> Option<&ObjectId> {
        match self {
            Auth::Admin(id) => Some(id),
            Auth::Staff(id) => Some(id),
            Auth::User(id) => Some(id),
            _ => None,
        }
    }

    pub fn full_access(&self) -> bool {
        matches!(self, Auth::Admin(_) | Auth::Service(_))
    }

    pub fn from_role(role: Role, id: ObjectId) -> Self {
        match role {
            Role::Admin => Auth::Admin(id),
            Role::DepartmentStaff => Auth::Staff(id),
            Role::Citizen => Auth::User(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TokenRole {
    Admin,
    Staff,
    Citizen,
    Service,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    role: TokenRole,
    user_id: Option<String>,
    service_name: Option<String>,
    exp: i64,
}

impl Auth {
    pub fn from_token(token: &str) -> error::Result<Option<Self>> {
        let claims = match decode::<Claims>(token, &DECODING_KEY, &Validation::new(Algorithm::HS512))
        {
            Ok(c) => c.claims,
            Err(err) if matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
                return Ok(None);
            }
            Err(err) => return Err(anyhow::anyhow!("Error parsing token: {}", err).code(401)),
        };

        let auth = match claims.role {
            TokenRole::Admin => Auth::Admin(claims.user_id.unwrap_or_default().parse()?),
            TokenRole::Staff => Auth::Staff(claims.user_id.unwrap_or_default().parse()?),
            TokenRole::Citizen => Auth::User(claims.user_id.unwrap_or_default().parse()?),
            TokenRole::Service => Auth::Service(claims.service_name.unwrap_or_default()),
        };

        Ok(Some(auth))
    }

    pub fn to_token(&self) -> error::Result<String> {
        let header = Header {
            alg: Algorithm::HS512,
            ..Default::default()
        };
        let exp = Utc::now().timestamp() + DURATION.num_seconds();
        let claims = match self {
            Auth::Service(name) => Claims {
                role: TokenRole::Service,
                user_id: None,
                service_name: Some(name.clone()),
                exp,
            },
            Auth::Admin(id) => Claims {
                role: TokenRole::Admin,
                user_id: Some(id.to_hex()),
                service_name: None,
                exp,
            },
            Auth::Staff(id) => Claims {
                role: TokenRole::Staff,
                user_id: Some(id.to_hex()),
                service_name: None,
                exp,
            },
            Auth::User(id) => Claims {
                role: TokenRole::Citizen,
                user_id: Some(id.to_hex()),
                service_name: None,
                exp,
            },
            Auth::None => {
                return Err(anyhow::anyhow!("Cannot create token for Auth::None").code(500))
            }
        };

        match jsonwebtoken::encode(&header, &claims, &ENCODING_KEY) {
            Ok(token) => Ok(token),
            Err(_) => Err(anyhow::anyhow!("Failed to encode token").code(500)),
        }
    }
}
