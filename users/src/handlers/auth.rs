use actix_web::{
    post,
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

use common::{context::GeneralContext, error};

use crate::service::{
    auth::{AuthService, Login},
    user::{CreateUser, UserService},
};

#[post("/api/auth/register")]
pub async fn post_register(
    context: GeneralContext,
    Json(data): web::Json<CreateUser>,
) -> error::Result<HttpResponse> {
    let user = UserService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": user,
    })))
}

#[post("/api/auth/login")]
pub async fn post_login(
    context: GeneralContext,
    Json(data): web::Json<Login>,
) -> error::Result<HttpResponse> {
    let response = AuthService::new(context).login(data).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": response,
    })))
}
