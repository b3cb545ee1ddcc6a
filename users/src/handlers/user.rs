use actix_web::{
    get, patch,
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

use common::{context::GeneralContext, error};

use crate::service::user::{UserChange, UserService};

#[get("/api/users/me")]
pub async fn get_my_user(context: GeneralContext) -> error::Result<HttpResponse> {
    let user = UserService::new(context).my_user().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": user,
    })))
}

#[get("/api/users/{id}")]
pub async fn get_user(
    context: GeneralContext,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let user = UserService::new(context).find(id.parse()?).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": user,
    })))
}

#[patch("/api/users/{id}")]
pub async fn patch_user(
    context: GeneralContext,
    id: web::Path<String>,
    Json(data): Json<UserChange>,
) -> error::Result<HttpResponse> {
    let user = UserService::new(context).change(id.parse()?, data).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": user,
    })))
}

#[cfg(test)]
mod test {
    use actix_web::test::{self, init_service};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    use common::auth::Auth;

    use crate::{create_app, create_test_state};

    fn register_request(email: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Priya Singh",
                "email": email,
                "password": "secret123",
                "phone": "9876543210",
            }))
    }

    #[actix_web::test]
    async fn me_returns_own_profile() {
        let app = init_service(create_app(create_test_state())).await;

        let resp =
            test::call_service(&app, register_request("priya@example.com").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        let token = Auth::User(id.parse().unwrap()).to_token().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["email"], json!("priya@example.com"));
    }

    #[actix_web::test]
    async fn me_requires_authentication() {
        let app = init_service(create_app(create_test_state())).await;

        let req = test::TestRequest::get().uri("/api/users/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn citizens_cannot_change_other_users() {
        let app = init_service(create_app(create_test_state())).await;

        let resp =
            test::call_service(&app, register_request("priya@example.com").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        let target = body["data"]["id"].as_str().unwrap().to_string();
        let token = Auth::User(ObjectId::new()).to_token().unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/users/{}", target))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "name": "Someone Else" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);
    }

    #[actix_web::test]
    async fn user_updates_own_profile() {
        let app = init_service(create_app(create_test_state())).await;

        let resp =
            test::call_service(&app, register_request("priya@example.com").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        let token = Auth::User(id.parse().unwrap()).to_token().unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/users/{}", id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "phone": "9000000000" }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["phone"], json!("9000000000"));
    }
}
