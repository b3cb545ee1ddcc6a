use actix_web::{
    get, post,
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

use common::{context::GeneralContext, error};

use crate::service::department::{CreateDepartment, DepartmentService};

#[post("/api/departments")]
pub async fn post_department(
    context: GeneralContext,
    Json(data): web::Json<CreateDepartment>,
) -> error::Result<HttpResponse> {
    let department = DepartmentService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": department,
    })))
}

#[get("/api/departments")]
pub async fn get_departments(context: GeneralContext) -> error::Result<HttpResponse> {
    let departments = DepartmentService::new(context).list().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": departments.len(),
        "data": departments,
    })))
}

#[get("/api/departments/{id}")]
pub async fn get_department(
    context: GeneralContext,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let department = DepartmentService::new(context).find(id.parse()?).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": department,
    })))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use actix_web::test::{self, init_service};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    use common::{
        auth::Auth,
        context::ServiceState,
        entities::{department::Department, issue::Issue, user::User},
        repository::{test_repository::TestRepository, RepositoryObject},
    };

    use crate::create_app;

    fn test_state() -> Arc<ServiceState> {
        std::env::set_var("JWT_SECRET", "test-secret");

        let issues: RepositoryObject<Issue> = Arc::new(TestRepository::new());
        let departments: RepositoryObject<Department> = Arc::new(TestRepository::new());
        let users: RepositoryObject<User> = Arc::new(TestRepository::new());

        let mut state = ServiceState::new("issues");
        state.insert(issues);
        state.insert(departments);
        state.insert(users);
        Arc::new(state)
    }

    fn department_body() -> Value {
        json!({
            "name": "Public Works Department",
            "code": "pwd",
            "categories": ["pothole", "road_damage"],
            "contact": {
                "email": "pwd@jharkhand.gov.in",
                "phone": "0651-1234567",
                "address": "Public Works Department, Jharkhand",
            },
        })
    }

    #[actix_web::test]
    async fn admin_creates_department_with_uppercased_code() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let token = Auth::Admin(ObjectId::new()).to_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/departments")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(department_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["code"], json!("PWD"));
    }

    #[actix_web::test]
    async fn citizen_cannot_create_department() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let token = Auth::User(ObjectId::new()).to_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/departments")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(department_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);
    }

    #[actix_web::test]
    async fn duplicate_department_code_is_rejected() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let token = Auth::Admin(ObjectId::new()).to_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/departments")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(department_body())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let mut duplicate = department_body();
        duplicate["name"] = json!("Roads Department");
        let req = test::TestRequest::post()
            .uri("/api/departments")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(duplicate)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn lists_departments_in_creation_order() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let token = Auth::Admin(ObjectId::new()).to_token().unwrap();
        for (name, code) in [("Public Works Department", "PWD"), ("Municipal Corporation", "MC")] {
            let req = test::TestRequest::post()
                .uri("/api/departments")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .set_json(json!({ "name": name, "code": code, "categories": [] }))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::get().uri("/api/departments").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["count"], json!(2));
        assert_eq!(body["data"][0]["code"], json!("PWD"));
        assert_eq!(body["data"][1]["code"], json!("MC"));
    }

    #[actix_web::test]
    async fn missing_department_returns_not_found() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/departments/{}", ObjectId::new().to_hex()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
    }
}
