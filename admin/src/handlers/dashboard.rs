use actix_web::{get, HttpResponse};
use serde_json::json;

use common::{context::GeneralContext, error};

use crate::service::dashboard::DashboardService;

#[get("/api/admin/dashboard")]
pub async fn get_dashboard(context: GeneralContext) -> error::Result<HttpResponse> {
    let stats = DashboardService::new(context).dashboard_stats().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats,
    })))
}

#[get("/api/admin/department-metrics")]
pub async fn get_department_metrics(context: GeneralContext) -> error::Result<HttpResponse> {
    let metrics = DashboardService::new(context).department_metrics().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": metrics,
    })))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use actix_web::test::{self, init_service};
    use mongodb::bson::oid::ObjectId;
    use serde_json::Value;

    use common::{
        auth::Auth,
        context::ServiceState,
        entities::{department::Department, issue::Issue},
        repository::{test_repository::TestRepository, RepositoryObject},
    };

    use crate::create_app;

    fn test_state() -> Arc<ServiceState> {
        std::env::set_var("JWT_SECRET", "test-secret");

        let issues: RepositoryObject<Issue> = Arc::new(TestRepository::new());
        let departments: RepositoryObject<Department> = Arc::new(TestRepository::new());

        let mut state = ServiceState::new("admin");
        state.insert(issues);
        state.insert(departments);
        Arc::new(state)
    }

    #[actix_web::test]
    async fn admin_and_staff_can_read_dashboard() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        for auth in [Auth::Admin(ObjectId::new()), Auth::Staff(ObjectId::new())] {
            let token = auth.to_token().unwrap();
            let req = test::TestRequest::get()
                .uri("/api/admin/dashboard")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], Value::Bool(true));
            assert_eq!(body["data"]["totalIssues"], Value::from(0));
        }
    }

    #[actix_web::test]
    async fn citizen_is_forbidden() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let token = Auth::User(ObjectId::new()).to_token().unwrap();
        let req = test::TestRequest::get()
            .uri("/api/admin/department-metrics")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);
    }

    #[actix_web::test]
    async fn anonymous_is_unauthorized() {
        let state = test_state();
        let app = init_service(create_app(state)).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);
    }
}
