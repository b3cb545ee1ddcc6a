use actix_web::{
    get, post, put,
    web::{self, Json},
    HttpResponse,
};
use serde_json::json;

use common::{context::GeneralContext, error};

use crate::service::issue::{
    ChangeIssue, CreateIssue, IssueQuery, IssueService, IssuesList, NearbyQuery,
};

#[post("/api/issues")]
pub async fn post_issue(
    context: GeneralContext,
    Json(data): web::Json<CreateIssue>,
) -> error::Result<HttpResponse> {
    let issue = IssueService::new(context).create(data).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Issue reported successfully",
        "data": issue,
    })))
}

#[get("/api/issues")]
pub async fn get_issues(
    context: GeneralContext,
    query: web::Query<IssueQuery>,
) -> error::Result<Json<IssuesList>> {
    Ok(Json(
        IssueService::new(context).list(query.into_inner()).await?,
    ))
}

#[get("/api/issues/nearby")]
pub async fn get_nearby_issues(
    context: GeneralContext,
    query: web::Query<NearbyQuery>,
) -> error::Result<HttpResponse> {
    let issues = IssueService::new(context)
        .nearby(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": issues.len(),
        "data": issues,
    })))
}

#[get("/api/issues/{id}")]
pub async fn get_issue(
    context: GeneralContext,
    id: web::Path<String>,
) -> error::Result<HttpResponse> {
    let issue = IssueService::new(context).find(id.parse()?).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": issue,
    })))
}

#[put("/api/issues/{id}")]
pub async fn put_issue(
    context: GeneralContext,
    id: web::Path<String>,
    Json(data): Json<ChangeIssue>,
) -> error::Result<HttpResponse> {
    let issue = IssueService::new(context).change(id.parse()?, data).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Issue updated successfully",
        "data": issue,
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
        default_timestamp,
        entities::{
            department::{Contact, Department},
            issue::{Category, Issue},
            role::Role,
            user::{Address, User},
        },
        repository::{test_repository::TestRepository, RepositoryObject},
    };

    use crate::create_app;

    fn test_user(role: Role) -> User {
        User {
            id: ObjectId::new(),
            name: "Rajesh Kumar".to_string(),
            email: "rajesh@example.com".to_string(),
            password: "hash".to_string(),
            salt: "salt".to_string(),
            phone: "9876543210".to_string(),
            address: Address::default(),
            role,
            department: None,
            is_active: true,
            created_at: default_timestamp(),
            last_modified: default_timestamp(),
        }
    }

    fn test_department(name: &str, code: &str, categories: Vec<Category>) -> Department {
        Department {
            id: ObjectId::new(),
            name: name.to_string(),
            code: code.to_string(),
            description: None,
            categories,
            contact: Contact::default(),
            head: None,
            is_active: true,
            created_at: default_timestamp(),
            last_modified: default_timestamp(),
        }
    }

    struct TestEnv {
        issues: RepositoryObject<Issue>,
        departments: RepositoryObject<Department>,
        users: RepositoryObject<User>,
        state: Arc<ServiceState>,
    }

    fn test_env() -> TestEnv {
        std::env::set_var("JWT_SECRET", "test-secret");

        let issues: RepositoryObject<Issue> = Arc::new(TestRepository::new());
        let departments: RepositoryObject<Department> = Arc::new(TestRepository::new());
        let users: RepositoryObject<User> = Arc::new(TestRepository::new());

        let mut state = ServiceState::new("issues");
        state.insert(Arc::clone(&issues));
        state.insert(Arc::clone(&departments));
        state.insert(Arc::clone(&users));

        TestEnv {
            issues,
            departments,
            users,
            state: Arc::new(state),
        }
    }

    fn issue_body() -> Value {
        json!({
            "title": "Large pothole near the bus stand",
            "description": "Deep pothole damaging vehicles",
            "category": "pothole",
            "location": {
                "address": "Main Road, Ranchi",
                "coordinates": { "lng": 85.3096, "lat": 23.3441 },
                "ward": null,
                "pincode": null,
            },
        })
    }

    #[actix_web::test]
    async fn create_issue_auto_assigns_department() {
        let env = test_env();
        let reporter = test_user(Role::Citizen);
        env.users.insert(&reporter).await.unwrap();
        env.departments
            .insert(&test_department(
                "Public Works Department",
                "PWD",
                vec![Category::Pothole, Category::RoadDamage],
            ))
            .await
            .unwrap();

        let app = init_service(create_app(env.state.clone())).await;

        let token = Auth::User(reporter.id).to_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/issues")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(issue_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["assignedTo"]["code"], json!("PWD"));
        assert_eq!(body["data"]["status"], json!("reported"));
        assert_eq!(body["data"]["reportedBy"]["name"], json!("Rajesh Kumar"));
    }

    #[actix_web::test]
    async fn create_issue_without_matching_department_stays_unassigned() {
        let env = test_env();
        let reporter = test_user(Role::Citizen);
        env.users.insert(&reporter).await.unwrap();

        let app = init_service(create_app(env.state.clone())).await;

        let token = Auth::User(reporter.id).to_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/issues")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(issue_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["assignedTo"], Value::Null);
    }

    #[actix_web::test]
    async fn create_issue_requires_authentication() {
        let env = test_env();
        let app = init_service(create_app(env.state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/api/issues")
            .set_json(issue_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn status_update_appends_record_with_default_description() {
        let env = test_env();
        let reporter = test_user(Role::Citizen);
        let staff = test_user(Role::DepartmentStaff);
        env.users.insert(&reporter).await.unwrap();
        env.users.insert(&staff).await.unwrap();

        let app = init_service(create_app(env.state.clone())).await;

        let token = Auth::User(reporter.id).to_token().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/issues")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(issue_body())
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let staff_token = Auth::Staff(staff.id).to_token().unwrap();
        let req = test::TestRequest::put()
            .uri(&format!("/api/issues/{}", id))
            .insert_header(("Authorization", format!("Bearer {}", staff_token)))
            .set_json(json!({ "status": "in_progress" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], json!("in_progress"));
        let updates = body["data"]["updates"].as_array().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0]["description"],
            json!("Status changed to in_progress")
        );
        assert_eq!(updates[0]["status"], json!("in_progress"));
        assert_eq!(updates[0]["updatedBy"]["role"], json!("department_staff"));

        // a second update must extend, not replace, the trail
        let req = test::TestRequest::put()
            .uri(&format!("/api/issues/{}", id))
            .insert_header(("Authorization", format!("Bearer {}", staff_token)))
            .set_json(json!({ "status": "resolved", "updateDescription": "Road repaired" }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let updates = body["data"]["updates"].as_array().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0]["description"], json!("Status changed to in_progress"));
        assert_eq!(updates[1]["description"], json!("Road repaired"));
    }

    #[actix_web::test]
    async fn get_missing_issue_returns_not_found() {
        let env = test_env();
        let app = init_service(create_app(env.state.clone())).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/issues/{}", ObjectId::new().to_hex()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], json!(false));
    }

    #[actix_web::test]
    async fn update_missing_issue_returns_not_found() {
        let env = test_env();
        let staff = test_user(Role::DepartmentStaff);
        env.users.insert(&staff).await.unwrap();

        let app = init_service(create_app(env.state.clone())).await;

        let token = Auth::Staff(staff.id).to_token().unwrap();
        let req = test::TestRequest::put()
            .uri(&format!("/api/issues/{}", ObjectId::new().to_hex()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "status": "acknowledged" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
    }

    #[actix_web::test]
    async fn list_issues_paginates() {
        let env = test_env();
        let reporter = test_user(Role::Citizen);
        env.users.insert(&reporter).await.unwrap();

        for n in 0..3 {
            let issue = Issue {
                id: ObjectId::new(),
                title: format!("Issue {}", n),
                description: "Street light not working".to_string(),
                category: Category::Streetlight,
                location: serde_json::from_value(issue_body()["location"].clone()).unwrap(),
                images: Vec::new(),
                reported_by: reporter.id,
                status: Default::default(),
                priority: Default::default(),
                assigned_to: None,
                assigned_staff: None,
                estimated_resolution_time: None,
                actual_resolution_time: None,
                updates: Vec::new(),
                citizen_feedback: None,
                created_at: n,
                last_modified: n,
            };
            env.issues.insert(&issue).await.unwrap();
        }

        let app = init_service(create_app(env.state.clone())).await;

        let req = test::TestRequest::get()
            .uri("/api/issues?limit=2")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["count"], json!(2));
        assert_eq!(body["total"], json!(3));
        assert_eq!(body["pages"], json!(2));
        // newest first
        assert_eq!(body["data"][0]["title"], json!("Issue 2"));

        let req = test::TestRequest::get()
            .uri("/api/issues?limit=2&page=5")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["count"], json!(0));
        assert_eq!(body["total"], json!(3));

        let req = test::TestRequest::get()
            .uri("/api/issues?category=streetlight&status=resolved")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["total"], json!(0));
    }
}
