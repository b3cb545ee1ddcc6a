use std::{env, sync::Arc};

use actix_web::HttpServer;
use mongodb::bson::oid::ObjectId;

use admin::create_app;
use common::{
    context::ServiceState,
    entities::{department::Department, issue::Issue},
    repository::mongo_repository::MongoRepository,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mongo_uri = env::var("MONGOURI").unwrap();

    let issue_repo: MongoRepository<Issue> =
        MongoRepository::new(&mongo_uri, "civic", "issues").await;
    let department_repo: MongoRepository<Department> =
        MongoRepository::new(&mongo_uri, "civic", "departments").await;

    let mut state = ServiceState::new("admin");
    state.insert(Arc::new(issue_repo));
    state.insert(Arc::new(department_repo));
    let state = Arc::new(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3003);

    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
