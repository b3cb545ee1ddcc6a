use std::{env, sync::Arc};

use actix_web::HttpServer;
use mongodb::bson::oid::ObjectId;

use common::{
    context::ServiceState,
    entities::{department::Department, issue::Issue, user::User},
    repository::mongo_repository::MongoRepository,
};
use issues::{create_app, indexes::ensure_indexes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mongo_uri = env::var("MONGOURI").unwrap();

    ensure_indexes(&mongo_uri).await.expect("Index setup error");

    let issue_repo: MongoRepository<Issue> =
        MongoRepository::new(&mongo_uri, "civic", "issues").await;
    let department_repo: MongoRepository<Department> =
        MongoRepository::new(&mongo_uri, "civic", "departments").await;
    let user_repo: MongoRepository<User> =
        MongoRepository::new(&mongo_uri, "civic", "users").await;

    let mut state = ServiceState::new("issues");
    state.insert(Arc::new(issue_repo));
    state.insert(Arc::new(department_repo));
    state.insert(Arc::new(user_repo));
    let state = Arc::new(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3002);

    HttpServer::new(move || create_app(state.clone()))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
