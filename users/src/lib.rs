pub mod handlers;
pub mod indexes;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::ServiceFactory;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::middleware;
use actix_web::web;
use actix_web::App;

use common::context::ServiceState;

pub use handlers::auth::*;
pub use handlers::user::*;
pub use indexes::ensure_indexes;

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();
    App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .service(post_register)
        .service(post_login)
        .service(get_my_user)
        .service(get_user)
        .service(patch_user)
}

/// State over in-memory repositories, for tests.
pub fn create_test_state() -> Arc<ServiceState> {
    use common::entities::user::User;
    use common::repository::{test_repository::TestRepository, RepositoryObject};
    use mongodb::bson::oid::ObjectId;

    std::env::set_var("JWT_SECRET", "test-secret");

    let users: RepositoryObject<User> = Arc::new(TestRepository::new());

    let mut state = ServiceState::new("users");
    state.insert(users);
    Arc::new(state)
}
