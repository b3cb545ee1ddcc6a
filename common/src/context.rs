use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use anyhow::anyhow;
use type_map::concurrent::TypeMap;

use crate::{
    auth::Auth,
    error::{self, AddCode, ServiceError},
    repository::RepositoryObject,
};

/// Process-wide state: every repository the service talks to, registered
/// once in `main` and shared by reference.
pub struct ServiceState {
    pub repositories: TypeMap,
    pub service_auth: Auth,
}

impl ServiceState {
    pub fn new(service_name: &str) -> Self {
        Self {
            repositories: TypeMap::new(),
            service_auth: Auth::Service(service_name.to_string()),
        }
    }

    pub fn insert<T: 'static>(&mut self, repository: RepositoryObject<T>) {
        self.repositories.insert(repository);
    }
}

#[derive(Clone)]
pub struct GeneralContext {
    state: Arc<ServiceState>,
    auth: Auth,
}

impl GeneralContext {
    pub fn new(state: Arc<ServiceState>, auth: Auth) -> Self {
        Self { state, auth }
    }

    pub fn auth(&self) -> Auth {
        self.auth.clone()
    }

    pub fn server_auth(&self) -> Auth {
        self.state.service_auth.clone()
    }

    pub fn try_get_repository<T: 'static>(&self) -> error::Result<RepositoryObject<T>> {
        self.state
            .repositories
            .get::<RepositoryObject<T>>()
            .cloned()
            .ok_or(
                anyhow!(
                    "Repository for type {} not found",
                    std::any::type_name::<T>()
                )
                .code(500),
            )
    }
}

impl FromRequest for GeneralContext {
    type Error = ServiceError;

    type Future = futures_util::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        fn from_request_inner(
            req: &HttpRequest,
            _payload: &mut Payload,
        ) -> error::Result<GeneralContext> {
            let auth = req
                .headers()
                .get("Authorization")
                .and_then(|x| x.to_str().ok())
                .and_then(|x| x.strip_prefix("Bearer "))
                .map(Auth::from_token);

            let user_auth = match auth {
                Some(Ok(Some(res))) => res,
                Some(Ok(None)) => {
                    log::info!("Token expired");
                    Auth::None
                }
                Some(Err(err)) => {
                    log::error!("Error parsing token: {:?}", err);
                    Auth::None
                }
                None => Auth::None,
            };

            let Some(state) = req.app_data::<Data<Arc<ServiceState>>>() else {
                return Err(anyhow!("No state provided").code(500));
            };

            Ok(GeneralContext::new(Arc::clone(state), user_auth))
        }
        let result = from_request_inner(req, payload);

        Box::pin(async move { result })
    }
}
