use actix_web::HttpResponse;
use serde_json::json;

#[derive(Debug)]
pub struct ServiceError {
    err: anyhow::Error,
    code: u16,
}

pub trait AddCode {
    fn code(self, code: u16) -> ServiceError;
}

impl AddCode for anyhow::Error {
    fn code(self, code: u16) -> ServiceError {
        ServiceError { err: self, code }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ServiceError: {}", self.err)
    }
}

impl actix_web::error::ResponseError for ServiceError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.code)
            .unwrap_or(actix_web::http::StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        // 5xx detail goes to the log, never to the client
        let message = if self.code >= 500 {
            log::error!("Internal error: {:?}", self.err);
            "Something went wrong".to_string()
        } else {
            self.err.to_string()
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": message,
        }))
    }
}

impl<E: Into<anyhow::Error>> From<E> for ServiceError {
    fn from(err: E) -> ServiceError {
        ServiceError {
            err: err.into(),
            code: 400,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
