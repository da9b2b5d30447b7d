use rocket::http::Status;
use rocket::response::Responder;
use thiserror::Error;

// "Already voted" is not an error: it is reported as success:false with
// HTTP 200.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Charity not found")]
    CharityNotFound,
    #[error("Authentication expired")]
    AuthExpired,
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<crate::force::ForceError> for ApiError {
    fn from(e: crate::force::ForceError) -> Self {
        match e {
            crate::force::ForceError::AuthExpired => ApiError::AuthExpired,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<crate::facebook::FacebookError> for ApiError {
    fn from(e: crate::facebook::FacebookError) -> Self {
        match e {
            crate::facebook::FacebookError::SessionExpired => ApiError::AuthExpired,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match self {
            ApiError::CharityNotFound => Status::NotFound,
            ApiError::AuthExpired => Status::Unauthorized,
            ApiError::Upstream(_) => Status::BadGateway,
            ApiError::Storage(_) => Status::InternalServerError,
        };

        rocket::Response::build_from(self.to_string().respond_to(req)?)
            .status(status)
            .ok()
    }
}
