use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::error::{ErrorCode, ErrorResponse};
use thiserror::Error;
use tracing::error;
use crate::processor::ProcessorError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Poll not found")]
    PollNotFound,
    #[error("Invalid option")]
    InvalidOption,
    #[error("You have already voted on this poll")]
    DuplicateVote,
    #[error("Invalid poll ID format")]
    InvalidId,
    #[error("{0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::PollNotFound => Status::NotFound,
            ApiError::InvalidOption => Status::BadRequest,
            ApiError::DuplicateVote => Status::BadRequest,
            ApiError::InvalidId => Status::BadRequest,
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::PollNotFound => ErrorCode::PollNotFound,
            ApiError::InvalidOption => ErrorCode::InvalidOption,
            ApiError::DuplicateVote => ErrorCode::DuplicateVote,
            ApiError::InvalidId => ErrorCode::InvalidId,
            ApiError::Validation(_) => ErrorCode::ValidationFailed,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Internal details stay in the log.
    pub fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Internal(_) => ErrorResponse::from_code(ErrorCode::InternalError),
            other => ErrorResponse::new(other.code(), other.to_string()),
        }
    }
}

impl From<ProcessorError> for ApiError {
    fn from(e: ProcessorError) -> Self {
        match e {
            ProcessorError::PollNotFound => ApiError::PollNotFound,
            ProcessorError::DuplicateVote => ApiError::DuplicateVote,
            ProcessorError::Validation(shared::ValidationError::InvalidOption) => ApiError::InvalidOption,
            ProcessorError::Validation(v) => ApiError::Validation(v.to_string()),
            ProcessorError::Inappropriate(what) => ApiError::Validation(format!("Possible profanity detected in {}", what)),
            ProcessorError::Store(s) => ApiError::Internal(s.to_string()),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        if let ApiError::Internal(detail) = &self {
            error!("{} {} failed: {}", req.method(), req.uri(), detail);
        }

        let status = self.status();
        rocket::Response::build_from(Json(self.body()).respond_to(req)?)
            .status(status)
            .ok()
    }
}
