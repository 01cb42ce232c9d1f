use rocket::{Request, catch, serde::json::Json};
use shared::error::{ErrorCode, ErrorResponse};

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::ValidationFailed, "Invalid request parameters."))
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::Unauthorized, "Not authorized, no valid user id provided"))
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::NotFound, "The requested resource was not found."))
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::ValidationFailed, "Request body is missing required fields."))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(ErrorCode::InternalError, "An internal server error occurred."))
}
