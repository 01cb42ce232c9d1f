use crate::error::ApiError;
use uuid::Uuid;

pub fn parse_poll_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::InvalidId)
}
