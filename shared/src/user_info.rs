use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Header carrying the id of the caller, set by the authenticating proxy.
pub const USER_ID_HEADER: &str = "X-User-Id";
/// Optional display name of the caller.
pub const USER_NAME_HEADER: &str = "X-User-Name";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: Option<String>,
}

impl AuthUser {
    pub fn new(id: Uuid) -> Self {
        Self { id, username: None }
    }

    pub fn display_name(&self) -> String {
        self.username.clone().unwrap_or_else(|| self.id.to_string())
    }

    pub fn from_headers(user_id: Option<&str>, username: Option<&str>) -> Option<Self> {
        let id = Uuid::parse_str(user_id?.trim()).ok()?;
        let username = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        Some(Self { id, username })
    }
}

// Backend-specific Rocket implementation
#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::Status;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for AuthUser {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let headers = req.headers();
            match AuthUser::from_headers(headers.get_one(USER_ID_HEADER), headers.get_one(USER_NAME_HEADER)) {
                Some(user) => Outcome::Success(user),
                None => Outcome::Error((Status::Unauthorized, ())),
            }
        }
    }
}
