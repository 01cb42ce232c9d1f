use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;

pub struct CORS {
    allowed_origins: Vec<String>,
}

impl CORS {
    /// Each entry is `scheme://host` (any port) or `scheme://host:port`;
    /// `*` allows any origin.
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| {
            allowed == "*"
                || origin
                    .strip_prefix(allowed.trim_end_matches('/'))
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
        })
    }
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else { return };

        if self.allows(origin) {
            res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
            res.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
            res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type, Authorization, X-User-Id, X-User-Name"));
            res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
        }
    }
}
