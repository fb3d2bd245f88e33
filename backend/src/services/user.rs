use crate::lifecycle::UserContext;
use crate::services::AppState;
use actix_web::dev::Payload;
use actix_web::error::{ErrorBadRequest, ErrorInternalServerError};
use actix_web::{web, FromRequest, HttpRequest};
use common::model::role::{Quota, Role};
use futures_util::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
/// Explicit signature limit; overrides the role mapping when present.
pub const USER_QUOTA_HEADER: &str = "X-User-Quota";

impl FromRequest for UserContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<UserContext, actix_web::Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ErrorInternalServerError("application state missing"))?;
    let defaults = &state.identity;

    let user_id = header(req, USER_ID_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| defaults.user_id.clone());

    let role = match header(req, USER_ROLE_HEADER) {
        Some(raw) => raw.parse::<Role>().map_err(ErrorBadRequest)?,
        None => defaults.role,
    };

    let quota = match header(req, USER_QUOTA_HEADER) {
        Some(raw) => Quota::Limited(
            raw.parse::<usize>()
                .map_err(|e| ErrorBadRequest(format!("invalid {}: {}", USER_QUOTA_HEADER, e)))?,
        ),
        None => Quota::for_role(role, defaults.free_quota),
    };

    Ok(UserContext::new(user_id, quota))
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
