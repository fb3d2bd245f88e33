use crate::lifecycle::UserContext;
use crate::notifications::NotificationsState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

const API_PATH: &str = "/api/notifications";

/// `GET /api/notifications` returns and clears the caller's pending feed.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(drain))
}

async fn drain(user: UserContext, state: web::Data<NotificationsState>) -> impl Responder {
    HttpResponse::Ok().json(state.drain(&user.user_id).await)
}
