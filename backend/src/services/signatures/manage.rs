use crate::error::Result;
use crate::lifecycle::UserContext;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::requests::UpdateSignatureRequest;

pub async fn list(user: UserContext, state: web::Data<AppState>) -> Result<HttpResponse> {
    let records = state.manager.list(&user).await?;
    Ok(HttpResponse::Ok().json(records))
}

pub async fn get(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let record = state.manager.get(&user, &id).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<UpdateSignatureRequest>,
) -> Result<HttpResponse> {
    let record = state.manager.update(&user, &id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Answers with the removed record.
pub async fn remove(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let record = state.manager.delete(&user, &id).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn set_default(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let record = state.manager.set_default(&user, &id).await?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn mark_used(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let record = state.manager.mark_used(&user, &id).await?;
    Ok(HttpResponse::Ok().json(record))
}
