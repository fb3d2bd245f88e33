//! Preview endpoints. Rendering is CPU bound and runs on the blocking pool.

use crate::error::Result;
use crate::lifecycle::UserContext;
use crate::render::preview::Preview;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::requests::{PreviewQuery, PreviewResponse};

/// `GET /api/signatures/{id}/preview?scale=`
pub async fn single(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse> {
    let record = state.manager.get(&user, &id).await?;
    let scale = query.scale;
    let renderer = state.previews.clone();
    let image = web::block(move || renderer.render_at(&record, scale)).await??;
    Ok(HttpResponse::Ok().json(PreviewResponse {
        scale,
        image: image.into_string(),
    }))
}

/// `GET /api/signatures/{id}/previews`: small, medium and large.
pub async fn set(
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let record = state.manager.get(&user, &id).await?;
    let renderer = state.previews.clone();
    let previews = web::block(move || renderer.render_set(&record)).await??;
    let body: Vec<PreviewResponse> = previews.into_iter().map(into_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

fn into_response(preview: Preview) -> PreviewResponse {
    PreviewResponse {
        scale: preview.scale,
        image: preview.image.into_string(),
    }
}
