use crate::capture::surface::{CaptureSurface, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::error::{Result, SignatureError};
use crate::lifecycle::UserContext;
use crate::services::AppState;
use actix_web::{web, HttpResponse};
use common::model::signature::{NewSignature, SignatureKind};
use common::model::typed::TypedSignature;
use common::requests::{CreateDrawnRequest, CreateTypedRequest, RenderResponse};

/// `POST /api/signatures/drawn`
pub async fn drawn(
    user: UserContext,
    state: web::Data<AppState>,
    body: web::Json<CreateDrawnRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    let strokes = request.strokes;
    // Rasterizing is CPU bound, keep it off the async workers.
    let replayed = web::block(move || {
        CaptureSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT).replay(&strokes)
    })
    .await
    .map_err(SignatureError::from)
    .and_then(|image| image);
    let image = match replayed {
        Ok(image) => image,
        Err(e) => {
            state.manager.report_failure(&user, &e).await;
            return Err(e);
        }
    };

    let record = state
        .manager
        .create(
            &user,
            NewSignature {
                name: request.name,
                kind: SignatureKind::Drawn,
                image: image.into_string(),
                is_default: request.is_default,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// `POST /api/signatures/typed`
pub async fn typed(
    user: UserContext,
    state: web::Data<AppState>,
    body: web::Json<CreateTypedRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    // The manager renders the image from the parameters.
    let record = state
        .manager
        .create(
            &user,
            NewSignature {
                name: request.name,
                kind: SignatureKind::Typed(request.signature),
                image: String::new(),
                is_default: request.is_default,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// `POST /api/signatures/typed/render`
pub async fn render(
    state: web::Data<AppState>,
    body: web::Json<TypedSignature>,
) -> Result<HttpResponse> {
    let renderer = state.manager.typed_renderer().clone();
    let signature = body.into_inner();
    let image = web::block(move || {
        renderer.validate(&signature)?;
        renderer.render(&signature)
    })
    .await??;
    Ok(HttpResponse::Ok().json(RenderResponse {
        complete: !image.is_empty(),
        image: image.into_string(),
    }))
}
