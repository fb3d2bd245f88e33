use crate::error::Result;
use crate::export::ExportFile;
use crate::lifecycle::UserContext;
use crate::services::AppState;
use actix_web::http::header::{
    ContentDisposition, DispositionParam, DispositionType, EntityTag, ETag, IfNoneMatch,
};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};

/// `GET /api/signatures/{id}/download`
///
/// Serves the embedded bytes as an attachment named after the signature. The
/// MD5 of the bytes is the entity tag, so an unchanged image is answered with
/// `304 Not Modified`.
pub async fn process(
    req: HttpRequest,
    user: UserContext,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let record = state.manager.get(&user, &id).await?;
    let file = ExportFile::from_record(&record)?;
    let tag = EntityTag::new_strong(file.digest());

    if let Some(IfNoneMatch::Items(items)) = req.get_header::<IfNoneMatch>() {
        if items.iter().any(|item| item.weak_eq(&tag)) {
            return Ok(HttpResponse::NotModified().insert_header(ETag(tag)).finish());
        }
    }

    Ok(HttpResponse::Ok()
        .content_type(file.mime.as_str())
        .insert_header(ETag(tag))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name)],
        })
        .body(file.bytes))
}
