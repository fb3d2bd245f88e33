//! `POST /api/signatures/upload`
//!
//! Expects a multipart form with a `name` text field and a `file` field
//! holding the image. The file is streamed chunk by chunk and rejected as soon
//! as it passes the configured limit, before the rest is read. Accepted bytes
//! go through the upload ingestor unchanged and are stored as an `uploaded`
//! signature.

use crate::error::{Result, ValidationKind};
use crate::lifecycle::UserContext;
use crate::services::AppState;
use crate::upload::UploadedFile;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use common::model::signature::{NewSignature, SignatureKind};
use futures_util::StreamExt;
use log::debug;

/// Text fields are small; anything longer is not a signature name.
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

pub async fn process(
    user: UserContext,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let signature = match receive(&state, payload).await {
        Ok(signature) => signature,
        Err(e) => {
            state.manager.report_failure(&user, &e).await;
            return Err(e);
        }
    };
    let record = state.manager.create(&user, signature).await?;
    Ok(HttpResponse::Created().json(record))
}

async fn receive(state: &AppState, mut payload: Multipart) -> Result<NewSignature> {
    let mut name: Option<String> = None;
    let mut is_default = false;
    let mut file: Option<UploadedFile> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some("file") => file = Some(read_file(&mut field, state).await?),
            Some("name") => name = Some(read_text(&mut field).await?),
            Some("isDefault") => is_default = read_text(&mut field).await?.trim() == "true",
            _ => {
                // Unknown parts are drained and ignored.
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    let file = file.ok_or(ValidationKind::EmptyImage)?;
    let image = state.ingestor.ingest(&file)?;
    Ok(NewSignature {
        name: name.unwrap_or_default(),
        kind: SignatureKind::Uploaded,
        image: image.into_string(),
        is_default,
    })
}

async fn read_file(field: &mut Field, state: &AppState) -> Result<UploadedFile> {
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
        .unwrap_or_default();
    let content_type = field.content_type().map(|m| m.essence_str().to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        state.ingestor.check_size(bytes.len() + chunk.len())?;
        bytes.extend_from_slice(&chunk);
    }

    debug!("Received {} ({} bytes)", file_name, bytes.len());
    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

async fn read_text(field: &mut Field) -> Result<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        bytes.extend_from_slice(&chunk?);
        if bytes.len() > MAX_TEXT_FIELD_BYTES {
            return Err(ValidationKind::MalformedUpload("text field too long".into()).into());
        }
    }
    String::from_utf8(bytes)
        .map_err(|_| ValidationKind::MalformedUpload("text field is not UTF-8".into()).into())
}
