//! # Signature Service Module
//!
//! Routes every request under `/api/signatures` to its handler. The caller is
//! identified by the `X-User-Id`, `X-User-Role` and `X-User-Quota` headers
//! (see `services::user`); failures are answered by `SignatureError`'s
//! `ResponseError` implementation.
//!
//! ## Sub-modules:
//! - `create`: drawn and typed signatures from JSON, plus the live typed render.
//! - `upload`: multipart image upload.
//! - `manage`: list, get, update, delete, default selection and usage stamps.
//! - `preview`: multi-scale previews.
//! - `download`: the stored image as a named file.

mod create;
mod download;
mod manage;
mod preview;
mod upload;

use actix_web::web::{delete, get, patch, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/signatures";

/// Configures the Actix `Scope` for all signature routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: the caller's signatures in insertion order.
/// *   **`POST /drawn`**: replays recorded strokes onto a capture surface and
///     stores the result.
/// *   **`POST /typed`**: renders a typed signature and stores it.
/// *   **`POST /typed/render`**: renders a typed signature without storing it,
///     for live feedback while the user types.
/// *   **`POST /upload`**: multipart form with a `name` field and a `file`
///     field; an optional `isDefault` field accepts `true`.
/// *   **`GET | PATCH | DELETE /{id}`**: read, partially update or remove one
///     signature.
/// *   **`POST /{id}/default`**: makes the signature the only default.
/// *   **`POST /{id}/used`**: records that the signature was just applied.
/// *   **`GET /{id}/preview?scale=`** and **`GET /{id}/previews`**: one or all
///     canonical preview scales.
/// *   **`GET /{id}/download`**: the image bytes as an attachment.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(manage::list))
        .route("/drawn", post().to(create::drawn))
        .route("/typed", post().to(create::typed))
        .route("/typed/render", post().to(create::render))
        .route("/upload", post().to(upload::process))
        .route("/{id}", get().to(manage::get))
        .route("/{id}", patch().to(manage::update))
        .route("/{id}", delete().to(manage::remove))
        .route("/{id}/default", post().to(manage::set_default))
        .route("/{id}/used", post().to(manage::mark_used))
        .route("/{id}/preview", get().to(preview::single))
        .route("/{id}/previews", get().to(preview::set))
        .route("/{id}/download", get().to(download::process))
}
