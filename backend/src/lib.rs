//! Signature capture and management service.
//!
//! Signatures enter through one of three input modes (freehand capture, typed
//! text, image upload), are stored per user by the lifecycle manager and can be
//! previewed at several scales or exported as files. The `services` module
//! exposes all of it over HTTP.

pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod notifications;
pub mod render;
pub mod services;
pub mod upload;

use crate::config::Config;
use crate::lifecycle::{SignatureManager, SignatureRepository};
use crate::notifications::Notifier;
use crate::render::{FontLibrary, PreviewRenderer, TypedRenderer};
use crate::services::{AppState, IdentityDefaults};
use crate::upload::UploadIngestor;
use actix_web::web;
use std::sync::Arc;

/// Wires the core components into the state shared by every worker.
pub fn build_state(
    config: &Config,
    repository: Arc<dyn SignatureRepository>,
    fonts: Arc<FontLibrary>,
    notifier: Notifier,
) -> AppState {
    let typed = TypedRenderer::new(fonts);
    AppState {
        manager: SignatureManager::new(repository, typed.clone(), notifier),
        previews: PreviewRenderer::new(typed),
        ingestor: UploadIngestor::new(config.max_upload_bytes),
        identity: IdentityDefaults {
            user_id: config.default_user.clone(),
            role: config.default_role,
            free_quota: config.free_quota,
        },
    }
}

/// Registers every route. The caller provides `web::Data<AppState>` and
/// `web::Data<NotificationsState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(services::signatures::configure_routes())
        .service(services::notifications::configure_routes());
}
