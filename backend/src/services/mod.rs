//! HTTP surface of the signature service.
//!
//! - `signatures`: everything under `/api/signatures` (capture, typed render,
//!   upload, lifecycle, previews and downloads).
//! - `notifications`: `/api/notifications`, the caller's pending feed.
//! - `user`: request extractor resolving the caller's identity and quota.

pub mod notifications;
pub mod signatures;
pub mod user;

use crate::lifecycle::SignatureManager;
use crate::render::PreviewRenderer;
use crate::upload::UploadIngestor;
use common::model::role::Role;

/// Identity assumed when request headers leave it out.
#[derive(Debug, Clone)]
pub struct IdentityDefaults {
    pub user_id: String,
    pub role: Role,
    /// Limit of the constrained role.
    pub free_quota: usize,
}

/// Shared across workers as `web::Data<AppState>`.
pub struct AppState {
    pub manager: SignatureManager,
    pub previews: PreviewRenderer,
    pub ingestor: UploadIngestor,
    pub identity: IdentityDefaults,
}
