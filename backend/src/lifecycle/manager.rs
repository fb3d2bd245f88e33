//! Create, update, delete and default selection of a user's signatures.
//!
//! The manager owns the rules the repository does not know about:
//! - at most one record per user is the default, and switching it is a single
//!   atomic repository write;
//! - the caller's quota caps how many records they may hold;
//! - typed records always carry the image their parameters render to.
//!
//! Mutations are serialized so quota and default checks see the state they
//! write to. Every mutation reports its outcome on the notification channel;
//! reads only report failures.

use crate::error::{Result, SignatureError, ValidationKind};
use crate::lifecycle::context::UserContext;
use crate::lifecycle::repository::SignatureRepository;
use crate::notifications::Notifier;
use crate::render::embedded::EmbeddedImage;
use crate::render::typed::TypedRenderer;
use chrono::Utc;
use common::model::signature::{NewSignature, SignatureKind, SignatureRecord};
use common::model::typed::TypedSignature;
use common::notifications::Notification;
use common::requests::UpdateSignatureRequest;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct SignatureManager {
    repository: Arc<dyn SignatureRepository>,
    typed: TypedRenderer,
    notifier: Notifier,
    mutations: Mutex<()>,
}

impl SignatureManager {
    pub fn new(
        repository: Arc<dyn SignatureRepository>,
        typed: TypedRenderer,
        notifier: Notifier,
    ) -> Self {
        Self {
            repository,
            typed,
            notifier,
            mutations: Mutex::new(()),
        }
    }

    pub fn typed_renderer(&self) -> &TypedRenderer {
        &self.typed
    }

    /// Records of the user in insertion order.
    pub async fn list(&self, ctx: &UserContext) -> Result<Vec<SignatureRecord>> {
        let result = self.repository.list(&ctx.user_id).await;
        self.report(ctx, result, |_| None).await
    }

    pub async fn get(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let result = self.find(ctx, id).await;
        self.report(ctx, result, |_| None).await
    }

    /// Stores a new signature. Typed signatures are rendered again from their
    /// parameters; the image carried by `new` is ignored for them.
    pub async fn create(&self, ctx: &UserContext, new: NewSignature) -> Result<SignatureRecord> {
        let result = self.try_create(ctx, new).await;
        self.report(ctx, result, |r| {
            Some(format!("Signature \"{}\" saved", r.name))
        })
        .await
    }

    pub async fn update(
        &self,
        ctx: &UserContext,
        id: &str,
        changes: UpdateSignatureRequest,
    ) -> Result<SignatureRecord> {
        let result = self.try_update(ctx, id, changes).await;
        self.report(ctx, result, |r| {
            Some(format!("Signature \"{}\" updated", r.name))
        })
        .await
    }

    /// Removes a record. Deleting the default leaves the user without one.
    pub async fn delete(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let result = self.try_delete(ctx, id).await;
        self.report(ctx, result, |r| {
            Some(format!("Signature \"{}\" deleted", r.name))
        })
        .await
    }

    pub async fn set_default(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let result = self.try_set_default(ctx, id).await;
        self.report(ctx, result, |r| {
            Some(format!("\"{}\" is now your default signature", r.name))
        })
        .await
    }

    /// Stamps `last_used` with the current time.
    pub async fn mark_used(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let result = self.try_mark_used(ctx, id).await;
        self.report(ctx, result, |r| {
            Some(format!("Signature \"{}\" applied", r.name))
        })
        .await
    }

    async fn try_create(&self, ctx: &UserContext, new: NewSignature) -> Result<SignatureRecord> {
        let name = checked_name(&new.name)?;
        let image = match &new.kind {
            SignatureKind::Typed(typed) => self.render_typed(typed).await?,
            SignatureKind::Drawn | SignatureKind::Uploaded => EmbeddedImage::parse(&new.image)?,
        };
        if image.is_empty() {
            return Err(ValidationKind::EmptyImage.into());
        }

        let _guard = self.mutations.lock().await;
        let existing = self.repository.list(&ctx.user_id).await?;
        if !ctx.quota.allows(existing.len()) {
            return Err(SignatureError::QuotaExceeded {
                limit: ctx.quota.limit().unwrap_or(existing.len()),
            });
        }

        let record = SignatureRecord {
            id: Uuid::new_v4().to_string(),
            name,
            kind: new.kind,
            image: image.into_string(),
            is_default: new.is_default,
            created_at: Utc::now(),
            last_used: None,
        };

        if record.is_default {
            let mut batch: Vec<SignatureRecord> = existing
                .into_iter()
                .filter(|r| r.is_default)
                .map(|mut r| {
                    r.is_default = false;
                    r
                })
                .collect();
            batch.push(record.clone());
            self.repository.put_all(&ctx.user_id, batch).await?;
        } else {
            self.repository.put(&ctx.user_id, record.clone()).await?;
        }

        info!(
            "Created {} signature {} for {}",
            record.kind.label(),
            record.id,
            ctx.user_id
        );
        Ok(record)
    }

    async fn try_update(
        &self,
        ctx: &UserContext,
        id: &str,
        changes: UpdateSignatureRequest,
    ) -> Result<SignatureRecord> {
        let _guard = self.mutations.lock().await;
        let mut record = self.find(ctx, id).await?;

        if let Some(name) = &changes.name {
            record.name = checked_name(name)?;
        }

        if changes.touches_typed_fields() {
            let SignatureKind::Typed(current) = &record.kind else {
                return Err(ValidationKind::NotTyped.into());
            };
            let merged = merge_typed(current, changes);
            let image = self.render_typed(&merged).await?;
            if image.is_empty() {
                return Err(ValidationKind::EmptyImage.into());
            }
            record.image = image.into_string();
            record.kind = SignatureKind::Typed(merged);
        }

        self.repository.put(&ctx.user_id, record.clone()).await?;
        Ok(record)
    }

    async fn try_delete(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let _guard = self.mutations.lock().await;
        let record = self.find(ctx, id).await?;
        if !self.repository.delete(&ctx.user_id, id).await? {
            return Err(SignatureError::NotFound(id.to_string()));
        }
        info!("Deleted signature {} of {}", id, ctx.user_id);
        Ok(record)
    }

    async fn try_set_default(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let _guard = self.mutations.lock().await;
        let records = self.repository.list(&ctx.user_id).await?;
        if !records.iter().any(|r| r.id == id) {
            return Err(SignatureError::NotFound(id.to_string()));
        }

        let mut target = None;
        let mut changed = Vec::new();
        for mut record in records {
            let should_be_default = record.id == id;
            let differs = record.is_default != should_be_default;
            record.is_default = should_be_default;
            if should_be_default {
                target = Some(record.clone());
            }
            if differs {
                changed.push(record);
            }
        }

        if !changed.is_empty() {
            self.repository.put_all(&ctx.user_id, changed).await?;
        }
        target.ok_or_else(|| SignatureError::NotFound(id.to_string()))
    }

    async fn try_mark_used(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        let _guard = self.mutations.lock().await;
        let mut record = self.find(ctx, id).await?;
        record.last_used = Some(Utc::now());
        self.repository.put(&ctx.user_id, record.clone()).await?;
        Ok(record)
    }

    async fn find(&self, ctx: &UserContext, id: &str) -> Result<SignatureRecord> {
        self.repository
            .get(&ctx.user_id, id)
            .await?
            .ok_or_else(|| SignatureError::NotFound(id.to_string()))
    }

    /// Validates and rasterizes on the blocking pool.
    async fn render_typed(&self, typed: &TypedSignature) -> Result<EmbeddedImage> {
        let renderer = self.typed.clone();
        let typed = typed.clone();
        tokio::task::spawn_blocking(move || {
            renderer.validate(&typed)?;
            renderer.render(&typed)
        })
        .await?
    }

    async fn report<T>(
        &self,
        ctx: &UserContext,
        result: Result<T>,
        success: impl FnOnce(&T) -> Option<String>,
    ) -> Result<T> {
        match &result {
            Ok(value) => {
                if let Some(message) = success(value) {
                    self.notifier
                        .send(&ctx.user_id, Notification::success(message))
                        .await;
                }
            }
            Err(e) => self.report_failure(ctx, e).await,
        }
        result
    }

    /// Reports a failure that happened before the manager was reached, such as
    /// a rejected upload.
    pub async fn report_failure(&self, ctx: &UserContext, err: &SignatureError) {
        if let SignatureError::Persistence(_) = err {
            error!("Signature storage failed for {}: {}", ctx.user_id, err);
        }
        self.notifier
            .send(&ctx.user_id, Notification::error(err.to_string()))
            .await;
    }
}

fn checked_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationKind::MissingName.into());
    }
    Ok(trimmed.to_string())
}

fn merge_typed(current: &TypedSignature, changes: UpdateSignatureRequest) -> TypedSignature {
    TypedSignature {
        text: changes.text.unwrap_or_else(|| current.text.clone()),
        font: changes.font.unwrap_or_else(|| current.font.clone()),
        color: changes.color.unwrap_or_else(|| current.color.clone()),
        size: changes.size.unwrap_or(current.size),
        style: changes.style.unwrap_or(current.style),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::memory::InMemoryRepository;
    use crate::render::font::FontLibrary;
    use async_trait::async_trait;
    use common::model::role::{Quota, Role};
    use common::model::typed::TextStyle;
    use common::notifications::NotificationLevel;
    use tokio::sync::mpsc;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn renderer() -> TypedRenderer {
        let fonts = FontLibrary::load_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/fonts")).unwrap();
        TypedRenderer::new(Arc::new(fonts))
    }

    fn manager_with(
        repository: Arc<dyn SignatureRepository>,
    ) -> (SignatureManager, mpsc::Receiver<crate::notifications::state::NotificationUpdate>) {
        let (tx, rx) = mpsc::channel(64);
        (
            SignatureManager::new(repository, renderer(), Notifier::new(tx)),
            rx,
        )
    }

    fn manager() -> (
        SignatureManager,
        mpsc::Receiver<crate::notifications::state::NotificationUpdate>,
    ) {
        manager_with(Arc::new(InMemoryRepository::new()))
    }

    fn free_user() -> UserContext {
        UserContext::for_role("ada", Role::Free, 3)
    }

    fn drawn(name: &str, is_default: bool) -> NewSignature {
        NewSignature {
            name: name.to_string(),
            kind: SignatureKind::Drawn,
            image: PIXEL.to_string(),
            is_default,
        }
    }

    fn typed(text: &str) -> TypedSignature {
        TypedSignature {
            text: text.to_string(),
            font: "DejaVu Sans".to_string(),
            color: "#102030".to_string(),
            size: 36.0,
            style: TextStyle::regular(),
        }
    }

    fn levels(
        rx: &mut mpsc::Receiver<crate::notifications::state::NotificationUpdate>,
    ) -> Vec<NotificationLevel> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            out.push(update.notification.level);
        }
        out
    }

    async fn defaults(manager: &SignatureManager, ctx: &UserContext) -> Vec<String> {
        manager
            .list(ctx)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.is_default)
            .map(|r| r.name)
            .collect()
    }

    #[tokio::test]
    async fn create_assigns_identity_and_keeps_order() {
        let (manager, mut rx) = manager();
        let ctx = free_user();
        let a = manager.create(&ctx, drawn("  A  ", false)).await.unwrap();
        let b = manager.create(&ctx, drawn("B", false)).await.unwrap();

        assert_eq!(a.name, "A");
        assert_ne!(a.id, b.id);
        assert!(a.created_at <= b.created_at);
        let names: Vec<String> = manager.list(&ctx).await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(levels(&mut rx), vec![NotificationLevel::Success; 2]);
    }

    #[tokio::test]
    async fn create_validates_name_and_image() {
        let (manager, mut rx) = manager();
        let ctx = free_user();

        let err = manager.create(&ctx, drawn("   ", false)).await.unwrap_err();
        assert!(matches!(err, SignatureError::Validation(ValidationKind::MissingName)));

        let mut blank = drawn("Blank", false);
        blank.image = String::new();
        let err = manager.create(&ctx, blank).await.unwrap_err();
        assert!(matches!(err, SignatureError::Validation(ValidationKind::EmptyImage)));

        let blank_text = NewSignature {
            name: "Typed".to_string(),
            kind: SignatureKind::Typed(typed("   ")),
            image: String::new(),
            is_default: false,
        };
        let err = manager.create(&ctx, blank_text).await.unwrap_err();
        assert!(matches!(err, SignatureError::Validation(ValidationKind::EmptyImage)));

        assert!(manager.list(&ctx).await.unwrap().is_empty());
        assert_eq!(levels(&mut rx), vec![NotificationLevel::Error; 3]);
    }

    #[tokio::test]
    async fn typed_images_are_rendered_from_parameters() {
        let (manager, _rx) = manager();
        let ctx = free_user();
        let params = typed("Ada Lovelace");
        let record = manager
            .create(
                &ctx,
                NewSignature {
                    name: "Typed".to_string(),
                    kind: SignatureKind::Typed(params.clone()),
                    image: "data:image/png;base64,c3RhbGU=".to_string(),
                    is_default: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(record.image, renderer().render(&params).unwrap().into_string());
    }

    #[tokio::test]
    async fn quota_stops_the_fourth_signature() {
        let (manager, _rx) = manager();
        let ctx = free_user();
        for name in ["A", "B", "C"] {
            manager.create(&ctx, drawn(name, false)).await.unwrap();
        }
        let err = manager.create(&ctx, drawn("D", false)).await.unwrap_err();
        assert!(matches!(err, SignatureError::QuotaExceeded { limit: 3 }));
        assert_eq!(manager.list(&ctx).await.unwrap().len(), 3);

        let pro = UserContext::for_role("ada", Role::Pro, 3);
        manager.create(&pro, drawn("D", false)).await.unwrap();

        let explicit = UserContext::new("grace", Quota::Limited(0));
        assert!(manager.create(&explicit, drawn("A", false)).await.is_err());
    }

    #[tokio::test]
    async fn only_one_default_at_a_time() {
        let (manager, _rx) = manager();
        let ctx = UserContext::new("ada", Quota::Unlimited);
        manager.create(&ctx, drawn("A", true)).await.unwrap();
        let b = manager.create(&ctx, drawn("B", false)).await.unwrap();
        manager.create(&ctx, drawn("C", true)).await.unwrap();
        assert_eq!(defaults(&manager, &ctx).await, vec!["C"]);

        manager.set_default(&ctx, &b.id).await.unwrap();
        assert_eq!(defaults(&manager, &ctx).await, vec!["B"]);

        // Setting the current default again changes nothing.
        manager.set_default(&ctx, &b.id).await.unwrap();
        assert_eq!(defaults(&manager, &ctx).await, vec!["B"]);

        manager.delete(&ctx, &b.id).await.unwrap();
        assert!(defaults(&manager, &ctx).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (manager, mut rx) = manager();
        let ctx = free_user();
        assert!(matches!(manager.get(&ctx, "nope").await, Err(SignatureError::NotFound(_))));
        assert!(matches!(manager.delete(&ctx, "nope").await, Err(SignatureError::NotFound(_))));
        assert!(matches!(manager.set_default(&ctx, "nope").await, Err(SignatureError::NotFound(_))));
        assert!(matches!(manager.mark_used(&ctx, "nope").await, Err(SignatureError::NotFound(_))));
        assert!(matches!(
            manager.update(&ctx, "nope", UpdateSignatureRequest::default()).await,
            Err(SignatureError::NotFound(_))
        ));
        assert_eq!(levels(&mut rx), vec![NotificationLevel::Error; 5]);
    }

    #[tokio::test]
    async fn update_merges_and_regenerates_typed_images() {
        let (manager, _rx) = manager();
        let ctx = free_user();
        let original = manager
            .create(
                &ctx,
                NewSignature {
                    name: "Typed".to_string(),
                    kind: SignatureKind::Typed(typed("Ada")),
                    image: String::new(),
                    is_default: true,
                },
            )
            .await
            .unwrap();

        let updated = manager
            .update(
                &ctx,
                &original.id,
                UpdateSignatureRequest {
                    name: Some("Work".to_string()),
                    style: Some(TextStyle {
                        bold: true,
                        italic: true,
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.is_default);
        assert_eq!(updated.name, "Work");
        assert_ne!(updated.image, original.image);
        let params = updated.kind.typed().unwrap();
        assert_eq!(params.text, "Ada");
        assert!(params.style.bold && params.style.italic);
        assert_eq!(updated.image, renderer().render(params).unwrap().into_string());
    }

    #[tokio::test]
    async fn typed_fields_are_refused_on_other_kinds() {
        let (manager, _rx) = manager();
        let ctx = free_user();
        let record = manager.create(&ctx, drawn("A", false)).await.unwrap();

        let err = manager
            .update(
                &ctx,
                &record.id,
                UpdateSignatureRequest {
                    color: Some("#ff0000".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureError::Validation(ValidationKind::NotTyped)));

        let renamed = manager
            .update(
                &ctx,
                &record.id,
                UpdateSignatureRequest {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.image, record.image);
    }

    #[tokio::test]
    async fn mark_used_stamps_the_record() {
        let (manager, _rx) = manager();
        let ctx = free_user();
        let record = manager.create(&ctx, drawn("A", false)).await.unwrap();
        assert!(record.last_used.is_none());

        manager.mark_used(&ctx, &record.id).await.unwrap();
        let stored = manager.get(&ctx, &record.id).await.unwrap();
        assert!(stored.last_used.is_some());
    }

    struct UnavailableRepository;

    #[async_trait]
    impl SignatureRepository for UnavailableRepository {
        async fn list(&self, _: &str) -> Result<Vec<SignatureRecord>> {
            Ok(Vec::new())
        }

        async fn get(&self, _: &str, _: &str) -> Result<Option<SignatureRecord>> {
            Ok(None)
        }

        async fn put(&self, _: &str, _: SignatureRecord) -> Result<()> {
            Err(SignatureError::Persistence("store offline".into()))
        }

        async fn put_all(&self, _: &str, _: Vec<SignatureRecord>) -> Result<()> {
            Err(SignatureError::Persistence("store offline".into()))
        }

        async fn delete(&self, _: &str, _: &str) -> Result<bool> {
            Err(SignatureError::Persistence("store offline".into()))
        }
    }

    #[tokio::test]
    async fn storage_failures_are_reported_not_swallowed() {
        let (manager, mut rx) = manager_with(Arc::new(UnavailableRepository));
        let ctx = free_user();

        let err = manager.create(&ctx, drawn("A", false)).await.unwrap_err();
        assert!(matches!(err, SignatureError::Persistence(_)));

        let update = rx.try_recv().unwrap();
        assert_eq!(update.user_id, "ada");
        assert_eq!(update.notification.level, NotificationLevel::Error);
        assert!(update.notification.message.contains("store offline"));
    }
}
