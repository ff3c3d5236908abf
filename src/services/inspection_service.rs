//! Inspection workflow orchestration: creation with generated codes, role
//! scoped listing, the status transition rules, and evidence/signature file
//! handling. Evidence becomes immutable once an inspection is approved.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{rbac, UserContext},
    config::Settings,
    error::ApiError,
    models::{
        Inspection, InspectionCreate, InspectionDetailResponse, InspectionFilters,
        InspectionListResponse, InspectionStatus, InspectionUpdate, Photo, PhotoCreate,
        StatusChange, UserRole,
    },
    repositories::{InspectionRepository, NewInspection, PhotoRepository, ReportRepository},
    services::{report_hash, NotificationService},
};

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

pub struct InspectionService {
    settings: Arc<Settings>,
    inspections: Arc<dyn InspectionRepository + Send + Sync>,
    photos: Arc<dyn PhotoRepository + Send + Sync>,
    reports: Arc<dyn ReportRepository + Send + Sync>,
    notifications: Arc<NotificationService>,
}

/// Human-readable inspection code, unique via the millisecond clock.
pub(crate) fn generate_code() -> String {
    format!("INS_{}", Utc::now().timestamp_millis())
}

fn image_extension(mime_type: &str) -> Result<&'static str, ApiError> {
    match mime_type {
        "image/jpeg" => Ok("jpg"),
        "image/png" => Ok("png"),
        other => Err(ApiError::validation(format!(
            "Unsupported image type {other}, expected one of {ALLOWED_IMAGE_TYPES:?}"
        ))),
    }
}

impl InspectionService {
    pub fn new(
        settings: Arc<Settings>,
        inspections: Arc<dyn InspectionRepository + Send + Sync>,
        photos: Arc<dyn PhotoRepository + Send + Sync>,
        reports: Arc<dyn ReportRepository + Send + Sync>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            settings,
            inspections,
            photos,
            reports,
            notifications,
        }
    }

    pub async fn create(
        &self,
        ctx: &UserContext,
        input: &InspectionCreate,
    ) -> Result<Inspection, ApiError> {
        // Inspectors always create as themselves; reviewers may assign
        let inspector_id = if ctx.role == UserRole::Inspector {
            ctx.user_id
        } else {
            input.inspector_id.unwrap_or(ctx.user_id)
        };

        let code = generate_code();
        let inspection = self
            .inspections
            .create(&NewInspection {
                code: &code,
                container_number: &input.container_number,
                facility_id: input.facility_id,
                carrier_id: input.carrier_id,
                inspector_id,
                temperature_c: input.temperature_c,
                observations: input.observations.as_deref(),
                inspected_at: input.inspected_at.unwrap_or_else(Utc::now),
            })
            .await?;

        tracing::info!(inspection_id = inspection.id, code = %inspection.code, "inspection created");
        Ok(inspection)
    }

    pub async fn list(
        &self,
        ctx: &UserContext,
        filters: &InspectionFilters,
    ) -> Result<InspectionListResponse, ApiError> {
        let visible_to_inspector =
            (ctx.role == UserRole::Inspector).then_some(ctx.user_id);
        let (items, total) = self.inspections.list(filters, visible_to_inspector).await?;

        let page = filters.page.unwrap_or(1).max(1);
        let page_size = filters.page_size.unwrap_or(25).clamp(1, 200);
        Ok(InspectionListResponse {
            items,
            total,
            page,
            page_size,
        })
    }

    pub async fn get_detail(
        &self,
        ctx: &UserContext,
        id: i64,
    ) -> Result<InspectionDetailResponse, ApiError> {
        let inspection = self.load_accessible(ctx, id).await?;
        let photos = self.photos.list_by_inspection(id).await?;
        Ok(InspectionDetailResponse { inspection, photos })
    }

    pub async fn update(
        &self,
        ctx: &UserContext,
        id: i64,
        update: &InspectionUpdate,
    ) -> Result<Inspection, ApiError> {
        let inspection = self.load_accessible(ctx, id).await?;
        if inspection.status == InspectionStatus::Approved && !ctx.is_reviewer() {
            return Err(ApiError::conflict(
                "Approved inspections can no longer be edited by the inspector",
            ));
        }
        self.inspections.update(id, update).await
    }

    /// Supervisor/admin status transition. Rejections require a comment,
    /// which is appended to the observations trail; the owning inspector is
    /// notified of the outcome.
    pub async fn change_status(
        &self,
        ctx: &UserContext,
        id: i64,
        change: &StatusChange,
    ) -> Result<Inspection, ApiError> {
        rbac::require_reviewer(ctx)?;
        let inspection = self
            .inspections
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Inspection {id} not found")))?;

        let comment = change.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
        if change.status == InspectionStatus::Rejected && comment.is_none() {
            return Err(ApiError::validation("Rejection requires a comment"));
        }

        let observations = comment.map(|c| {
            let stamp = Utc::now().format("%Y-%m-%d %H:%M");
            match inspection.observations.as_deref() {
                Some(existing) if !existing.is_empty() => {
                    format!("{existing}\n[{stamp} {}] {c}", ctx.email)
                }
                _ => format!("[{stamp} {}] {c}", ctx.email),
            }
        });

        let updated = self
            .inspections
            .set_status(id, change.status, observations.as_deref())
            .await?;

        let title = match change.status {
            InspectionStatus::Approved => "Inspection approved",
            InspectionStatus::Rejected => "Inspection rejected",
            InspectionStatus::Pending => "Inspection reopened",
        };
        let message = format!("{} ({})", updated.code, updated.container_number);
        if let Err(err) = self
            .notifications
            .notify_user(
                updated.inspector_id,
                title,
                &message,
                "inspection_status",
                Some(format!("/inspections/{id}")),
            )
            .await
        {
            // Notification delivery is best effort
            tracing::warn!(error = %err, inspection_id = id, "could not record notification");
        }

        tracing::info!(
            inspection_id = id,
            status = updated.status.as_str(),
            reviewer = %ctx.email,
            "inspection status changed"
        );
        Ok(updated)
    }

    /// Reviewer-only delete, removing the stored photo, signature and report
    /// files along with the rows.
    pub async fn delete(&self, ctx: &UserContext, id: i64) -> Result<(), ApiError> {
        rbac::require_reviewer(ctx)?;
        let inspection = self
            .inspections
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Inspection {id} not found")))?;

        let photos = self.photos.list_by_inspection(id).await?;
        let reports = self.reports.list_by_inspection(id).await?;

        self.inspections.delete(id).await?;

        for photo in &photos {
            remove_file_best_effort(&self.resolve_capture(&photo.file_path)).await;
        }
        if let Some(signature) = inspection.signature_path.as_deref() {
            remove_file_best_effort(&self.resolve_capture(signature)).await;
        }
        for report in &reports {
            remove_file_best_effort(Path::new(&report.file_path)).await;
        }

        tracing::info!(inspection_id = id, "inspection deleted");
        Ok(())
    }

    /// Store one uploaded photo: type/size checks, content hash, sequence
    /// number, file write, row insert.
    pub async fn add_photo(
        &self,
        ctx: &UserContext,
        inspection_id: i64,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<Photo, ApiError> {
        let inspection = self.load_accessible(ctx, inspection_id).await?;
        self.ensure_evidence_mutable(&inspection)?;
        let extension = image_extension(mime_type)?;
        self.check_size(bytes)?;

        let content_hash = report_hash::sha256_hex(bytes);
        let seq = self.photos.next_seq(inspection_id).await?;

        let relative = format!(
            "{}/photo_{}_{}.{extension}",
            inspection_id,
            seq,
            Uuid::new_v4().simple()
        );
        self.write_capture(&relative, bytes).await?;

        let photo = self
            .photos
            .create(&PhotoCreate {
                inspection_id,
                file_path: relative,
                mime_type: mime_type.to_string(),
                content_hash: Some(content_hash),
                seq,
                taken_at: Some(Utc::now()),
            })
            .await?;

        tracing::info!(inspection_id, photo_id = photo.id, seq, "photo stored");
        Ok(photo)
    }

    pub async fn delete_photo(
        &self,
        ctx: &UserContext,
        inspection_id: i64,
        photo_id: i64,
    ) -> Result<(), ApiError> {
        let inspection = self.load_accessible(ctx, inspection_id).await?;
        self.ensure_evidence_mutable(&inspection)?;

        let photo = self
            .photos
            .get_by_id(photo_id)
            .await?
            .filter(|p| p.inspection_id == inspection_id)
            .ok_or_else(|| ApiError::not_found(format!("Photo {photo_id} not found")))?;

        self.photos.delete(photo_id).await?;
        remove_file_best_effort(&self.resolve_capture(&photo.file_path)).await;
        Ok(())
    }

    /// Store or replace the inspector signature image.
    pub async fn set_signature(
        &self,
        ctx: &UserContext,
        inspection_id: i64,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<String, ApiError> {
        let inspection = self.load_accessible(ctx, inspection_id).await?;
        let extension = image_extension(mime_type)?;
        self.check_size(bytes)?;

        let relative = format!(
            "{}/signature_{}.{extension}",
            inspection_id,
            Uuid::new_v4().simple()
        );
        self.write_capture(&relative, bytes).await?;
        self.inspections
            .set_signature_path(inspection_id, &relative)
            .await?;

        if let Some(previous) = inspection.signature_path.as_deref() {
            remove_file_best_effort(&self.resolve_capture(previous)).await;
        }

        Ok(relative)
    }

    async fn load_accessible(&self, ctx: &UserContext, id: i64) -> Result<Inspection, ApiError> {
        let inspection = self
            .inspections
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Inspection {id} not found")))?;
        if !rbac::can_access_inspection(ctx, inspection.inspector_id) {
            return Err(ApiError::authorization(
                "Inspectors can only access their own inspections",
            ));
        }
        Ok(inspection)
    }

    fn ensure_evidence_mutable(&self, inspection: &Inspection) -> Result<(), ApiError> {
        if inspection.status == InspectionStatus::Approved {
            return Err(ApiError::conflict(
                "Evidence of an approved inspection is immutable",
            ));
        }
        Ok(())
    }

    fn check_size(&self, bytes: &[u8]) -> Result<(), ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::validation("Uploaded file is empty"));
        }
        if bytes.len() > self.settings.max_upload_bytes {
            return Err(ApiError::validation(format!(
                "Upload exceeds the {} byte limit",
                self.settings.max_upload_bytes
            )));
        }
        Ok(())
    }

    fn resolve_capture(&self, relative: &str) -> PathBuf {
        self.settings.captures_dir().join(relative)
    }

    async fn write_capture(&self, relative: &str, bytes: &[u8]) -> Result<(), ApiError> {
        let path = self.resolve_capture(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }
}

async fn remove_file_best_effort(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %err, "could not remove stored file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_format() {
        let code = generate_code();
        assert!(code.starts_with("INS_"));
        assert!(code[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_image_extension_mapping() {
        assert_eq!(image_extension("image/jpeg").unwrap(), "jpg");
        assert_eq!(image_extension("image/png").unwrap(), "png");
        assert!(image_extension("application/pdf").is_err());
    }
}
