//! Report generation and verification orchestration.
//!
//! Generation validates preconditions, computes the integrity digest, renders
//! the PDF, writes it to storage and only then persists the Report row, so a
//! failed render never leaves an orphan record. Verification recomputes the
//! digest from live data and compares it with the claimed value.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::Settings,
    error::ApiError,
    models::{
        Inspection, Report, ReportCreate, VerificationResponse, VerificationStatus,
    },
    repositories::{
        CarrierRepository, FacilityRepository, InspectionRepository, PhotoRepository,
        ReportRepository, UserRepository,
    },
    services::pdf::{self, ReportData},
    services::report_hash::{self, ManifestEntry, DIGEST_UNAVAILABLE},
};

pub struct ReportService {
    settings: Arc<Settings>,
    inspections: Arc<dyn InspectionRepository + Send + Sync>,
    photos: Arc<dyn PhotoRepository + Send + Sync>,
    reports: Arc<dyn ReportRepository + Send + Sync>,
    facilities: Arc<dyn FacilityRepository + Send + Sync>,
    carriers: Arc<dyn CarrierRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

/// Reject report generation while required inspection data is missing. The
/// error names the first missing field so the client can surface it.
pub(crate) fn validate_for_report(
    inspection: &Inspection,
    photo_count: usize,
) -> Result<(), ApiError> {
    if inspection.container_number.trim().is_empty() {
        return Err(ApiError::validation(
            "Report requires a container number",
        ));
    }
    if inspection.facility_id <= 0 {
        return Err(ApiError::validation("Report requires a facility"));
    }
    if inspection.carrier_id <= 0 {
        return Err(ApiError::validation("Report requires a carrier"));
    }
    if inspection.inspector_id <= 0 {
        return Err(ApiError::validation("Report requires an inspector"));
    }
    if photo_count == 0 {
        return Err(ApiError::validation(
            "Report requires at least one photo",
        ));
    }
    Ok(())
}

impl ReportService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<Settings>,
        inspections: Arc<dyn InspectionRepository + Send + Sync>,
        photos: Arc<dyn PhotoRepository + Send + Sync>,
        reports: Arc<dyn ReportRepository + Send + Sync>,
        facilities: Arc<dyn FacilityRepository + Send + Sync>,
        carriers: Arc<dyn CarrierRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            settings,
            inspections,
            photos,
            reports,
            facilities,
            carriers,
            users,
        }
    }

    /// Generate a report for the inspection: digest, PDF, file, row.
    pub async fn generate(&self, inspection_id: i64) -> Result<Report, ApiError> {
        let inspection = self
            .inspections
            .get_by_id(inspection_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Inspection {inspection_id} not found")))?;
        let photos = self.photos.list_by_inspection(inspection_id).await?;
        validate_for_report(&inspection, photos.len())?;

        let report_uuid = Uuid::new_v4();
        let digest = self.compute_digest(&inspection, &photos);
        let verify_url = format!(
            "{}/api/verify/{}/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            inspection.id,
            digest
        );

        let data = ReportData {
            facility_name: self.facility_name(inspection.facility_id).await?,
            carrier_name: self.carrier_name(inspection.carrier_id).await?,
            inspector_name: self.inspector_name(inspection.inspector_id).await?,
            photos,
            digest: digest.clone(),
            verify_url,
            report_uuid: report_uuid.to_string(),
            generated_at: Utc::now(),
            inspection,
        };

        let pdf_bytes = pdf::render_inspection_report(&data)?;

        let reports_dir = self.settings.reports_dir();
        tokio::fs::create_dir_all(&reports_dir).await?;
        let file_name = format!("report_{report_uuid}.pdf");
        let file_path = reports_dir.join(&file_name);
        tokio::fs::write(&file_path, &pdf_bytes).await?;

        // Secondary file-level hash, for the audit log only. A read-back
        // failure degrades to the sentinel instead of aborting.
        let file_hash = match tokio::fs::read(&file_path).await {
            Ok(bytes) => report_hash::sha256_hex(&bytes),
            Err(err) => {
                tracing::warn!(error = %err, "could not hash rendered report file");
                DIGEST_UNAVAILABLE.to_string()
            }
        };
        tracing::info!(
            inspection_id,
            report_uuid = %report_uuid,
            digest = %digest,
            file_hash = %file_hash,
            "report rendered"
        );

        let report = self
            .reports
            .create(&ReportCreate {
                report_uuid,
                inspection_id,
                file_path: file_path.to_string_lossy().into_owned(),
                hash_global: digest,
            })
            .await?;

        Ok(report)
    }

    /// Public tamper check: recompute the digest from live data and compare.
    /// A missing inspection is a normal NOT_FOUND outcome, not an error.
    pub async fn verify(
        &self,
        inspection_id: i64,
        claimed_hash: &str,
    ) -> Result<VerificationResponse, ApiError> {
        let Some(inspection) = self.inspections.get_by_id(inspection_id).await? else {
            return Ok(VerificationResponse {
                status: VerificationStatus::NotFound,
                inspection_id,
                claimed_hash: claimed_hash.to_string(),
                recomputed_hash: None,
            });
        };

        let photos = self.photos.list_by_inspection(inspection_id).await?;
        let recomputed = self.compute_digest(&inspection, &photos);

        let status = if recomputed == claimed_hash {
            VerificationStatus::Valid
        } else {
            VerificationStatus::Altered
        };

        Ok(VerificationResponse {
            status,
            inspection_id,
            claimed_hash: claimed_hash.to_string(),
            recomputed_hash: Some(recomputed),
        })
    }

    /// Render the admin chain-of-custody document for a stored report.
    pub async fn custody_pdf(&self, report_id: i64) -> Result<Vec<u8>, ApiError> {
        let report = self
            .reports
            .get_by_id(report_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Report {report_id} not found")))?;
        let inspection = self
            .inspections
            .get_by_id(report.inspection_id)
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!("Inspection {} not found", report.inspection_id))
            })?;
        let photos = self.photos.list_by_inspection(inspection.id).await?;

        let data = ReportData {
            facility_name: self.facility_name(inspection.facility_id).await?,
            carrier_name: self.carrier_name(inspection.carrier_id).await?,
            inspector_name: self.inspector_name(inspection.inspector_id).await?,
            photos,
            digest: report.hash_global.clone(),
            verify_url: String::new(),
            report_uuid: report.report_uuid.to_string(),
            generated_at: Utc::now(),
            inspection,
        };

        pdf::render_custody_report(&data, &report)
    }

    /// Single-inspection reports always use an empty filter context, so a
    /// verifier needs nothing beyond the inspection id and the digest.
    fn compute_digest(&self, inspection: &Inspection, photos: &[crate::models::Photo]) -> String {
        let entry = ManifestEntry::from_inspection(inspection, photos);
        report_hash::compute_digest(&[entry], &BTreeMap::new())
    }

    async fn facility_name(&self, id: i64) -> Result<String, ApiError> {
        Ok(self
            .facilities
            .get_by_id(id)
            .await?
            .map(|f| f.name)
            .unwrap_or_else(|| format!("facility {id}")))
    }

    async fn carrier_name(&self, id: i64) -> Result<String, ApiError> {
        Ok(self
            .carriers
            .get_by_id(id)
            .await?
            .map(|c| c.name)
            .unwrap_or_else(|| format!("carrier {id}")))
    }

    async fn inspector_name(&self, id: i64) -> Result<String, ApiError> {
        Ok(self
            .users
            .get_by_id(id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| format!("inspector {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InspectionStatus;
    use chrono::TimeZone;

    fn sample_inspection() -> Inspection {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        Inspection {
            id: 1,
            code: "INS_1000".to_string(),
            container_number: "ABCD1234567".to_string(),
            facility_id: 1,
            carrier_id: 1,
            inspector_id: 1,
            temperature_c: None,
            observations: None,
            signature_path: None,
            status: InspectionStatus::Pending,
            inspected_at: ts,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_complete_inspection_passes_preconditions() {
        assert!(validate_for_report(&sample_inspection(), 1).is_ok());
    }

    #[test]
    fn test_missing_container_number_rejected() {
        let mut inspection = sample_inspection();
        inspection.container_number = "  ".to_string();
        let err = validate_for_report(&inspection, 1).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("container number")));
    }

    #[test]
    fn test_zero_photos_rejected() {
        let err = validate_for_report(&sample_inspection(), 0).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("photo")));
    }
}
