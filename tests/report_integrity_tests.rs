mod common;

use tempfile::tempdir;

use inspection_backend::auth::UserContext;
use inspection_backend::error::ApiError;
use chrono::{Duration, TimeZone, Utc};

use inspection_backend::models::{
    CarrierCreate, FacilityCreate, InspectionCreate, InspectionStatus, InspectionUpdate, UserRole,
    VerificationStatus,
};
use inspection_backend::repositories::{
    CarrierRepository, FacilityRepository, InspectionRepository, ReportRepository,
};
use inspection_backend::AppState;

fn reviewer_ctx(user_id: i64) -> UserContext {
    UserContext {
        user_id,
        email: "supervisor@example.com".to_string(),
        role: UserRole::Supervisor,
    }
}

/// Seed facility, carrier and one inspection owned by a fresh supervisor.
async fn seed_inspection(state: &AppState) -> (UserContext, i64) {
    let user_id = common::seed_user(state, "supervisor@example.com", "pw123456", UserRole::Supervisor).await;
    let ctx = reviewer_ctx(user_id);

    let facility = state
        .facility_repository
        .create(&FacilityCreate {
            code: "PLT-01".to_string(),
            name: "Plant North".to_string(),
            location: Some("Valparaiso".to_string()),
        })
        .await
        .unwrap();
    let carrier = state
        .carrier_repository
        .create(&CarrierCreate {
            code: "OCN".to_string(),
            name: "Oceanic".to_string(),
        })
        .await
        .unwrap();

    let inspection = state
        .inspection_service
        .create(
            &ctx,
            &InspectionCreate {
                container_number: "ABCD1234567".to_string(),
                facility_id: facility.id,
                carrier_id: carrier.id,
                inspector_id: Some(user_id),
                temperature_c: Some(4.0),
                observations: None,
                inspected_at: None,
            },
        )
        .await
        .unwrap();

    (ctx, inspection.id)
}

#[tokio::test]
async fn test_generate_verify_and_tamper_flow() {
    let storage = tempdir().unwrap();
    let Some(state) = common::try_create_state(storage.path()).await else {
        return;
    };

    let (ctx, inspection_id) = seed_inspection(&state).await;
    state
        .inspection_service
        .add_photo(&ctx, inspection_id, "image/jpeg", b"fake jpeg bytes")
        .await
        .unwrap();

    let report = state.report_service.generate(inspection_id).await.unwrap();
    assert_eq!(report.hash_global.len(), 64);

    // The rendered file exists and is a PDF
    let bytes = tokio::fs::read(&report.file_path).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    // Round trip: the stored digest verifies against live data
    let outcome = state
        .report_service
        .verify(inspection_id, &report.hash_global)
        .await
        .unwrap();
    assert_eq!(outcome.status, VerificationStatus::Valid);
    assert_eq!(outcome.recomputed_hash.as_deref(), Some(report.hash_global.as_str()));

    // Tamper: a status change shifts the recomputed digest
    state
        .inspection_repository
        .set_status(inspection_id, InspectionStatus::Approved, None)
        .await
        .unwrap();
    let outcome = state
        .report_service
        .verify(inspection_id, &report.hash_global)
        .await
        .unwrap();
    assert_eq!(outcome.status, VerificationStatus::Altered);
    assert_ne!(outcome.recomputed_hash.as_deref(), Some(report.hash_global.as_str()));
}

#[tokio::test]
async fn test_verify_unknown_inspection_is_not_found() {
    let storage = tempdir().unwrap();
    let Some(state) = common::try_create_state(storage.path()).await else {
        return;
    };

    let outcome = state
        .report_service
        .verify(999_999, "deadbeef")
        .await
        .unwrap();
    assert_eq!(outcome.status, VerificationStatus::NotFound);
    assert!(outcome.recomputed_hash.is_none());
}

#[tokio::test]
async fn test_generation_rejected_without_photos_and_writes_nothing() {
    let storage = tempdir().unwrap();
    let Some(state) = common::try_create_state(storage.path()).await else {
        return;
    };

    let (_ctx, inspection_id) = seed_inspection(&state).await;

    let err = state
        .report_service
        .generate(inspection_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(msg) if msg.contains("photo")));

    // No orphan report row
    let reports = state
        .report_repository
        .list_by_inspection(inspection_id)
        .await
        .unwrap();
    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_evidence_changes_alter_the_digest() {
    let storage = tempdir().unwrap();
    let Some(state) = common::try_create_state(storage.path()).await else {
        return;
    };

    let (ctx, inspection_id) = seed_inspection(&state).await;
    state
        .inspection_service
        .add_photo(&ctx, inspection_id, "image/jpeg", b"first photo")
        .await
        .unwrap();

    let report = state.report_service.generate(inspection_id).await.unwrap();

    state
        .inspection_service
        .add_photo(&ctx, inspection_id, "image/png", b"second photo")
        .await
        .unwrap();

    let outcome = state
        .report_service
        .verify(inspection_id, &report.hash_global)
        .await
        .unwrap();
    assert_eq!(outcome.status, VerificationStatus::Altered);
}

#[tokio::test]
async fn test_approved_inspection_locks_evidence() {
    let storage = tempdir().unwrap();
    let Some(state) = common::try_create_state(storage.path()).await else {
        return;
    };

    let (ctx, inspection_id) = seed_inspection(&state).await;
    let photo = state
        .inspection_service
        .add_photo(&ctx, inspection_id, "image/jpeg", b"evidence")
        .await
        .unwrap();

    state
        .inspection_repository
        .set_status(inspection_id, InspectionStatus::Approved, None)
        .await
        .unwrap();

    let add_err = state
        .inspection_service
        .add_photo(&ctx, inspection_id, "image/jpeg", b"late evidence")
        .await
        .unwrap_err();
    assert!(matches!(add_err, ApiError::Conflict(_)));

    let delete_err = state
        .inspection_service
        .delete_photo(&ctx, inspection_id, photo.id)
        .await
        .unwrap_err();
    assert!(matches!(delete_err, ApiError::Conflict(_)));
}

/// The manifest hashes timestamps at second precision, so the store must not
/// hold sub-second detail the digest cannot see.
#[tokio::test]
async fn test_timestamp_store_precision_matches_the_digest() {
    let storage = tempdir().unwrap();
    let Some(state) = common::try_create_state(storage.path()).await else {
        return;
    };

    let (ctx, inspection_id) = seed_inspection(&state).await;
    state
        .inspection_service
        .add_photo(&ctx, inspection_id, "image/jpeg", b"evidence")
        .await
        .unwrap();

    let base = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    let stored = state
        .inspection_repository
        .update(
            inspection_id,
            &InspectionUpdate {
                inspected_at: Some(base + Duration::microseconds(250_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.inspected_at, base);
    assert_eq!(stored.inspected_at.timestamp_subsec_micros(), 0);

    let report = state.report_service.generate(inspection_id).await.unwrap();

    // A sub-second-only edit collapses to the same stored second
    state
        .inspection_repository
        .update(
            inspection_id,
            &InspectionUpdate {
                inspected_at: Some(base + Duration::microseconds(750_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let outcome = state
        .report_service
        .verify(inspection_id, &report.hash_global)
        .await
        .unwrap();
    assert_eq!(outcome.status, VerificationStatus::Valid);

    // A full-second change is visible to verification
    state
        .inspection_repository
        .update(
            inspection_id,
            &InspectionUpdate {
                inspected_at: Some(base + Duration::seconds(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let outcome = state
        .report_service
        .verify(inspection_id, &report.hash_global)
        .await
        .unwrap();
    assert_eq!(outcome.status, VerificationStatus::Altered);
}
