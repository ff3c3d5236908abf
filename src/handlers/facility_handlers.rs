use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::ApiResult,
    models::{Facility, FacilityCreate},
    repositories::FacilityRepository,
    AppState,
};

/// GET /api/facilities
pub async fn list_facilities(State(state): State<AppState>) -> ApiResult<Json<Vec<Facility>>> {
    let facilities = state.facility_repository.list().await?;
    Ok(Json(facilities))
}

/// POST /api/facilities
pub async fn create_facility(
    State(state): State<AppState>,
    Json(payload): Json<FacilityCreate>,
) -> ApiResult<(StatusCode, Json<Facility>)> {
    let facility = state.facility_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(facility)))
}
