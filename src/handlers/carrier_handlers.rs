use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::ApiResult,
    models::{Carrier, CarrierCreate},
    repositories::CarrierRepository,
    AppState,
};

/// GET /api/carriers
pub async fn list_carriers(State(state): State<AppState>) -> ApiResult<Json<Vec<Carrier>>> {
    let carriers = state.carrier_repository.list().await?;
    Ok(Json(carriers))
}

/// POST /api/carriers
pub async fn create_carrier(
    State(state): State<AppState>,
    Json(payload): Json<CarrierCreate>,
) -> ApiResult<(StatusCode, Json<Carrier>)> {
    let carrier = state.carrier_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(carrier)))
}
