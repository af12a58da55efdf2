use crate::backend::TripRepository;
use crate::error::{Result, ServiceError};
use crate::itinerary::TripSummary;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

pub async fn trip_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripSummary>> {
    let id = parse_id(&id)?;
    let client = state.backend()?;
    let bundle = TripRepository::new(client).load_bundle(id).await?;
    Ok(Json(TripSummary::from_bundle(&bundle)))
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| ServiceError::InvalidRequest(format!("invalid id '{}': {}", raw, e)))
}
