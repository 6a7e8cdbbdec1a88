//! Catalog home endpoint

use axum::{extract::State, Json};

use crate::{
    error::{AppResult, ErrorResponse},
    services::catalog::CatalogSummary,
    AppState,
};

/// Record counts for the catalog home page
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Record counts", body = CatalogSummary),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<CatalogSummary>> {
    let summary = state.services.catalog.summary().await?;
    Ok(Json(summary))
}
