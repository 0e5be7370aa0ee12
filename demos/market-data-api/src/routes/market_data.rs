use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::NaiveDate;
use price_projector::PricePoint;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

/// Longest projection the API will run, in months.
const MAX_HORIZON_MONTHS: u32 = 1200;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedParams {
    pub number_of_months: Option<u32>,
}

/// GET /market-data/{asset}/historical?startDate=2019-01-01&endDate=2019-12-31
///
/// Daily prices; the window defaults to the last five years.
pub async fn historical(
    State(state): State<Arc<AppState>>,
    Path(asset): Path<String>,
    Query(params): Query<HistoricalParams>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!(%asset, "fetching historical price data");
    let series = state
        .projector
        .historical_series(&asset, params.start_date, params.end_date)
        .await?;
    Ok(Json(series))
}

/// GET /market-data/{asset}/projected?numberOfMonths=240
///
/// Month-end closes of the highest-ending simulated scenario.
pub async fn projected(
    State(state): State<Arc<AppState>>,
    Path(asset): Path<String>,
    Query(params): Query<ProjectedParams>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    if params.number_of_months.is_some_and(|m| m > MAX_HORIZON_MONTHS) {
        return Err(AppError::bad_request(format!(
            "numberOfMonths must be at most {MAX_HORIZON_MONTHS}"
        )));
    }

    info!(%asset, "generating projected price data");
    let series = state
        .projector
        .projected_series(&asset, params.number_of_months)
        .await?;
    Ok(Json(series))
}
