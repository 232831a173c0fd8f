use super::AppState;
use super::error::ApiError;
use crate::core::DEFAULT_CAPITAL;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_capital() -> f64 {
    DEFAULT_CAPITAL
}

#[derive(Debug, Deserialize)]
pub struct ProfitQuery {
    pub scheme_code: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_capital")]
    pub capital: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfitResponse {
    pub profit: f64,
}

/// `GET /profit`
pub async fn get_profit(
    State(state): State<AppState>,
    Query(query): Query<ProfitQuery>,
) -> Result<Json<ProfitResponse>, ApiError> {
    debug!(?query, "Profit requested");

    let profit = state
        .calculator
        .calculate_profit(
            &query.scheme_code,
            &query.start_date,
            &query.end_date,
            query.capital,
        )
        .await?;

    Ok(Json(ProfitResponse { profit }))
}
