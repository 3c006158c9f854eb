//! The API endpoint for fetching chart-ready history buckets.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::Month;

use crate::{AppState, Error, auth::AuthenticatedUser};

use super::core::{HistoryBucket, Timeframe, get_month_history, get_year_history};

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryDataParams {
    timeframe: Timeframe,
    year: i32,
    /// Required when `timeframe` is [Timeframe::Month], from 1 to 12.
    month: Option<u8>,
}

/// Get the income/expense buckets for one year or one month.
///
/// Buckets without transactions are zero-filled, so a year query always
/// returns twelve buckets and a month query one bucket per calendar day.
pub(crate) async fn get_history_data_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(params): Query<HistoryDataParams>,
) -> Result<Json<Vec<HistoryBucket>>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let buckets = match params.timeframe {
        Timeframe::Year => get_year_history(&user_id, params.year, &connection)?,
        Timeframe::Month => {
            let month_number = params.month.ok_or(Error::MissingMonth)?;
            let month =
                Month::try_from(month_number).map_err(|_| Error::InvalidMonth(month_number))?;

            get_month_history(&user_id, params.year, month, &connection)?
        }
    };

    Ok(Json(buckets))
}
