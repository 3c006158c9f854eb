//! Income and expense totals over a date range.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, Error, auth::AuthenticatedUser, auth::UserId};

use super::date_range::DateRangeParams;

/// The income and expense totals over a date range.
///
/// The remaining balance is `income - expense`, which the caller derives.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceStats {
    /// The sum of the income transaction amounts in the range.
    pub income: f64,

    /// The sum of the expense transaction amounts in the range.
    pub expense: f64,
}

/// Sum the amounts of the transactions owned by `user_id` dated within
/// `from..=to`, grouped into income and expense totals.
///
/// A range without transactions yields zero totals.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_balance_stats(
    user_id: &UserId,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<BalanceStats, Error> {
    let rows = connection
        .prepare(
            "SELECT type, COALESCE(SUM(amount), 0) FROM \"transaction\" \
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 GROUP BY type",
        )?
        .query_map((user_id.as_str(), from, to), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<(String, f64)>, _>>()?;

    let mut stats = BalanceStats {
        income: 0.0,
        expense: 0.0,
    };

    for (raw_type, total) in rows {
        match raw_type.as_str() {
            "income" => stats.income = total,
            "expense" => stats.expense = total,
            _ => {}
        }
    }

    Ok(stats)
}

/// Get the authenticated user's income and expense totals for a date range.
pub(crate) async fn get_balance_stats_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<BalanceStats>, Error> {
    let (from, to) = params.into_ordered_dates()?;
    let connection = state.db_connection.lock().unwrap();

    get_balance_stats(&user_id, from, to, &connection).map(Json)
}
