//! Per-category totals over a date range.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AppState, Error, auth::AuthenticatedUser, auth::UserId, transaction::TransactionType};

use super::date_range::DateRangeParams;

/// The total amount spent or earned in one category over a date range.
///
/// Totals are grouped by the category name and icon stored on each
/// transaction, so deleting a category does not change past statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// The name of the category.
    pub category: String,

    /// The icon of the category.
    pub category_icon: String,

    /// The type of the transactions summed into `total`.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// The sum of the transaction amounts for this category and type.
    pub total: f64,
}

/// Sum the amounts of the transactions owned by `user_id` dated within
/// `from..=to`, grouped by category and type, largest totals first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_category_stats(
    user_id: &UserId,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Vec<CategoryStats>, Error> {
    connection
        .prepare(
            "SELECT category, category_icon, type, COALESCE(SUM(amount), 0) AS total \
            FROM \"transaction\" \
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 \
            GROUP BY category, type ORDER BY total DESC",
        )?
        .query_map((user_id.as_str(), from, to), |row| {
            let raw_type: String = row.get(2)?;
            let transaction_type = raw_type.parse().map_err(|_| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    format!("invalid transaction type {raw_type:?}").into(),
                )
            })?;

            Ok(CategoryStats {
                category: row.get(0)?,
                category_icon: row.get(1)?,
                transaction_type,
                total: row.get(3)?,
            })
        })?
        .map(|stats_result| stats_result.map_err(Error::SqlError))
        .collect()
}

/// Get the authenticated user's per-category totals for a date range.
pub(crate) async fn get_category_stats_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Vec<CategoryStats>>, Error> {
    let (from, to) = params.into_ordered_dates()?;
    let connection = state.db_connection.lock().unwrap();

    get_category_stats(&user_id, from, to, &connection).map(Json)
}
