//! The API endpoint for deleting a transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{AppState, Error, auth::AuthenticatedUser};

use super::core::{TransactionId, delete_transaction};

/// Delete one of the authenticated user's transactions by its ID.
///
/// The transaction's amount is subtracted from the history aggregates in the
/// same SQL transaction as the row deletion.
pub(crate) async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().unwrap();

    delete_transaction(&user_id, transaction_id, &connection)?;

    Ok(StatusCode::OK)
}
