//! The API endpoint for creating a transaction.

use axum::{Json, extract::State};

use crate::{AppState, Error, auth::AuthenticatedUser};

use super::core::{NewTransaction, Transaction, create_transaction};

/// Create a new transaction for the authenticated user.
///
/// The derived history aggregates are updated in the same SQL transaction as
/// the new row, so statistics reads stay consistent.
pub(crate) async fn create_transaction_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().unwrap();

    create_transaction(&user_id, new_transaction, &connection).map(Json)
}
