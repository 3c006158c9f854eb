//! The API endpoint for listing categories.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{AppState, Error, auth::AuthenticatedUser, transaction::TransactionType};

use super::core::{Category, get_categories};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CategoryListParams {
    /// When set, only return categories of this transaction type.
    #[serde(rename = "type")]
    transaction_type: Option<TransactionType>,
}

/// List the authenticated user's categories, ordered by name.
pub(crate) async fn get_categories_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(params): Query<CategoryListParams>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection.lock().unwrap();

    get_categories(&user_id, params.transaction_type, &connection).map(Json)
}
