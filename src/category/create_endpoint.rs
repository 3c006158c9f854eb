//! The API endpoint for creating a category.

use axum::{Json, extract::State};

use crate::{AppState, Error, auth::AuthenticatedUser};

use super::core::{Category, NewCategory, create_category};

/// Create a new category for the authenticated user.
pub(crate) async fn create_category_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(new_category): Json<NewCategory>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection.lock().unwrap();

    create_category(&user_id, new_category, &connection).map(Json)
}
