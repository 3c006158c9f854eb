//! The API endpoint for deleting a category.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{AppState, Error, auth::AuthenticatedUser, transaction::TransactionType};

use super::core::delete_category;

/// Identifies the category to delete.
///
/// Categories have no surrogate ID, they are addressed by their natural key
/// `(name, type)` within the authenticated user's data.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteCategory {
    name: String,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
}

/// Delete one of the authenticated user's categories.
///
/// Existing transactions referencing the category keep their category name
/// and icon, and the statistics over them do not change.
pub(crate) async fn delete_category_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(delete_request): Json<DeleteCategory>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().unwrap();

    delete_category(
        &user_id,
        &delete_request.name,
        delete_request.transaction_type,
        &connection,
    )?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::Duration;

    use crate::{
        AppState, NewCategory, TransactionType, UserId, build_router,
        category::create_category, endpoints, issue_token,
    };

    fn get_test_server_and_token() -> (TestServer, AppState, String) {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42").unwrap();
        let server = TestServer::new(build_router(state.clone()));
        let token = issue_token(
            &UserId::new("user_test"),
            Duration::minutes(15),
            state.encoding_key(),
        );

        (server, state, token)
    }

    #[tokio::test]
    async fn delete_category_removes_row() {
        let (server, state, token) = get_test_server_and_token();

        create_category(
            &UserId::new("user_test"),
            NewCategory {
                name: "Groceries".to_string(),
                icon: "🛒".to_string(),
                transaction_type: TransactionType::Expense,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        server
            .delete(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({
                "name": "Groceries",
                "type": "expense",
            }))
            .await
            .assert_status_ok();

        let count: i64 = state
            .db_connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn delete_missing_category_is_not_found() {
        let (server, _, token) = get_test_server_and_token();

        server
            .delete(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({
                "name": "Groceries",
                "type": "expense",
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
