//! The API endpoint for listing the years a user has history for.

use axum::{Json, extract::State};

use crate::{AppState, Error, auth::AuthenticatedUser};

use super::core::get_history_periods;

/// List the years the authenticated user has transactions in, ascending.
///
/// A user without transactions gets an empty list.
pub(crate) async fn get_history_periods_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<i32>>, Error> {
    let connection = state.db_connection.lock().unwrap();

    get_history_periods(&user_id, &connection).map(Json)
}

#[cfg(test)]
mod history_periods_endpoint_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, macros::date};

    use crate::{
        AppState, UserId, build_router, endpoints, history::record_transaction, issue_token,
        transaction::TransactionType,
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
    async fn history_periods_without_transactions_is_empty_list() {
        let (server, _, token) = get_test_server_and_token();

        let response = server
            .get(endpoints::HISTORY_PERIODS)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_json(&Vec::<i32>::new());
    }

    #[tokio::test]
    async fn history_periods_lists_years_ascending() {
        let (server, state, token) = get_test_server_and_token();

        {
            let connection = state.db_connection.lock().unwrap();
            let user_id = UserId::new("user_test");

            for date in [date!(2025 - 01 - 01), date!(2023 - 12 - 31)] {
                record_transaction(&user_id, date, TransactionType::Income, 1.0, &connection)
                    .unwrap();
            }
        }

        let response = server
            .get(endpoints::HISTORY_PERIODS)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_json(&vec![2023, 2025]);
    }
}
