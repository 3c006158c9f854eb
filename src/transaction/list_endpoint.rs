//! The API endpoint for listing transactions within a date range.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    settings::{format_amount, get_or_create_user_settings},
    stats::DateRangeParams,
};

use super::core::{Transaction, get_transactions_in_range};

/// A transaction decorated with its amount rendered in the user's currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionListing {
    /// The underlying transaction.
    #[serde(flatten)]
    pub transaction: Transaction,

    /// The amount rendered with the user's currency, e.g. "$1,234.50".
    pub formatted_amount: String,
}

/// List the authenticated user's transactions within `from..=to`, newest
/// first, with amounts rendered in the user's currency.
pub(crate) async fn get_transactions_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Vec<TransactionListing>>, Error> {
    let (from, to) = params.into_ordered_dates()?;
    let connection = state.db_connection.lock().unwrap();

    let settings = get_or_create_user_settings(&user_id, &connection)?;

    let listings = get_transactions_in_range(&user_id, from, to, &connection)?
        .into_iter()
        .map(|transaction| {
            let formatted_amount = format_amount(transaction.amount, &settings.currency);

            TransactionListing {
                transaction,
                formatted_amount,
            }
        })
        .collect();

    Ok(Json(listings))
}

#[cfg(test)]
mod list_transactions_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, macros::date};

    use crate::{
        AppState, NewTransaction, TransactionType, UserId, build_router,
        category::{NewCategory, create_category},
        endpoints, issue_token,
        transaction::create_transaction,
    };

    use super::TransactionListing;

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

    fn insert_test_transactions(state: &AppState) {
        let user_id = UserId::new("user_test");
        let connection = state.db_connection.lock().unwrap();

        create_category(
            &user_id,
            NewCategory {
                name: "Groceries".to_string(),
                icon: "🛒".to_string(),
                transaction_type: TransactionType::Expense,
            },
            &connection,
        )
        .unwrap();

        for (amount, date) in [(42.5, date!(2024 - 01 - 10)), (7.5, date!(2024 - 01 - 20))] {
            create_transaction(
                &user_id,
                NewTransaction {
                    amount,
                    description: "weekly shop".to_string(),
                    date,
                    transaction_type: TransactionType::Expense,
                    category: "Groceries".to_string(),
                },
                &connection,
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn list_transactions_returns_formatted_amounts_newest_first() {
        let (server, state, token) = get_test_server_and_token();
        insert_test_transactions(&state);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("from", "2024-01-01")
            .add_query_param("to", "2024-01-31")
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();

        let listings = response.json::<Vec<TransactionListing>>();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].transaction.date, date!(2024 - 01 - 20));
        assert_eq!(listings[0].formatted_amount, "$7.50");
        assert_eq!(listings[1].formatted_amount, "$42.50");
    }

    #[tokio::test]
    async fn list_transactions_with_reversed_range_is_bad_request() {
        let (server, _, token) = get_test_server_and_token();

        server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("from", "2024-01-31")
            .add_query_param("to", "2024-01-01")
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_transactions_with_missing_range_is_bad_request() {
        let (server, _, token) = get_test_server_and_token();

        server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
