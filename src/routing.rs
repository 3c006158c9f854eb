//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};

use crate::{
    AppState,
    category::{create_category_endpoint, delete_category_endpoint, get_categories_endpoint},
    endpoints,
    history::{get_history_data_endpoint, get_history_periods_endpoint},
    settings::{get_settings_endpoint, update_settings_endpoint},
    stats::{get_balance_stats_endpoint, get_category_stats_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except [endpoints::COFFEE] requires a bearer token issued by
/// the identity provider.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::BALANCE_STATS, get(get_balance_stats_endpoint))
        .route(endpoints::CATEGORY_STATS, get(get_category_stats_endpoint))
        .route(
            endpoints::HISTORY_PERIODS,
            get(get_history_periods_endpoint),
        )
        .route(endpoints::HISTORY_DATA, get(get_history_data_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint)
                .post(create_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::SETTINGS,
            get(get_settings_endpoint).put(update_settings_endpoint),
        )
        .route(endpoints::COFFEE, get(get_coffee))
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, build_router, endpoints};

    #[tokio::test]
    async fn coffee_route_is_a_teapot() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "42").unwrap();
        let server = TestServer::new(build_router(state));

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), "42").unwrap();
        let server = TestServer::new(build_router(state));

        server
            .get("/api/unknown")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
