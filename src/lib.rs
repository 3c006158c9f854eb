//! Pocketbook is a personal-finance tracking service.
//!
//! Users record income and expense transactions tagged with categories, and
//! view aggregated statistics (balance totals, per-category breakdowns and
//! historical trend data) over a selectable date range.
//!
//! This library provides the JSON REST API served by the `server` binary, and
//! a typed API client with a query cache in [client].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod auth;
mod category;
pub mod client;
mod db;
mod endpoints;
mod history;
mod routing;
mod settings;
mod stats;
mod transaction;

pub use app_state::AppState;
pub use auth::{UserId, issue_token};
pub use db::initialize as initialize_db;
pub use routing::build_router;

pub use category::{Category, NewCategory, create_category};
pub use history::{HistoryBucket, Timeframe};
pub use settings::UserSettings;
pub use stats::{BalanceStats, CategoryStats};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionListing, TransactionType,
    create_transaction,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The start of a date range was after its end.
    #[error("the \"from\" date {from} is after the \"to\" date {to}")]
    InvalidDateRange {
        /// The start of the rejected range.
        from: Date,
        /// The end of the rejected range.
        to: Date,
    },

    /// A month number outside 1-12 was used to select a history period.
    #[error("{0} is not a valid month number, expected a number between 1 and 12")]
    InvalidMonth(u8),

    /// A request for daily history buckets did not specify which month.
    #[error("the \"month\" parameter is required when the timeframe is \"month\"")]
    MissingMonth,

    /// A negative or non-finite amount was used to create a transaction.
    ///
    /// Transaction amounts record magnitudes, the direction of the money flow
    /// is carried by the transaction type.
    #[error("transaction amounts must be non-negative, got {0}")]
    InvalidAmount(f64),

    /// A string other than "income" or "expense" was used as a transaction type.
    #[error("\"{0}\" is not a transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// The category named on a new transaction does not exist for the user
    /// with the matching transaction type.
    #[error("no {transaction_type} category named \"{name}\"")]
    InvalidCategory {
        /// The category name that could not be matched.
        name: String,
        /// The transaction type the category was expected to have.
        transaction_type: TransactionType,
    },

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The user already has a category with this name and type.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// A currency code outside the supported list was used in the settings.
    #[error("\"{0}\" is not a supported currency code")]
    UnsupportedCurrency(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidDateRange { .. }
            | Error::InvalidMonth(_)
            | Error::MissingMonth
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidCategory { .. }
            | Error::EmptyCategoryName
            | Error::UnsupportedCurrency(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategory(_) => StatusCode::CONFLICT,
            Error::NotFound | Error::DeleteMissingTransaction | Error::DeleteMissingCategory => {
                StatusCode::NOT_FOUND
            }
            Error::SqlError(error) => {
                // The SQL error text is not for clients, log it and send a
                // generic message instead.
                tracing::error!("An unexpected error occurred: {}", error);
                let body = Json(json!({ "error": "internal server error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
