//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the types needed to create one
//! - Database functions for storing, querying and deleting transactions,
//!   which keep the derived history aggregates in sync
//! - The API endpoints for listing, creating and deleting transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{NewTransaction, Transaction, TransactionId, TransactionType, create_transaction};
pub(crate) use core::{create_transaction_table, delete_transaction};
pub use list_endpoint::TransactionListing;

pub(crate) use create_endpoint::create_transaction_endpoint;
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use list_endpoint::get_transactions_endpoint;
