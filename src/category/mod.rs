//! Category management for the finance tracker.
//!
//! A category groups transactions of one type, e.g. the expense category
//! 'Groceries' or the income category 'Salary'. Transactions reference
//! categories by name, so deleting a category never touches existing
//! transactions or the history aggregates.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{Category, NewCategory, create_category};
pub(crate) use core::create_category_table;

pub(crate) use create_endpoint::create_category_endpoint;
pub(crate) use delete_endpoint::delete_category_endpoint;
pub(crate) use list_endpoint::get_categories_endpoint;
