//! Aggregate statistics over a date range.

mod balance;
mod categories;
mod date_range;

pub use balance::BalanceStats;
pub use categories::CategoryStats;

pub(crate) use balance::get_balance_stats_endpoint;
pub(crate) use categories::get_category_stats_endpoint;
pub(crate) use date_range::DateRangeParams;
