//! History aggregates for the trend charts.
//!
//! Instead of scanning every transaction on each chart request, two derived
//! tables hold precomputed income/expense sums: `month_history` per day and
//! `year_history` per month. Transaction creation and deletion update them in
//! the same SQL transaction as the raw row, so the aggregates never drift.

mod core;
mod data_endpoint;
mod periods_endpoint;

pub use core::{HistoryBucket, Timeframe};
pub(crate) use core::{
    create_month_history_table, create_year_history_table, record_transaction,
};

pub(crate) use data_endpoint::get_history_data_endpoint;
pub(crate) use periods_endpoint::get_history_periods_endpoint;
