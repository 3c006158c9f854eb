//! The history aggregate tables and their queries.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, auth::UserId, transaction::TransactionType};

/// The granularity of a history query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// One bucket per month of a year.
    Year,
    /// One bucket per day of a month.
    Month,
}

impl Timeframe {
    /// The name of the timeframe as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Year => "year",
            Timeframe::Month => "month",
        }
    }
}

/// One point on a history chart.
///
/// For a [Timeframe::Year] query the bucket covers a whole month and `day` is
/// `None`. For a [Timeframe::Month] query the bucket covers a single day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryBucket {
    /// The calendar year of the bucket.
    pub year: i32,

    /// The calendar month of the bucket, from 1 (January) to 12 (December).
    pub month: u8,

    /// The day of the month, only set for day-level buckets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,

    /// The sum of the income transaction amounts in the bucket.
    pub income: f64,

    /// The sum of the expense transaction amounts in the bucket.
    pub expense: f64,
}

pub(crate) fn create_month_history_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS month_history (
            user_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            day INTEGER NOT NULL,
            income REAL NOT NULL,
            expense REAL NOT NULL,
            PRIMARY KEY (user_id, year, month, day)
            )",
        (),
    )?;

    Ok(())
}

pub(crate) fn create_year_history_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS year_history (
            user_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            income REAL NOT NULL,
            expense REAL NOT NULL,
            PRIMARY KEY (user_id, year, month)
            )",
        (),
    )?;

    Ok(())
}

/// Apply `amount_delta` to the history aggregates for `date`.
///
/// A positive delta records a new transaction, a negative delta reverses a
/// deleted one. The caller is expected to run this inside the same SQL
/// transaction as the change to the transaction table.
pub(crate) fn record_transaction(
    user_id: &UserId,
    date: Date,
    transaction_type: TransactionType,
    amount_delta: f64,
    connection: &Connection,
) -> Result<(), rusqlite::Error> {
    let (income_delta, expense_delta) = match transaction_type {
        TransactionType::Income => (amount_delta, 0.0),
        TransactionType::Expense => (0.0, amount_delta),
    };

    connection.execute(
        "INSERT INTO month_history (user_id, year, month, day, income, expense) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
        ON CONFLICT (user_id, year, month, day) DO UPDATE SET \
        income = income + excluded.income, expense = expense + excluded.expense",
        (
            user_id.as_str(),
            date.year(),
            u8::from(date.month()),
            date.day(),
            income_delta,
            expense_delta,
        ),
    )?;

    connection.execute(
        "INSERT INTO year_history (user_id, year, month, income, expense) \
        VALUES (?1, ?2, ?3, ?4, ?5) \
        ON CONFLICT (user_id, year, month) DO UPDATE SET \
        income = income + excluded.income, expense = expense + excluded.expense",
        (
            user_id.as_str(),
            date.year(),
            u8::from(date.month()),
            income_delta,
            expense_delta,
        ),
    )?;

    Ok(())
}

/// Get the distinct years that `user_id` has history for, ascending.
///
/// Returns an empty list for a user with no transactions.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_history_periods(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<i32>, Error> {
    connection
        .prepare("SELECT DISTINCT year FROM year_history WHERE user_id = ?1 ORDER BY year ASC")?
        .query_map((user_id.as_str(),), |row| row.get(0))?
        .map(|year_result| year_result.map_err(Error::SqlError))
        .collect()
}

/// Get the month buckets for `year`, one per calendar month.
///
/// Months without transactions are filled in with zero sums, so the result
/// always has exactly twelve buckets.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_year_history(
    user_id: &UserId,
    year: i32,
    connection: &Connection,
) -> Result<Vec<HistoryBucket>, Error> {
    let mut buckets: Vec<HistoryBucket> = (1..=12)
        .map(|month| HistoryBucket {
            year,
            month,
            day: None,
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    let rows = connection
        .prepare(
            "SELECT month, income, expense FROM year_history \
            WHERE user_id = ?1 AND year = ?2",
        )?
        .query_map((user_id.as_str(), year), |row| {
            Ok((row.get::<_, u8>(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<(u8, f64, f64)>, _>>()?;

    for (month, income, expense) in rows {
        let bucket = &mut buckets[usize::from(month) - 1];
        bucket.income = income;
        bucket.expense = expense;
    }

    Ok(buckets)
}

/// Get the day buckets for `month` of `year`, one per calendar day.
///
/// Days without transactions are filled in with zero sums, so the result
/// always has one bucket per day of the month, leap years included.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_month_history(
    user_id: &UserId,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Vec<HistoryBucket>, Error> {
    let month_number = u8::from(month);
    let mut buckets: Vec<HistoryBucket> = (1..=last_day_of_month(year, month))
        .map(|day| HistoryBucket {
            year,
            month: month_number,
            day: Some(day),
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    let rows = connection
        .prepare(
            "SELECT day, income, expense FROM month_history \
            WHERE user_id = ?1 AND year = ?2 AND month = ?3",
        )?
        .query_map((user_id.as_str(), year, month_number), |row| {
            Ok((row.get::<_, u8>(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<(u8, f64, f64)>, _>>()?;

    for (day, income, expense) in rows {
        let bucket = &mut buckets[usize::from(day) - 1];
        bucket.income = income;
        bucket.expense = expense;
    }

    Ok(buckets)
}

/// Get the number of days in `month` of `year`.
fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
