//! The `Transaction` model and its database functions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserId, history::record_transaction};

/// The ID of a transaction in the database.
pub type TransactionId = i64;

/// Whether a transaction records money coming in or going out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. wages.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The transaction type as the text stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_string())),
        }
    }
}

/// A single income or expense record.
///
/// Transactions are immutable once created, except for deletion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,

    /// The ID of the user that owns the transaction.
    pub user_id: UserId,

    /// The amount of money, always non-negative. The direction of the money
    /// flow is carried by `transaction_type`.
    pub amount: f64,

    /// A short description of what the transaction was for.
    pub description: String,

    /// The date the transaction occurred, as a UTC calendar date.
    pub date: Date,

    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// The name of the category the transaction belongs to.
    pub category: String,

    /// A copy of the category's icon at the time the transaction was created.
    pub category_icon: String,
}

/// The data needed to create a [Transaction].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The amount of money, must be non-negative.
    pub amount: f64,
    /// A short description of what the transaction was for.
    pub description: String,
    /// The date the transaction occurred.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The name of one of the user's categories with a matching type.
    pub category: String,
}

pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            type TEXT NOT NULL,
            category TEXT NOT NULL,
            category_icon TEXT NOT NULL
            )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get(5)?;
    let transaction_type = raw_type.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("invalid transaction type {raw_type:?}").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(&row.get::<_, String>(1)?),
        amount: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        transaction_type,
        category: row.get(6)?,
        category_icon: row.get(7)?,
    })
}

/// Create a new transaction for `user_id` and update the history aggregates.
///
/// The transaction row and both history aggregate rows are written in a
/// single SQL transaction so that reads never observe a torn state.
///
/// # Errors
/// This function will return an error if:
/// - the amount is negative or not finite,
/// - the named category does not exist for the user with a matching type,
/// - or there is an SQL error.
pub fn create_transaction(
    user_id: &UserId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !new_transaction.amount.is_finite() || new_transaction.amount < 0.0 {
        return Err(Error::InvalidAmount(new_transaction.amount));
    }

    let category_icon: String = connection
        .prepare("SELECT icon FROM category WHERE user_id = ?1 AND name = ?2 AND type = ?3")?
        .query_row(
            (
                user_id.as_str(),
                &new_transaction.category,
                new_transaction.transaction_type.as_str(),
            ),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::InvalidCategory {
                name: new_transaction.category.clone(),
                transaction_type: new_transaction.transaction_type,
            },
            error => error.into(),
        })?;

    let sql_transaction = connection.unchecked_transaction()?;

    sql_transaction.execute(
        "INSERT INTO \"transaction\" (user_id, amount, description, date, type, category, category_icon) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_str(),
            new_transaction.amount,
            &new_transaction.description,
            new_transaction.date,
            new_transaction.transaction_type.as_str(),
            &new_transaction.category,
            &category_icon,
        ),
    )?;

    let transaction_id = sql_transaction.last_insert_rowid();

    record_transaction(
        user_id,
        new_transaction.date,
        new_transaction.transaction_type,
        new_transaction.amount,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(Transaction {
        id: transaction_id,
        user_id: user_id.clone(),
        amount: new_transaction.amount,
        description: new_transaction.description,
        date: new_transaction.date,
        transaction_type: new_transaction.transaction_type,
        category: new_transaction.category,
        category_icon,
    })
}

/// Delete the transaction `transaction_id` owned by `user_id` and subtract its
/// amount from the history aggregates.
///
/// The transaction row and both history aggregate rows are changed in a
/// single SQL transaction so that reads never observe a torn state.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not
/// exist or belongs to another user, or [Error::SqlError] on an SQL error.
pub(crate) fn delete_transaction(
    user_id: &UserId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let (amount, date, raw_type): (f64, Date, String) = sql_transaction
        .prepare("SELECT amount, date, type FROM \"transaction\" WHERE id = ?1 AND user_id = ?2")?
        .query_row((transaction_id, user_id.as_str()), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingTransaction,
            error => error.into(),
        })?;

    let transaction_type: TransactionType = raw_type
        .parse()
        .expect("the database only stores valid transaction types");

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_str()),
    )?;

    record_transaction(user_id, date, transaction_type, -amount, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Get the transactions owned by `user_id` dated within `from..=to`, newest
/// first.
///
/// Transactions with equal dates keep a stable order by ID.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_transactions_in_range(
    user_id: &UserId,
    from: Date,
    to: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, description, date, type, category, category_icon \
            FROM \"transaction\" \
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 \
            ORDER BY date DESC, id ASC",
        )?
        .query_map((user_id.as_str(), from, to), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod transaction_core_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserId,
        category::{NewCategory, create_category},
        db::initialize,
    };

    use super::{
        NewTransaction, TransactionType, create_transaction, delete_transaction,
        get_transactions_in_range,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn test_user() -> UserId {
        UserId::new("user_test")
    }

    fn insert_test_category(
        user_id: &UserId,
        name: &str,
        transaction_type: TransactionType,
        conn: &Connection,
    ) {
        create_category(
            user_id,
            NewCategory {
                name: name.to_string(),
                icon: "🛒".to_string(),
                transaction_type,
            },
            conn,
        )
        .unwrap();
    }

    fn new_expense(amount: f64, date: time::Date) -> NewTransaction {
        NewTransaction {
            amount,
            description: "weekly shop".to_string(),
            date,
            transaction_type: TransactionType::Expense,
            category: "Groceries".to_string(),
        }
    }

    #[test]
    fn create_transaction_returns_stored_fields() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);

        let got =
            create_transaction(&user_id, new_expense(42.5, date!(2024 - 01 - 10)), &conn).unwrap();

        assert!(got.id > 0);
        assert_eq!(got.user_id, user_id);
        assert_eq!(got.amount, 42.5);
        assert_eq!(got.date, date!(2024 - 01 - 10));
        assert_eq!(got.transaction_type, TransactionType::Expense);
        assert_eq!(got.category, "Groceries");
        assert_eq!(got.category_icon, "🛒");
    }

    #[test]
    fn create_transaction_rejects_negative_amount() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);

        let got = create_transaction(&user_id, new_expense(-1.0, date!(2024 - 01 - 10)), &conn);

        assert_eq!(got, Err(Error::InvalidAmount(-1.0)));
    }

    #[test]
    fn create_transaction_rejects_unknown_category() {
        let conn = get_test_connection();
        let user_id = test_user();

        let got = create_transaction(&user_id, new_expense(10.0, date!(2024 - 01 - 10)), &conn);

        assert_eq!(
            got,
            Err(Error::InvalidCategory {
                name: "Groceries".to_string(),
                transaction_type: TransactionType::Expense,
            })
        );
    }

    #[test]
    fn create_transaction_rejects_category_with_wrong_type() {
        let conn = get_test_connection();
        let user_id = test_user();
        // Same name, but an income category. An expense must not match it.
        insert_test_category(&user_id, "Groceries", TransactionType::Income, &conn);

        let got = create_transaction(&user_id, new_expense(10.0, date!(2024 - 01 - 10)), &conn);

        assert_eq!(
            got,
            Err(Error::InvalidCategory {
                name: "Groceries".to_string(),
                transaction_type: TransactionType::Expense,
            })
        );
    }

    #[test]
    fn create_transaction_updates_history_aggregates() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);

        create_transaction(&user_id, new_expense(42.5, date!(2024 - 01 - 10)), &conn).unwrap();
        create_transaction(&user_id, new_expense(7.5, date!(2024 - 01 - 10)), &conn).unwrap();

        let (income, expense): (f64, f64) = conn
            .query_row(
                "SELECT income, expense FROM month_history \
                WHERE user_id = ?1 AND year = 2024 AND month = 1 AND day = 10",
                (user_id.as_str(),),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((income, expense), (0.0, 50.0));

        let (income, expense): (f64, f64) = conn
            .query_row(
                "SELECT income, expense FROM year_history \
                WHERE user_id = ?1 AND year = 2024 AND month = 1",
                (user_id.as_str(),),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((income, expense), (0.0, 50.0));
    }

    #[test]
    fn delete_transaction_reverses_history_aggregates() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);

        let keep =
            create_transaction(&user_id, new_expense(42.5, date!(2024 - 01 - 10)), &conn).unwrap();
        let delete =
            create_transaction(&user_id, new_expense(7.5, date!(2024 - 01 - 10)), &conn).unwrap();

        delete_transaction(&user_id, delete.id, &conn).unwrap();

        let expense: f64 = conn
            .query_row(
                "SELECT expense FROM month_history \
                WHERE user_id = ?1 AND year = 2024 AND month = 1 AND day = 10",
                (user_id.as_str(),),
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(expense, keep.amount);
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let conn = get_test_connection();

        let got = delete_transaction(&test_user(), 1337, &conn);

        assert_eq!(got, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn delete_other_users_transaction_fails() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);
        let transaction =
            create_transaction(&user_id, new_expense(42.5, date!(2024 - 01 - 10)), &conn).unwrap();

        let got = delete_transaction(&UserId::new("user_other"), transaction.id, &conn);

        assert_eq!(got, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn get_transactions_in_range_returns_newest_first() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);

        let older =
            create_transaction(&user_id, new_expense(1.0, date!(2024 - 01 - 05)), &conn).unwrap();
        let newer =
            create_transaction(&user_id, new_expense(2.0, date!(2024 - 01 - 20)), &conn).unwrap();
        // Outside the queried range.
        create_transaction(&user_id, new_expense(3.0, date!(2024 - 02 - 01)), &conn).unwrap();

        let got = get_transactions_in_range(
            &user_id,
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 31),
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn get_transactions_in_range_excludes_other_users() {
        let conn = get_test_connection();
        let user_id = test_user();
        insert_test_category(&user_id, "Groceries", TransactionType::Expense, &conn);
        create_transaction(&user_id, new_expense(1.0, date!(2024 - 01 - 05)), &conn).unwrap();

        let got = get_transactions_in_range(
            &UserId::new("user_other"),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 31),
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![]);
    }
}
