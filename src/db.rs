//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    category::create_category_table,
    history::{create_month_history_table, create_year_history_table},
    settings::create_user_settings_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models.
///
/// The tables are created in a single exclusive SQL transaction so that a
/// partially initialized database is never left behind. Existing tables are
/// left alone, so a server can safely reopen its database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_category_table(&transaction)?;
    create_user_settings_table(&transaction)?;
    create_month_history_table(&transaction)?;
    create_year_history_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
                ('transaction', 'category', 'user_settings', 'month_history', 'year_history')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 5, "want 5 tables, got {table_count}");
    }

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        assert!(initialize(&conn).is_ok());
    }
}
