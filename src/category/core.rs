//! The `Category` model and its database functions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserId, transaction::TransactionType};

/// A named group for transactions of one type, with a display icon.
///
/// Categories are unique per user by `(name, type)`, so a user may have both
/// an income and an expense category with the same name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the user that owns the category.
    pub user_id: UserId,

    /// The name of the category.
    pub name: String,

    /// The icon displayed next to the category, e.g. an emoji.
    pub icon: String,

    /// The type of the transactions the category groups.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

/// The data needed to create a [Category].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCategory {
    /// The name of the category.
    pub name: String,
    /// The icon displayed next to the category.
    pub icon: String,
    /// The type of the transactions the category groups.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

pub(crate) fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            icon TEXT NOT NULL,
            PRIMARY KEY (user_id, name, type)
            )",
        (),
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let transaction_type = raw_type.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid transaction type {raw_type:?}").into(),
        )
    })?;

    Ok(Category {
        user_id: UserId::new(&row.get::<_, String>(0)?),
        name: row.get(1)?,
        icon: row.get(2)?,
        transaction_type,
    })
}

/// Create a new category for `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - the trimmed name is empty,
/// - the user already has a category with this name and type,
/// - or there is an SQL error.
pub fn create_category(
    user_id: &UserId,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = new_category.name.trim().to_string();

    if name.is_empty() {
        return Err(Error::EmptyCategoryName);
    }

    let result = connection.execute(
        "INSERT INTO category (user_id, name, type, icon) VALUES (?1, ?2, ?3, ?4)",
        (
            user_id.as_str(),
            &name,
            new_category.transaction_type.as_str(),
            &new_category.icon,
        ),
    );

    match result {
        Ok(_) => Ok(Category {
            user_id: user_id.clone(),
            name,
            icon: new_category.icon,
            transaction_type: new_category.transaction_type,
        }),
        // Codes 1555 and 2067 occur when a PRIMARY KEY or UNIQUE constraint failed.
        Err(rusqlite::Error::SqliteFailure(sql_error, Some(ref desc)))
            if (sql_error.extended_code == 1555 || sql_error.extended_code == 2067)
                && desc.contains("category") =>
        {
            Err(Error::DuplicateCategory(name))
        }
        Err(error) => Err(error.into()),
    }
}

/// Get the categories owned by `user_id`, ordered by name.
///
/// When `filter` is set, only categories of that transaction type are
/// returned.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_categories(
    user_id: &UserId,
    filter: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let rows = match filter {
        Some(transaction_type) => connection
            .prepare(
                "SELECT user_id, name, icon, type FROM category \
                WHERE user_id = ?1 AND type = ?2 ORDER BY name ASC",
            )?
            .query_map(
                (user_id.as_str(), transaction_type.as_str()),
                map_category_row,
            )?
            .collect::<Vec<_>>(),
        None => connection
            .prepare(
                "SELECT user_id, name, icon, type FROM category \
                WHERE user_id = ?1 ORDER BY name ASC",
            )?
            .query_map((user_id.as_str(),), map_category_row)?
            .collect::<Vec<_>>(),
    };

    rows.into_iter()
        .map(|category_result| category_result.map_err(Error::SqlError))
        .collect()
}

/// Delete the category of `user_id` matching `name` and `transaction_type`.
///
/// Existing transactions referencing the category by name are not changed,
/// and the history aggregates keep their totals.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if no such category exists, or
/// [Error::SqlError] on an SQL error.
pub(crate) fn delete_category(
    user_id: &UserId,
    name: &str,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM category WHERE user_id = ?1 AND name = ?2 AND type = ?3",
        (user_id.as_str(), name, transaction_type.as_str()),
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}
