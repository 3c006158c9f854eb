//! Per-user settings and currency formatting.

use axum::{Json, extract::State};
use numfmt::{Formatter, Precision};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, auth::AuthenticatedUser, auth::UserId};

/// The currencies a user may pick, as ISO 4217 codes with display symbols.
const SUPPORTED_CURRENCIES: [(&str, &str); 5] = [
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("IDR", "Rp"),
];

/// The currency assigned to users who have not chosen one.
const DEFAULT_CURRENCY: &str = "USD";

/// The settings of a single user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// The ID of the user the settings belong to.
    pub user_id: UserId,

    /// The ISO 4217 code of the user's display currency.
    pub currency: String,
}

pub(crate) fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY,
            currency TEXT NOT NULL
            )",
        (),
    )?;

    Ok(())
}

/// Get the settings of `user_id`, creating a row with the default currency on
/// first access.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub(crate) fn get_or_create_user_settings(
    user_id: &UserId,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO user_settings (user_id, currency) VALUES (?1, ?2)",
        (user_id.as_str(), DEFAULT_CURRENCY),
    )?;

    let currency = connection
        .prepare("SELECT currency FROM user_settings WHERE user_id = ?1")?
        .query_row((user_id.as_str(),), |row| row.get(0))?;

    Ok(UserSettings {
        user_id: user_id.clone(),
        currency,
    })
}

/// Set the display currency of `user_id`.
///
/// # Errors
/// Returns [Error::UnsupportedCurrency] if `currency` is not one of the
/// supported ISO 4217 codes, or [Error::SqlError] on an SQL error.
pub(crate) fn update_currency(
    user_id: &UserId,
    currency: &str,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    if currency_symbol(currency).is_none() {
        return Err(Error::UnsupportedCurrency(currency.to_string()));
    }

    connection.execute(
        "INSERT INTO user_settings (user_id, currency) VALUES (?1, ?2) \
        ON CONFLICT (user_id) DO UPDATE SET currency = excluded.currency",
        (user_id.as_str(), currency),
    )?;

    Ok(UserSettings {
        user_id: user_id.clone(),
        currency: currency.to_string(),
    })
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|(code, _)| *code == currency)
        .map(|(_, symbol)| *symbol)
}

/// Render `amount` with the symbol of `currency`, e.g. `format_amount(1234.5,
/// "USD")` gives `"$1,234.50"`.
///
/// Unknown currency codes fall back to the default currency's symbol, so a
/// stale settings row cannot break transaction listings.
pub(crate) fn format_amount(amount: f64, currency: &str) -> String {
    let symbol = currency_symbol(currency).unwrap_or("$");

    let mut formatted_string = if amount == 0.0 {
        // Zero is hardcoded as "0" by numfmt, so we must format it ourselves.
        format!("{symbol}0.00")
    } else {
        Formatter::currency(symbol)
            .unwrap()
            .precision(Precision::Decimals(2))
            .fmt_string(amount)
    };

    // numfmt omits the last trailing zero, so we must add it ourselves.
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

/// Get the authenticated user's settings, creating defaults on first access.
pub(crate) async fn get_settings_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<UserSettings>, Error> {
    let connection = state.db_connection.lock().unwrap();

    get_or_create_user_settings(&user_id, &connection).map(Json)
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateSettings {
    currency: String,
}

/// Update the authenticated user's display currency.
pub(crate) async fn update_settings_endpoint(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(update): Json<UpdateSettings>,
) -> Result<Json<UserSettings>, Error> {
    let connection = state.db_connection.lock().unwrap();

    update_currency(&user_id, &update.currency, &connection).map(Json)
}
