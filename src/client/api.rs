//! The HTTP client and its cache coordination rules.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::Date;

use crate::{
    BalanceStats, Category, CategoryStats, HistoryBucket, NewCategory, NewTransaction, Timeframe,
    Transaction, TransactionListing, TransactionType, UserSettings, endpoints,
    endpoints::format_endpoint, transaction::TransactionId,
};

use super::query_cache::{QueryCache, QueryKey};

/// The errors that may occur when talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request.
    #[error("the server responded with {status}: {message}")]
    Api {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The error message from the response body.
        message: String,
    },

    /// A cached or received body did not match the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A typed client for the pocketbook API.
///
/// Reads are cached under hierarchical query keys. Mutations invalidate the
/// prefixes they affect: transaction changes invalidate `overview` and
/// `transactions`, category changes invalidate `categories`, and a currency
/// change invalidates `transactions` (their formatted amounts are stale).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    cache: QueryCache,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g.
    /// `http://localhost:3000`), authenticating with the bearer `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            cache: QueryCache::default(),
        }
    }

    /// The query cache, exposed for inspection.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Get the income and expense totals for `from..=to`.
    pub async fn get_balance_stats(
        &mut self,
        from: Date,
        to: Date,
    ) -> Result<BalanceStats, ClientError> {
        let key = QueryKey::new([
            "overview".to_string(),
            "stats".to_string(),
            "balance".to_string(),
            from.to_string(),
            to.to_string(),
        ]);

        self.get_cached(
            key,
            endpoints::BALANCE_STATS,
            &[("from", from.to_string()), ("to", to.to_string())],
        )
        .await
    }

    /// Get the per-category totals for `from..=to`, largest first.
    pub async fn get_category_stats(
        &mut self,
        from: Date,
        to: Date,
    ) -> Result<Vec<CategoryStats>, ClientError> {
        let key = QueryKey::new([
            "overview".to_string(),
            "stats".to_string(),
            "categories".to_string(),
            from.to_string(),
            to.to_string(),
        ]);

        self.get_cached(
            key,
            endpoints::CATEGORY_STATS,
            &[("from", from.to_string()), ("to", to.to_string())],
        )
        .await
    }

    /// Get the years the user has transactions in, ascending.
    pub async fn get_history_periods(&mut self) -> Result<Vec<i32>, ClientError> {
        let key = QueryKey::new(["overview", "history", "periods"]);

        self.get_cached(key, endpoints::HISTORY_PERIODS, &[]).await
    }

    /// Get the zero-filled history buckets for a year or a month.
    pub async fn get_history_data(
        &mut self,
        timeframe: Timeframe,
        year: i32,
        month: Option<u8>,
    ) -> Result<Vec<HistoryBucket>, ClientError> {
        let mut segments = vec![
            "overview".to_string(),
            "history".to_string(),
            "data".to_string(),
            timeframe.as_str().to_string(),
            year.to_string(),
        ];
        let mut query = vec![
            ("timeframe", timeframe.as_str().to_string()),
            ("year", year.to_string()),
        ];

        if let Some(month) = month {
            segments.push(month.to_string());
            query.push(("month", month.to_string()));
        }

        self.get_cached(QueryKey::new(segments), endpoints::HISTORY_DATA, &query)
            .await
    }

    /// Get the user's transactions within `from..=to`, newest first.
    pub async fn get_transactions(
        &mut self,
        from: Date,
        to: Date,
    ) -> Result<Vec<TransactionListing>, ClientError> {
        let key = QueryKey::new([
            "transactions".to_string(),
            from.to_string(),
            to.to_string(),
        ]);

        self.get_cached(
            key,
            endpoints::TRANSACTIONS,
            &[("from", from.to_string()), ("to", to.to_string())],
        )
        .await
    }

    /// Get the user's categories, optionally filtered by transaction type.
    pub async fn get_categories(
        &mut self,
        filter: Option<TransactionType>,
    ) -> Result<Vec<Category>, ClientError> {
        let mut segments = vec!["categories".to_string()];
        let mut query = Vec::new();

        if let Some(transaction_type) = filter {
            segments.push(transaction_type.as_str().to_string());
            query.push(("type", transaction_type.as_str().to_string()));
        }

        self.get_cached(QueryKey::new(segments), endpoints::CATEGORIES, &query)
            .await
    }

    /// Get the user's settings. Settings are not cached.
    pub async fn get_settings(&mut self) -> Result<UserSettings, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, endpoints::SETTINGS))
            .bearer_auth(&self.token)
            .send()
            .await?;

        serde_json::from_value(Self::into_json(response).await?).map_err(ClientError::Decode)
    }

    /// Record a new transaction and invalidate the overview and transaction
    /// caches.
    pub async fn create_transaction(
        &mut self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoints::TRANSACTIONS))
            .bearer_auth(&self.token)
            .json(new_transaction)
            .send()
            .await?;
        let transaction = serde_json::from_value(Self::into_json(response).await?)?;

        self.cache.invalidate_prefix(&["overview"]);
        self.cache.invalidate_prefix(&["transactions"]);

        Ok(transaction)
    }

    /// Delete a transaction and invalidate the overview and transaction
    /// caches.
    pub async fn delete_transaction(
        &mut self,
        transaction_id: TransactionId,
    ) -> Result<(), ClientError> {
        let path = format_endpoint(endpoints::TRANSACTION, transaction_id);
        let response = self
            .http
            .delete(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::into_json(response).await?;

        self.cache.invalidate_prefix(&["overview"]);
        self.cache.invalidate_prefix(&["transactions"]);

        Ok(())
    }

    /// Create a category and invalidate the category cache.
    pub async fn create_category(
        &mut self,
        new_category: &NewCategory,
    ) -> Result<Category, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoints::CATEGORIES))
            .bearer_auth(&self.token)
            .json(new_category)
            .send()
            .await?;
        let category = serde_json::from_value(Self::into_json(response).await?)?;

        self.cache.invalidate_prefix(&["categories"]);

        Ok(category)
    }

    /// Delete a category and invalidate the category cache.
    pub async fn delete_category(
        &mut self,
        name: &str,
        transaction_type: TransactionType,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}{}", self.base_url, endpoints::CATEGORIES))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "name": name,
                "type": transaction_type,
            }))
            .send()
            .await?;
        Self::into_json(response).await?;

        self.cache.invalidate_prefix(&["categories"]);

        Ok(())
    }

    /// Change the user's display currency and invalidate the transaction
    /// cache, whose formatted amounts are rendered in the old currency.
    pub async fn update_currency(&mut self, currency: &str) -> Result<UserSettings, ClientError> {
        let response = self
            .http
            .put(format!("{}{}", self.base_url, endpoints::SETTINGS))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "currency": currency }))
            .send()
            .await?;
        let settings = serde_json::from_value(Self::into_json(response).await?)?;

        self.cache.invalidate_prefix(&["transactions"]);

        Ok(settings)
    }

    /// Serve `key` from the cache, or fetch it and cache the result.
    async fn get_cached<T: DeserializeOwned>(
        &mut self,
        key: QueryKey,
        endpoint_path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        if let Some(value) = self.cache.get(&key) {
            return serde_json::from_value(value.clone()).map_err(ClientError::Decode);
        }

        let response = self
            .http
            .get(format!("{}{endpoint_path}", self.base_url))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        let value = Self::into_json(response).await?;

        self.cache.insert(key, value.clone());

        serde_json::from_value(value).map_err(ClientError::Decode)
    }

    /// Read the response body as JSON, turning error statuses into
    /// [ClientError::Api] with the server's error message.
    ///
    /// Deletes respond with a bare status and no body, so an empty success
    /// body is treated as JSON null rather than a decode failure.
    async fn into_json(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(Value::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| status.to_string());

            return Err(ClientError::Api { status, message });
        }

        let body = response.bytes().await?;

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }
}
