//! Verifies the access tokens issued by the external identity provider.
//!
//! Pocketbook does not store credentials or run a sign-in flow. The identity
//! provider issues a JWT whose `sub` claim carries the user ID, and every API
//! endpoint requires that token as a bearer header. This module provides the
//! extractor that verifies the token and injects the user ID into handlers.

use std::fmt::Display;

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::AppState;

/// The ID of a user, as assigned by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from the identity provider's subject string.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// The user ID as a string slice, e.g. for binding to SQL parameters.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The contents of an access token.
#[derive(Serialize, Deserialize)]
struct Claims {
    /// The user ID the token was issued for.
    sub: String,
    /// The expiry time of the token as a unix timestamp.
    exp: usize,
}

/// The verified identity of the user making a request.
///
/// Extracting this type rejects the request with a 401 response if the bearer
/// token is missing, malformed, expired, or not signed with the shared secret.
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let state = AppState::from_ref(state);

        let token_data =
            decode::<Claims>(bearer.token(), state.decoding_key(), &Validation::default())
                .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser(UserId(token_data.claims.sub)))
    }
}

/// The errors that may occur when verifying a request's identity.
#[derive(Debug)]
pub enum AuthError {
    /// The request did not carry a bearer token.
    MissingToken,
    /// The bearer token could not be verified.
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_message = match self {
            AuthError::MissingToken => "missing access token",
            AuthError::InvalidToken => "invalid access token",
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Mint an access token for `user_id` that expires after `valid_for`.
///
/// This mirrors what the identity provider issues and exists for tests and
/// the demo tooling. The production server only ever verifies tokens.
pub fn issue_token(user_id: &UserId, valid_for: Duration, encoding_key: &EncodingKey) -> String {
    let exp = (OffsetDateTime::now_utc() + valid_for).unix_timestamp() as usize;
    let claims = Claims {
        sub: user_id.0.clone(),
        exp,
    };

    encode(&Header::default(), &claims, encoding_key)
        .expect("HMAC token signing should not fail with a valid key")
}

#[cfg(test)]
mod auth_tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::Duration;

    use crate::{AppState, UserId};

    use super::{AuthenticatedUser, issue_token};

    fn get_test_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection, "42").unwrap()
    }

    async fn whoami(AuthenticatedUser(user_id): AuthenticatedUser) -> String {
        user_id.to_string()
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new().route("/whoami", get(whoami)).with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn request_with_valid_token_extracts_user_id() {
        let state = get_test_state();
        let server = get_test_server(state.clone());
        let user_id = UserId::new("user_2NNEqL2");

        let token = issue_token(&user_id, Duration::minutes(15), state.encoding_key());

        let response = server.get("/whoami").authorization_bearer(token).await;

        response.assert_status_ok();
        response.assert_text("user_2NNEqL2");
    }

    #[tokio::test]
    async fn request_without_token_is_unauthorized() {
        let server = get_test_server(get_test_state());

        server
            .get("/whoami")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_with_garbage_token_is_unauthorized() {
        let server = get_test_server(get_test_state());

        server
            .get("/whoami")
            .authorization_bearer("not.a.token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_with_token_from_wrong_secret_is_unauthorized() {
        let server = get_test_server(get_test_state());

        let other_provider =
            AppState::new(Connection::open_in_memory().unwrap(), "not-42").unwrap();
        let token = issue_token(
            &UserId::new("user_2NNEqL2"),
            Duration::minutes(15),
            other_provider.encoding_key(),
        );

        server
            .get("/whoami")
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_with_expired_token_is_unauthorized() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let token = issue_token(
            &UserId::new("user_2NNEqL2"),
            Duration::minutes(-15),
            state.encoding_key(),
        );

        server
            .get("/whoami")
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
