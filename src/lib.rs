//! FinanceFlow is a personal finance tracker for recording income and
//! expenses, grouping them into categories, and summarising them for a
//! dashboard.
//!
//! This library provides a REST API that serves JSON. Every response uses the
//! envelope defined in [response], and every endpoint except registration,
//! login and the health probe requires a bearer token (see [auth]).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

pub mod aggregate;
pub mod auth;
pub mod db;
pub mod endpoints;
pub mod filter;
mod logging;
pub mod models;
pub mod pagination;
pub mod response;
pub mod routes;
mod routing;
pub mod sort;
mod state;
pub mod stores;

pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use state::{AppState, AuthState, JwtKeys};

use crate::response::ApiResponse;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request did not include an `Authorization: Bearer` header.
    #[error("an access token is required")]
    MissingToken,

    /// The bearer token could not be decoded, or it has expired.
    #[error("the access token is invalid or has expired")]
    InvalidToken,

    /// An unexpected error occurred while signing a new token.
    ///
    /// The underlying error should only be logged on the server, the client
    /// gets a generic internal error message.
    #[error("could not create an access token")]
    TokenCreation,

    /// The user provided a password that does not meet the minimum
    /// requirements.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// One or more request fields failed validation.
    ///
    /// Each string is a human-readable, field-level message that is returned
    /// to the client in the `errors` array of the response envelope.
    #[error("invalid request data")]
    Validation(Vec<String>),

    /// The user's email already exists in the database. The client should try
    /// again with a different email address.
    #[error("a user already exists with the email address")]
    DuplicateEmail,

    /// A category with the same name and type already exists for the user.
    #[error("a category with this name already exists for this type")]
    DuplicateCategory,

    /// The category is still referenced by the given number of transactions
    /// and cannot be deleted.
    #[error("the category is used by {0} transaction(s)")]
    CategoryInUse(usize),

    /// The category ID used to create or update a transaction did not match a
    /// valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// The current password given when changing passwords was wrong.
    #[error("the current password is incorrect")]
    IncorrectPassword,

    /// The requested resource was not found, or it belongs to another user.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::failure("invalid credentials"),
            ),
            Error::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::failure("an access token is required"),
            ),
            Error::InvalidToken => (
                StatusCode::FORBIDDEN,
                ApiResponse::failure("the access token is invalid or has expired"),
            ),
            Error::TooWeak(reason) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure_with_errors("invalid request data", vec![reason]),
            ),
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure_with_errors("invalid request data", errors),
            ),
            Error::DuplicateEmail => (
                StatusCode::CONFLICT,
                ApiResponse::failure("a user already exists with this email address"),
            ),
            Error::DuplicateCategory => (
                StatusCode::CONFLICT,
                ApiResponse::failure("a category with this name already exists for this type"),
            ),
            Error::CategoryInUse(count) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure(&format!(
                    "the category cannot be deleted because it is used by {count} transaction(s)"
                )),
            ),
            Error::InvalidCategory => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure("the category ID does not refer to a valid category"),
            ),
            Error::IncorrectPassword => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure("the current password is incorrect"),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::failure("the requested resource could not be found"),
            ),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure("internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn not_found_maps_to_404() {
        let response = Error::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_email_maps_to_409() {
        let response = Error::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_400() {
        let response =
            Error::Validation(vec!["description is required".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_token_maps_to_401_and_invalid_token_to_403() {
        assert_eq!(
            Error::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::InvalidToken.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn sql_error_maps_to_500() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
