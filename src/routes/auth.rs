//! Handlers for registration, login and token verification.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{Claims, Credentials, encode_token},
    models::{NewUser, PasswordHash, UserProfile, ValidatedPassword},
    response::ApiResponse,
    stores::{CategoryStore, SettingsStore, TransactionStore, UserStore},
};

/// The email address the shared demo account is registered under.
pub const DEMO_EMAIL: &str = "demo@financeflow.dev";

const DEMO_NAME: &str = "Demo User";
const DEMO_PASSWORD: &str = "demo-password";

/// The maximum number of characters allowed in a user's display name.
const MAX_NAME_LENGTH: usize = 100;

/// The body of a registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    /// The display name of the new user.
    pub name: String,
    /// The email address to register with.
    pub email: String,
    /// The password to register with.
    pub password: String,
}

/// The payload returned by endpoints that issue a token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthData {
    /// The profile of the authenticated user.
    pub user: UserProfile,
    /// The signed bearer token.
    pub token: String,
}

fn validate_registration(
    payload: &RegisterPayload,
) -> Result<(String, EmailAddress, ValidatedPassword), Error> {
    let mut errors = Vec::new();

    let name = payload.name.trim();
    if !(2..=MAX_NAME_LENGTH).contains(&name.chars().count()) {
        errors.push(format!(
            "name must be between 2 and {MAX_NAME_LENGTH} characters"
        ));
    }

    let email = match payload.email.parse::<EmailAddress>() {
        Ok(email) => Some(email),
        Err(_) => {
            errors.push("email must have a valid format".to_string());
            None
        }
    };

    let password = match ValidatedPassword::new(&payload.password) {
        Ok(password) => Some(password),
        Err(Error::TooWeak(reason)) => {
            errors.push(reason);
            None
        }
        Err(error) => return Err(error),
    };

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => {
            Ok((name.to_string(), email, password))
        }
        _ => Err(Error::Validation(errors)),
    }
}

/// Handler for registration requests.
///
/// Creates the user together with their default settings and categories, then
/// signs them in.
pub async fn register<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let (name, email, password) = validate_registration(&payload)?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let user = state.user_store.create(NewUser {
        name,
        email,
        password_hash,
    })?;

    let token = encode_token(
        user.id(),
        user.email(),
        &state.jwt_keys,
        OffsetDateTime::now_utc(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "user created successfully",
            AuthData {
                user: user.profile(),
                token,
            },
        )),
    )
        .into_response())
}

/// Handler for sign-in requests.
///
/// # Errors
///
/// Responds with an unauthorized status when the email is unknown or the
/// password does not match. The two cases are indistinguishable to the
/// client.
pub async fn log_in<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let email = credentials
        .email
        .parse::<EmailAddress>()
        .map_err(|_| Error::InvalidCredentials)?;

    let user = state.user_store.get_by_email(&email).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => error,
    })?;

    let password_is_correct = user
        .password_hash()
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(
        user.id(),
        user.email(),
        &state.jwt_keys,
        OffsetDateTime::now_utc(),
    )?;

    Ok(Json(ApiResponse::with_message(
        "login successful",
        AuthData {
            user: user.profile(),
            token,
        },
    ))
    .into_response())
}

/// Handler for demo sign-in requests.
///
/// The demo account is created through the normal registration path on first
/// use, so demo data behaves exactly like real data.
pub async fn log_in_demo<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let email = DEMO_EMAIL
        .parse::<EmailAddress>()
        .expect("the demo email address is valid");

    let user = match state.user_store.get_by_email(&email) {
        Ok(user) => user,
        Err(Error::NotFound) => state.user_store.create(NewUser {
            name: DEMO_NAME.to_string(),
            email,
            password_hash: PasswordHash::from_raw_password(
                DEMO_PASSWORD,
                PasswordHash::DEFAULT_COST,
            )?,
        })?,
        Err(error) => return Err(error),
    };

    let token = encode_token(
        user.id(),
        user.email(),
        &state.jwt_keys,
        OffsetDateTime::now_utc(),
    )?;

    Ok(Json(ApiResponse::with_message(
        "demo login successful",
        AuthData {
            user: user.profile(),
            token,
        },
    ))
    .into_response())
}

/// The payload returned by the token verification endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyData {
    /// The profile of the authenticated user.
    pub user: UserProfile,
}

/// Handler for token verification requests.
///
/// Returns the profile of the user the presented token belongs to.
pub async fn verify<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let user = state.user_store.get(claims.user_id())?;

    Ok(Json(ApiResponse::data(VerifyData {
        user: user.profile(),
    }))
    .into_response())
}
