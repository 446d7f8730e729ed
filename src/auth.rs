//! Bearer-token authentication.
//!
//! Tokens are JSON Web Tokens signed with a shared secret. Handlers opt into
//! authentication by taking a [Claims] argument: the extractor reads the
//! `Authorization: Bearer` header, verifies the signature and expiry, and
//! hands the handler the token's claims. A missing header is rejected as
//! unauthorized, a bad or expired token as forbidden.

use axum::{RequestPartsExt, extract::FromRef, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use email_address::EmailAddress;
use jsonwebtoken::{Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{AuthState, Error, JwtKeys, models::UserID};

/// How long a bearer token stays valid after it is issued.
pub const TOKEN_DURATION: Duration = Duration::days(7);

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The expiry time of the token as a unix timestamp.
    pub exp: usize,
    /// The time the token was issued as a unix timestamp.
    pub iat: usize,
    /// The ID of the user the token belongs to.
    pub sub: i64,
    /// The email address of the user the token belongs to.
    pub email: String,
}

impl Claims {
    /// The ID of the user the token belongs to.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::MissingToken)?;

        let auth_state = AuthState::from_ref(state);

        decode_token(bearer.token(), &auth_state.jwt_keys)
    }
}

/// Create a signed bearer token for the user.
///
/// `now` is the issue time; the token expires [TOKEN_DURATION] later.
///
/// # Errors
///
/// Returns an [Error::TokenCreation] if signing fails.
pub fn encode_token(
    user_id: UserID,
    email: &EmailAddress,
    jwt_keys: &JwtKeys,
    now: OffsetDateTime,
) -> Result<String, Error> {
    let claims = Claims {
        exp: (now + TOKEN_DURATION).unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
        sub: user_id.as_i64(),
        email: email.to_string(),
    };

    encode(&Header::default(), &claims, &jwt_keys.encoding_key).map_err(|error| {
        tracing::error!("failed to sign a bearer token: {error}");
        Error::TokenCreation
    })
}

/// Verify a bearer token and return its claims.
///
/// # Errors
///
/// Returns an [Error::InvalidToken] if the token cannot be decoded, its
/// signature does not match, or it has expired.
pub fn decode_token(token: &str, jwt_keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &jwt_keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|_| Error::InvalidToken)
}

/// The credentials presented when logging in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email entered during sign-in.
    pub email: String,
    /// Password entered during sign-in.
    pub password: String,
}
