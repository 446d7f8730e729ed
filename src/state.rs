//! Implements the structs that hold the state of the REST server.

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{
    pagination::PaginationConfig,
    stores::{CategoryStore, SettingsStore, TransactionStore, UserStore},
};

/// The keys used to sign and verify bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    /// The key used to sign new tokens.
    pub encoding_key: EncodingKey,
    /// The key used to verify presented tokens.
    pub decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Derive the signing and verification keys from a shared secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// The state of the REST server.
///
/// The server is generic over its stores so that route handlers only ever
/// touch the data-access interface, never a concrete database.
#[derive(Clone)]
pub struct AppState<C, T, U, S>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    /// The keys used to sign and verify bearer tokens.
    pub jwt_keys: JwtKeys,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
    /// The store for managing user [categories](crate::models::Category).
    pub category_store: C,
    /// The store for managing user
    /// [transactions](crate::models::Transaction).
    pub transaction_store: T,
    /// The store for managing [users](crate::models::User).
    pub user_store: U,
    /// The store for managing
    /// [user settings](crate::models::UserSettings).
    pub settings_store: S,
}

impl<C, T, U, S> AppState<C, T, U, S>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(
        jwt_secret: &str,
        pagination_config: PaginationConfig,
        category_store: C,
        transaction_store: T,
        user_store: U,
        settings_store: S,
    ) -> Self {
        Self {
            jwt_keys: JwtKeys::from_secret(jwt_secret),
            pagination_config,
            category_store,
            transaction_store,
            user_store,
            settings_store,
        }
    }
}

/// The state needed to verify bearer tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The keys used to sign and verify bearer tokens.
    pub jwt_keys: JwtKeys,
}

// This impl lets the Claims extractor access the JWT keys from the app state.
impl<C, T, U, S> FromRef<AppState<C, T, U, S>> for AuthState
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<C, T, U, S>) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
        }
    }
}
