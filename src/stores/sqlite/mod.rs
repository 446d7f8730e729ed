//! Contains the SQLite implementations of the store traits and a convenience
//! function for assembling an [AppState] backed by them.

mod category;
mod settings;
mod transaction;
mod user;

pub use category::SQLiteCategoryStore;
pub use settings::SQLiteSettingsStore;
pub use transaction::SQLiteTransactionStore;
pub use user::SQLiteUserStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{AppState, Error, db::initialize, pagination::PaginationConfig};

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SqlAppState =
    AppState<SQLiteCategoryStore, SQLiteTransactionStore, SQLiteUserStore, SQLiteSettingsStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(
    db_connection: Connection,
    jwt_secret: &str,
    pagination_config: PaginationConfig,
) -> Result<SqlAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        jwt_secret,
        pagination_config,
        SQLiteCategoryStore::new(connection.clone()),
        SQLiteTransactionStore::new(connection.clone()),
        SQLiteUserStore::new(connection.clone()),
        SQLiteSettingsStore::new(connection),
    ))
}
