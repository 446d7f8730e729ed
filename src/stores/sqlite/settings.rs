//! Implements a SQLite backed settings store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{SettingsUpdate, UserID, UserSettings},
    stores::SettingsStore,
};

/// Stores per-user settings in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteSettingsStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteSettingsStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn select_settings(connection: &Connection, user_id: UserID) -> Result<UserSettings, Error> {
    let settings = connection
        .prepare(
            "SELECT user_id, monthly_limit, daily_limit, alert_threshold, items_per_page,
                    notifications, auto_save
             FROM user_settings WHERE user_id = :user_id",
        )?
        .query_row(
            &[(":user_id", &user_id.as_i64())],
            SQLiteSettingsStore::map_row,
        )?;

    Ok(settings)
}

/// Insert the default settings row for `user_id` if none exists yet.
fn ensure_settings_row(connection: &Connection, user_id: UserID) -> Result<(), Error> {
    let defaults = UserSettings::defaults_for(user_id);

    connection.execute(
        "INSERT OR IGNORE INTO user_settings
         (user_id, monthly_limit, daily_limit, alert_threshold, items_per_page, notifications, auto_save)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_i64(),
            defaults.monthly_limit(),
            defaults.daily_limit(),
            defaults.alert_threshold(),
            defaults.items_per_page(),
            defaults.notifications(),
            defaults.auto_save(),
        ),
    )?;

    Ok(())
}

impl SettingsStore for SQLiteSettingsStore {
    /// Retrieve a user's settings, creating them with defaults on first
    /// access.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_or_create(&mut self, user_id: UserID) -> Result<UserSettings, Error> {
        let connection = self.connection.lock().unwrap();

        ensure_settings_row(&connection, user_id)?;
        select_settings(&connection, user_id)
    }

    /// Apply a partial settings update, keeping absent fields unchanged.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn update(&mut self, user_id: UserID, update: SettingsUpdate) -> Result<UserSettings, Error> {
        let connection = self.connection.lock().unwrap();

        ensure_settings_row(&connection, user_id)?;

        connection.execute(
            "UPDATE user_settings
             SET monthly_limit = COALESCE(?1, monthly_limit),
                 daily_limit = COALESCE(?2, daily_limit),
                 alert_threshold = COALESCE(?3, alert_threshold),
                 items_per_page = COALESCE(?4, items_per_page),
                 notifications = COALESCE(?5, notifications),
                 auto_save = COALESCE(?6, auto_save)
             WHERE user_id = ?7",
            (
                update.monthly_limit,
                update.daily_limit,
                update.alert_threshold,
                update.items_per_page,
                update.notifications,
                update.auto_save,
                user_id.as_i64(),
            ),
        )?;

        select_settings(&connection, user_id)
    }
}

impl CreateTable for SQLiteSettingsStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user_settings (
                    user_id INTEGER PRIMARY KEY,
                    monthly_limit REAL NOT NULL,
                    daily_limit REAL NOT NULL,
                    alert_threshold INTEGER NOT NULL,
                    items_per_page INTEGER NOT NULL,
                    notifications INTEGER NOT NULL,
                    auto_save INTEGER NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteSettingsStore {
    type ReturnType = UserSettings;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let user_id = UserID::new(row.get(offset)?);
        let monthly_limit = row.get(offset + 1)?;
        let daily_limit = row.get(offset + 2)?;
        let alert_threshold = row.get(offset + 3)?;
        let items_per_page = row.get(offset + 4)?;
        let notifications = row.get(offset + 5)?;
        let auto_save = row.get(offset + 6)?;

        Ok(UserSettings::new(
            user_id,
            monthly_limit,
            daily_limit,
            alert_threshold,
            items_per_page,
            notifications,
            auto_save,
        ))
    }
}

#[cfg(test)]
mod sqlite_settings_store_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        models::{NewUser, PasswordHash, SettingsUpdate, UserID, UserSettings},
        stores::{SettingsStore, UserStore, sqlite::SQLiteUserStore},
    };

    use super::SQLiteSettingsStore;

    fn get_store_and_user() -> (SQLiteSettingsStore, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let user = SQLiteUserStore::new(connection.clone())
            .create(NewUser {
                name: "Test User".to_string(),
                email: EmailAddress::from_str("foo@bar.baz").unwrap(),
                password_hash: PasswordHash::new_unchecked("notarealhash"),
            })
            .unwrap();

        let store = SQLiteSettingsStore::new(connection.clone());

        // Remove the row seeded at registration so the lazy-create path is
        // exercised.
        connection
            .lock()
            .unwrap()
            .execute(
                "DELETE FROM user_settings WHERE user_id = ?1",
                [user.id().as_i64()],
            )
            .unwrap();

        (store, user.id())
    }

    #[test]
    fn get_or_create_returns_defaults_on_first_access() {
        let (mut store, user_id) = get_store_and_user();

        let settings = store.get_or_create(user_id).unwrap();

        assert_eq!(settings, UserSettings::defaults_for(user_id));
    }

    #[test]
    fn get_or_create_is_stable_across_calls() {
        let (mut store, user_id) = get_store_and_user();

        let first = store.get_or_create(user_id).unwrap();
        let second = store.get_or_create(user_id).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn update_changes_only_provided_fields() {
        let (mut store, user_id) = get_store_and_user();

        let updated = store
            .update(
                user_id,
                SettingsUpdate {
                    monthly_limit: Some(1500.0),
                    notifications: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.monthly_limit(), 1500.0);
        assert!(!updated.notifications());
        // Untouched fields keep their defaults.
        assert_eq!(updated.alert_threshold(), 80);
        assert_eq!(updated.items_per_page(), 25);
        assert!(updated.auto_save());
    }

    #[test]
    fn update_creates_the_row_when_missing() {
        let (mut store, user_id) = get_store_and_user();

        let updated = store
            .update(
                user_id,
                SettingsUpdate {
                    daily_limit: Some(99.0),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.daily_limit(), 99.0);
    }
}
