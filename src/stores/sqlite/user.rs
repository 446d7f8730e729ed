//! Implements a SQLite backed user store.

use std::sync::{Arc, Mutex};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{NewUser, PasswordHash, ProfileUpdate, User, UserID, UserSettings},
    stores::UserStore,
};

/// The categories seeded for every new user: `(name, type, color, icon)`.
///
/// The type column holds the lowercase string form of
/// [TransactionType](crate::models::TransactionType).
const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 14] = [
    ("Salary", "income", "#10b981", "fas fa-money-bill-wave"),
    ("Freelance", "income", "#3b82f6", "fas fa-laptop"),
    ("Investments", "income", "#8b5cf6", "fas fa-chart-line"),
    ("Sales", "income", "#f59e0b", "fas fa-shopping-cart"),
    ("Other", "income", "#6b7280", "fas fa-ellipsis-h"),
    ("Food", "expense", "#ef4444", "fas fa-utensils"),
    ("Housing", "expense", "#f59e0b", "fas fa-home"),
    ("Transport", "expense", "#3b82f6", "fas fa-car"),
    ("Health", "expense", "#10b981", "fas fa-heart"),
    ("Education", "expense", "#8b5cf6", "fas fa-graduation-cap"),
    ("Leisure", "expense", "#ec4899", "fas fa-gamepad"),
    ("Clothing", "expense", "#f97316", "fas fa-tshirt"),
    ("Bills", "expense", "#ef4444", "fas fa-file-invoice"),
    ("Other", "expense", "#6b7280", "fas fa-ellipsis-h"),
];

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn select_user_by_id(connection: &Connection, user_id: UserID) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, name, email, password, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], SQLiteUserStore::map_row)?;

    Ok(user)
}

impl UserStore for SQLiteUserStore {
    /// Create a new user in the database.
    ///
    /// The user row, the default settings row and the default categories are
    /// inserted inside one SQL transaction, so a failure part-way through
    /// leaves no partial registration behind.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateEmail] if the email address is already registered,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();
        let transaction = connection.unchecked_transaction()?;
        let created_at = OffsetDateTime::now_utc();

        transaction.execute(
            "INSERT INTO user (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
            (
                &new_user.name,
                new_user.email.to_string(),
                new_user.password_hash.to_string(),
                created_at,
            ),
        )?;

        let user_id = UserID::new(transaction.last_insert_rowid());
        let defaults = UserSettings::defaults_for(user_id);

        transaction.execute(
            "INSERT INTO user_settings
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

        for (name, category_type, color, icon) in DEFAULT_CATEGORIES {
            transaction.execute(
                "INSERT INTO category (user_id, name, type, color, icon, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (user_id.as_i64(), name, category_type, color, icon, created_at),
            )?;
        }

        transaction.commit()?;

        Ok(User::new(
            user_id,
            new_user.name,
            new_user.email,
            new_user.password_hash,
            created_at,
        ))
    }

    /// Retrieve a user in the database by their `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `user_id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, user_id: UserID) -> Result<User, Error> {
        select_user_by_id(&self.connection.lock().unwrap(), user_id)
    }

    /// Retrieve a user in the database by their email address.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no user is registered with `email`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, email, password, created_at FROM user WHERE email = :email")?
            .query_row(&[(":email", &email.to_string())], Self::map_row)?;

        Ok(user)
    }

    /// Update a user's name and/or email, keeping absent fields unchanged.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `user_id` does not refer to a valid user,
    /// - [Error::DuplicateEmail] if the new email belongs to another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update_profile(&mut self, user_id: UserID, update: ProfileUpdate) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();

        let rows_changed = connection.execute(
            "UPDATE user SET name = COALESCE(?1, name), email = COALESCE(?2, email) WHERE id = ?3",
            (
                update.name,
                update.email.map(|email| email.to_string()),
                user_id.as_i64(),
            ),
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        select_user_by_id(&connection, user_id)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `user_id` does not refer to a valid user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update_password(
        &mut self,
        user_id: UserID,
        password_hash: PasswordHash,
    ) -> Result<(), Error> {
        let rows_changed = self.connection.lock().unwrap().execute(
            "UPDATE user SET password = ?1 WHERE id = ?2",
            (password_hash.to_string(), user_id.as_i64()),
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = UserID::new(row.get(offset)?);
        let name = row.get(offset + 1)?;

        let raw_email: String = row.get(offset + 2)?;
        let email = EmailAddress::new_unchecked(raw_email);

        let raw_password_hash: String = row.get(offset + 3)?;
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        let created_at = row.get(offset + 4)?;

        Ok(User::new(id, name, email, password_hash, created_at))
    }
}
