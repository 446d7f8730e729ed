//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Transaction, TransactionData, UserID},
    stores::TransactionStore,
};

/// The joined column list shared by every transaction query. The category
/// display name is resolved from the referenced category row.
const SELECT_COLUMNS: &str = "t.id, t.user_id, t.description, t.amount, t.type, t.category_id, \
     c.name, t.date, t.created_at, t.updated_at";

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction depends on the
/// [User](crate::models::User) and [Category](crate::models::Category)
/// models, these models must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn select_transaction(
    connection: &Connection,
    user_id: UserID,
    transaction_id: DatabaseID,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" t
             INNER JOIN category c ON t.category_id = c.id
             WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            SQLiteTransactionStore::map_row,
        )?;

    Ok(transaction)
}

/// Check that `category_id` refers to a category owned by `user_id`.
///
/// The foreign key on the transaction table only guarantees the category
/// exists; ownership has to be checked explicitly so that one user cannot
/// file transactions under another user's categories.
fn category_belongs_to_user(
    connection: &Connection,
    user_id: UserID,
    category_id: DatabaseID,
) -> Result<bool, Error> {
    let count = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
        |row| row.get::<_, i64>(0),
    )?;

    Ok(count > 0)
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidCategory] if `data.category_id` does not refer to one
    ///   of the user's categories,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, user_id: UserID, data: TransactionData) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        if !category_belongs_to_user(&connection, user_id, data.category_id)? {
            return Err(Error::InvalidCategory);
        }

        let now = OffsetDateTime::now_utc();

        connection
            .execute(
                "INSERT INTO \"transaction\"
                 (user_id, description, amount, type, category_id, date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                (
                    user_id.as_i64(),
                    &data.description,
                    data.amount,
                    data.transaction_type,
                    data.category_id,
                    data.date,
                    now,
                    now,
                ),
            )
            .map_err(|error| match error {
                // Code 787 occurs when a FOREIGN KEY constraint failed.
                rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                    Error::InvalidCategory
                }
                error => error.into(),
            })?;

        let transaction_id = connection.last_insert_rowid();

        select_transaction(&connection, user_id, transaction_id)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to
    ///   another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, user_id: UserID, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        select_transaction(&self.connection.lock().unwrap(), user_id, transaction_id)
    }

    /// Retrieve all of a user's transactions, most recent first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM \"transaction\" t
                 INNER JOIN category c ON t.category_id = c.id
                 WHERE t.user_id = :user_id
                 ORDER BY t.date DESC, t.created_at DESC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Retrieve up to `limit` of a user's most recent transactions.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_recent(&self, user_id: UserID, limit: u64) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM \"transaction\" t
                 INNER JOIN category c ON t.category_id = c.id
                 WHERE t.user_id = :user_id
                 ORDER BY t.date DESC, t.created_at DESC
                 LIMIT :limit"
            ))?
            .query_map(
                &[(":user_id", &user_id.as_i64()), (":limit", &(limit as i64))],
                Self::map_row,
            )?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Replace every field of an existing transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to
    ///   another user,
    /// - [Error::InvalidCategory] if the new category ID is not one of the
    ///   user's categories,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        user_id: UserID,
        transaction_id: DatabaseID,
        data: TransactionData,
    ) -> Result<Transaction, Error> {
        let connection = self.connection.lock().unwrap();

        if !category_belongs_to_user(&connection, user_id, data.category_id)? {
            return Err(Error::InvalidCategory);
        }

        let rows_changed = connection.execute(
            "UPDATE \"transaction\"
             SET description = ?1, amount = ?2, type = ?3, category_id = ?4, date = ?5,
                 updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            (
                &data.description,
                data.amount,
                data.transaction_type,
                data.category_id,
                data.date,
                OffsetDateTime::now_utc(),
                transaction_id,
                user_id.as_i64(),
            ),
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        select_transaction(&connection, user_id, transaction_id)
    }

    /// Delete a transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the transaction does not exist or belongs to
    ///   another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, user_id: UserID, transaction_id: DatabaseID) -> Result<(), Error> {
        let rows_changed = self.connection.lock().unwrap().execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (transaction_id, user_id.as_i64()),
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete several transactions at once.
    ///
    /// Ownership of every ID is verified before the delete statement runs.
    /// The verification and the delete are separate statements; a failure
    /// between them is not rolled back.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if `transaction_ids` is empty or any ID is
    ///   missing or owned by another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete_many(
        &mut self,
        user_id: UserID,
        transaction_ids: &[DatabaseID],
    ) -> Result<usize, Error> {
        if transaction_ids.is_empty() {
            return Err(Error::Validation(vec![
                "transaction IDs are required".to_string(),
            ]));
        }

        let connection = self.connection.lock().unwrap();

        let placeholders = transaction_ids
            .iter()
            .enumerate()
            .map(|(index, _)| format!("?{}", index + 2))
            .collect::<Vec<_>>()
            .join(",");

        let mut query_parameters = vec![Value::from(user_id.as_i64())];
        query_parameters.extend(transaction_ids.iter().map(|id| Value::from(*id)));

        let owned_count = connection.query_row(
            &format!(
                "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1 AND id IN ({placeholders})"
            ),
            params_from_iter(query_parameters.iter()),
            |row| row.get::<_, i64>(0),
        )? as usize;

        if owned_count != transaction_ids.len() {
            return Err(Error::Validation(vec![
                "some transactions were not found or do not belong to the user".to_string(),
            ]));
        }

        let deleted = connection.execute(
            &format!(
                "DELETE FROM \"transaction\" WHERE user_id = ?1 AND id IN ({placeholders})"
            ),
            params_from_iter(query_parameters.iter()),
        )?;

        Ok(deleted)
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    description TEXT NOT NULL,
                    amount REAL NOT NULL,
                    type TEXT NOT NULL,
                    category_id INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                    FOREIGN KEY(category_id) REFERENCES category(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);
        let description = row.get(offset + 2)?;
        let amount = row.get(offset + 3)?;
        let transaction_type = row.get(offset + 4)?;
        let category_id = row.get(offset + 5)?;
        let category = row.get(offset + 6)?;
        let date = row.get(offset + 7)?;
        let created_at = row.get(offset + 8)?;
        let updated_at = row.get(offset + 9)?;

        Ok(Transaction::new(
            id,
            user_id,
            description,
            amount,
            transaction_type,
            category_id,
            category,
            date,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        models::{
            Category, CategoryName, DatabaseID, HexColor, NewCategory, NewUser, PasswordHash,
            TransactionData, TransactionType, UserID,
        },
        stores::{CategoryStore, TransactionStore, UserStore, sqlite::SQLiteCategoryStore},
    };

    use super::SQLiteTransactionStore;

    struct Fixture {
        store: SQLiteTransactionStore,
        category_store: SQLiteCategoryStore,
        user_id: UserID,
        category: Category,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let user = crate::stores::sqlite::SQLiteUserStore::new(connection.clone())
            .create(NewUser {
                name: "Test User".to_string(),
                email: EmailAddress::from_str("foo@bar.baz").unwrap(),
                password_hash: PasswordHash::new_unchecked("notarealhash"),
            })
            .unwrap();

        let mut category_store = SQLiteCategoryStore::new(connection.clone());
        let category = category_store
            .create(NewCategory {
                user_id: user.id(),
                name: CategoryName::new_unchecked("Groceries"),
                category_type: TransactionType::Expense,
                color: HexColor::default(),
                icon: None,
            })
            .unwrap();

        Fixture {
            store: SQLiteTransactionStore::new(connection),
            category_store,
            user_id: user.id(),
            category,
        }
    }

    fn transaction_data(category_id: DatabaseID, amount: f64) -> TransactionData {
        TransactionData {
            description: "Weekly shop".to_string(),
            amount,
            transaction_type: TransactionType::Expense,
            category_id,
            date: date!(2026 - 08 - 01),
        }
    }

    #[test]
    fn create_resolves_the_category_name() {
        let mut fixture = get_fixture();

        let transaction = fixture
            .store
            .create(
                fixture.user_id,
                transaction_data(fixture.category.id(), 42.5),
            )
            .unwrap();

        assert_eq!(transaction.amount(), 42.5);
        assert_eq!(transaction.category(), "Groceries");
        assert_eq!(transaction.category_id(), fixture.category.id());
        assert_eq!(transaction.date(), date!(2026 - 08 - 01));
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let mut fixture = get_fixture();

        let result = fixture
            .store
            .create(fixture.user_id, transaction_data(999, 10.0));

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn create_fails_on_another_users_category() {
        let mut fixture = get_fixture();

        let other_user = crate::stores::sqlite::SQLiteUserStore::new(
            fixture.store.connection.clone(),
        )
        .create(NewUser {
            name: "Other".to_string(),
            email: EmailAddress::from_str("other@bar.baz").unwrap(),
            password_hash: PasswordHash::new_unchecked("notarealhash"),
        })
        .unwrap();

        let result = fixture
            .store
            .create(other_user.id(), transaction_data(fixture.category.id(), 1.0));

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn get_transaction_by_id_succeeds() {
        let mut fixture = get_fixture();
        let transaction = fixture
            .store
            .create(
                fixture.user_id,
                transaction_data(fixture.category.id(), 12.3),
            )
            .unwrap();

        let selected = fixture.store.get(fixture.user_id, transaction.id());

        assert_eq!(Ok(transaction), selected);
    }

    #[test]
    fn get_fails_on_another_users_transaction() {
        let mut fixture = get_fixture();
        let transaction = fixture
            .store
            .create(
                fixture.user_id,
                transaction_data(fixture.category.id(), 12.3),
            )
            .unwrap();

        let result = fixture
            .store
            .get(UserID::new(fixture.user_id.as_i64() + 1), transaction.id());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_by_user_orders_most_recent_first() {
        let mut fixture = get_fixture();
        let category_id = fixture.category.id();

        for (amount, date) in [
            (1.0, date!(2026 - 08 - 01)),
            (2.0, date!(2026 - 08 - 05)),
            (3.0, date!(2026 - 08 - 03)),
        ] {
            fixture
                .store
                .create(
                    fixture.user_id,
                    TransactionData {
                        date,
                        ..transaction_data(category_id, amount)
                    },
                )
                .unwrap();
        }

        let transactions = fixture.store.get_by_user(fixture.user_id).unwrap();

        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount()).collect();
        assert_eq!(amounts, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn get_recent_limits_the_result() {
        let mut fixture = get_fixture();
        let category_id = fixture.category.id();

        for i in 1..=10 {
            fixture
                .store
                .create(fixture.user_id, transaction_data(category_id, i as f64))
                .unwrap();
        }

        let recent = fixture.store.get_recent(fixture.user_id, 5).unwrap();

        assert_eq!(recent.len(), 5);
    }

    #[test]
    fn update_replaces_every_field() {
        let mut fixture = get_fixture();
        let transaction = fixture
            .store
            .create(
                fixture.user_id,
                transaction_data(fixture.category.id(), 10.0),
            )
            .unwrap();

        let other_category = fixture
            .category_store
            .create(NewCategory {
                user_id: fixture.user_id,
                name: CategoryName::new_unchecked("Eating Out"),
                category_type: TransactionType::Expense,
                color: HexColor::default(),
                icon: None,
            })
            .unwrap();

        let updated = fixture
            .store
            .update(
                fixture.user_id,
                transaction.id(),
                TransactionData {
                    description: "Dinner".to_string(),
                    amount: 64.0,
                    transaction_type: TransactionType::Expense,
                    category_id: other_category.id(),
                    date: date!(2026 - 08 - 06),
                },
            )
            .unwrap();

        assert_eq!(updated.description(), "Dinner");
        assert_eq!(updated.amount(), 64.0);
        assert_eq!(updated.category(), "Eating Out");
        assert_eq!(updated.date(), date!(2026 - 08 - 06));
    }

    #[test]
    fn update_fails_on_missing_transaction() {
        let mut fixture = get_fixture();

        let result = fixture.store.update(
            fixture.user_id,
            999,
            transaction_data(fixture.category.id(), 1.0),
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_the_transaction() {
        let mut fixture = get_fixture();
        let transaction = fixture
            .store
            .create(
                fixture.user_id,
                transaction_data(fixture.category.id(), 10.0),
            )
            .unwrap();

        fixture
            .store
            .delete(fixture.user_id, transaction.id())
            .unwrap();

        assert_eq!(
            fixture.store.get(fixture.user_id, transaction.id()),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_fails_on_missing_transaction() {
        let mut fixture = get_fixture();

        let result = fixture.store.delete(fixture.user_id, 999);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_many_removes_all_listed_transactions() {
        let mut fixture = get_fixture();
        let category_id = fixture.category.id();

        let ids: Vec<_> = (1..=3)
            .map(|i| {
                fixture
                    .store
                    .create(fixture.user_id, transaction_data(category_id, i as f64))
                    .unwrap()
                    .id()
            })
            .collect();

        let deleted = fixture.store.delete_many(fixture.user_id, &ids).unwrap();

        assert_eq!(deleted, 3);
        assert!(fixture.store.get_by_user(fixture.user_id).unwrap().is_empty());
    }

    #[test]
    fn delete_many_rejects_unknown_ids_without_deleting() {
        let mut fixture = get_fixture();
        let transaction = fixture
            .store
            .create(
                fixture.user_id,
                transaction_data(fixture.category.id(), 10.0),
            )
            .unwrap();

        let result = fixture
            .store
            .delete_many(fixture.user_id, &[transaction.id(), 999]);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(fixture.store.get(fixture.user_id, transaction.id()).is_ok());
    }

    #[test]
    fn delete_many_rejects_empty_id_list() {
        let mut fixture = get_fixture();

        let result = fixture.store.delete_many(fixture.user_id, &[]);

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
