//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{
        Category, CategoryName, CategoryUpdate, DatabaseID, HexColor, NewCategory,
        TransactionType, UserID,
    },
    stores::CategoryStore,
};

const SELECT_COLUMNS: &str = "id, user_id, name, type, color, icon, created_at";

/// Stores categories in a SQLite database.
///
/// Note that because a category belongs to a [User](crate::models::User),
/// the user table must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn select_category(
    connection: &Connection,
    user_id: UserID,
    category_id: DatabaseID,
) -> Result<Category, Error> {
    let category = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM category WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            SQLiteCategoryStore::map_row,
        )?;

    Ok(category)
}

impl CategoryStore for SQLiteCategoryStore {
    /// Create a new category in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateCategory] if the user already has a category with
    ///   the same name and type,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, new_category: NewCategory) -> Result<Category, Error> {
        let connection = self.connection.lock().unwrap();

        let category = connection
            .prepare(&format!(
                "INSERT INTO category (user_id, name, type, color, icon, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {SELECT_COLUMNS}"
            ))?
            .query_row(
                (
                    new_category.user_id.as_i64(),
                    new_category.name.as_ref(),
                    new_category.category_type,
                    new_category.color.as_ref(),
                    &new_category.icon,
                    OffsetDateTime::now_utc(),
                ),
                Self::map_row,
            )?;

        Ok(category)
    }

    /// Retrieve a category in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the category does not exist or belongs to
    ///   another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, user_id: UserID, category_id: DatabaseID) -> Result<Category, Error> {
        select_category(&self.connection.lock().unwrap(), user_id, category_id)
    }

    /// Retrieve a user's categories ordered by name.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_for_user(
        &self,
        user_id: UserID,
        category_type: Option<TransactionType>,
    ) -> Result<Vec<Category>, Error> {
        let mut query_string_parts = vec![format!(
            "SELECT {SELECT_COLUMNS} FROM category WHERE user_id = ?1"
        )];
        let mut query_parameters = vec![Value::from(user_id.as_i64())];

        if let Some(category_type) = category_type {
            query_string_parts.push("AND type = ?2".to_string());
            query_parameters.push(Value::from(category_type.as_str().to_string()));
        }

        query_string_parts.push("ORDER BY name ASC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::SqlError))
            .collect()
    }

    /// Update a category's name, color and icon.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the category does not exist or belongs to
    ///   another user,
    /// - [Error::DuplicateCategory] if the new name collides with another
    ///   category of the same type,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        user_id: UserID,
        category_id: DatabaseID,
        update: CategoryUpdate,
    ) -> Result<Category, Error> {
        let connection = self.connection.lock().unwrap();

        let rows_changed = connection.execute(
            "UPDATE category SET name = ?1, color = ?2, icon = ?3
             WHERE id = ?4 AND user_id = ?5",
            (
                update.name.as_ref(),
                update.color.as_ref(),
                &update.icon,
                category_id,
                user_id.as_i64(),
            ),
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        select_category(&connection, user_id, category_id)
    }

    /// Delete a category that no transaction references.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the category does not exist or belongs to
    ///   another user,
    /// - [Error::CategoryInUse] if any of the user's transactions still
    ///   reference the category (nothing is deleted in this case),
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, user_id: UserID, category_id: DatabaseID) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();

        // Ensure the category exists before reporting a dependency error.
        select_category(&connection, user_id, category_id)?;

        let reference_count = connection.query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1 AND category_id = ?2",
            (user_id.as_i64(), category_id),
            |row| row.get::<_, i64>(0),
        )? as usize;

        if reference_count > 0 {
            return Err(Error::CategoryInUse(reference_count));
        }

        connection.execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )?;

        Ok(())
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    type TEXT NOT NULL,
                    color TEXT NOT NULL,
                    icon TEXT,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                    UNIQUE(user_id, name, type)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserID::new(row.get(offset + 1)?);

        let raw_name: String = row.get(offset + 2)?;
        let name = CategoryName::new_unchecked(&raw_name);

        let category_type = row.get(offset + 3)?;

        let raw_color: String = row.get(offset + 4)?;
        let color = HexColor::new_unchecked(&raw_color);

        let icon = row.get(offset + 5)?;
        let created_at = row.get(offset + 6)?;

        Ok(Category::new(
            id,
            user_id,
            name,
            category_type,
            color,
            icon,
            created_at,
        ))
    }
}

#[cfg(test)]
mod sqlite_category_store_tests {
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
            CategoryName, CategoryUpdate, HexColor, NewCategory, NewUser, PasswordHash,
            TransactionData, TransactionType, UserID,
        },
        stores::{CategoryStore, TransactionStore, UserStore},
    };

    use super::SQLiteCategoryStore;

    fn get_store_and_user() -> (SQLiteCategoryStore, UserID) {
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

        (SQLiteCategoryStore::new(connection), user.id())
    }

    fn new_category(user_id: UserID, name: &str) -> NewCategory {
        NewCategory {
            user_id,
            name: CategoryName::new_unchecked(name),
            category_type: TransactionType::Expense,
            color: HexColor::default(),
            icon: Some("fas fa-tag".to_string()),
        }
    }

    #[test]
    fn create_succeeds() {
        let (mut store, user_id) = get_store_and_user();

        let category = store.create(new_category(user_id, "Groceries")).unwrap();

        assert_eq!(category.name().as_ref(), "Groceries");
        assert_eq!(category.category_type(), TransactionType::Expense);
        assert_eq!(category.user_id(), user_id);
    }

    #[test]
    fn create_fails_on_duplicate_name_and_type() {
        let (mut store, user_id) = get_store_and_user();
        store.create(new_category(user_id, "Groceries")).unwrap();

        let result = store.create(new_category(user_id, "Groceries"));

        assert_eq!(result, Err(Error::DuplicateCategory));
    }

    #[test]
    fn create_allows_same_name_for_other_type() {
        let (mut store, user_id) = get_store_and_user();
        store.create(new_category(user_id, "Groceries")).unwrap();

        let mut income_category = new_category(user_id, "Groceries");
        income_category.category_type = TransactionType::Income;

        assert!(store.create(income_category).is_ok());
    }

    #[test]
    fn get_fails_on_another_users_category() {
        let (mut store, user_id) = get_store_and_user();
        let category = store.create(new_category(user_id, "Groceries")).unwrap();

        let result = store.get(UserID::new(user_id.as_i64() + 1), category.id());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_for_user_orders_by_name_and_filters_by_type() {
        let (store, user_id) = get_store_and_user();

        // The user already has the 14 seeded default categories.
        let expense_categories = store
            .get_for_user(user_id, Some(TransactionType::Expense))
            .unwrap();

        assert_eq!(expense_categories.len(), 9);
        assert!(
            expense_categories
                .iter()
                .all(|category| category.category_type() == TransactionType::Expense)
        );

        let names: Vec<&str> = expense_categories
            .iter()
            .map(|category| category.name().as_ref())
            .collect();
        let mut sorted_names = names.clone();
        sorted_names.sort();
        assert_eq!(names, sorted_names);
    }

    #[test]
    fn update_replaces_name_color_and_icon() {
        let (mut store, user_id) = get_store_and_user();
        let category = store.create(new_category(user_id, "Groceries")).unwrap();

        let updated = store
            .update(
                user_id,
                category.id(),
                CategoryUpdate {
                    name: CategoryName::new_unchecked("Eating Out"),
                    color: HexColor::new_unchecked("#123abc"),
                    icon: None,
                },
            )
            .unwrap();

        assert_eq!(updated.name().as_ref(), "Eating Out");
        assert_eq!(updated.color().as_ref(), "#123abc");
        assert_eq!(updated.icon(), None);
    }

    #[test]
    fn update_fails_on_duplicate_name() {
        let (mut store, user_id) = get_store_and_user();
        store.create(new_category(user_id, "Groceries")).unwrap();
        let category = store.create(new_category(user_id, "Takeaways")).unwrap();

        let result = store.update(
            user_id,
            category.id(),
            CategoryUpdate {
                name: CategoryName::new_unchecked("Groceries"),
                color: HexColor::default(),
                icon: None,
            },
        );

        assert_eq!(result, Err(Error::DuplicateCategory));
    }

    #[test]
    fn delete_removes_unreferenced_category() {
        let (mut store, user_id) = get_store_and_user();
        let category = store.create(new_category(user_id, "Groceries")).unwrap();

        store.delete(user_id, category.id()).unwrap();

        assert_eq!(store.get(user_id, category.id()), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_while_transactions_reference_the_category() {
        let (mut store, user_id) = get_store_and_user();
        let category = store.create(new_category(user_id, "Groceries")).unwrap();

        let mut transaction_store =
            crate::stores::sqlite::SQLiteTransactionStore::new(store.connection.clone());
        transaction_store
            .create(
                user_id,
                TransactionData {
                    description: "Weekly shop".to_string(),
                    amount: 42.0,
                    transaction_type: TransactionType::Expense,
                    category_id: category.id(),
                    date: date!(2026 - 08 - 01),
                },
            )
            .unwrap();

        let result = store.delete(user_id, category.id());

        assert_eq!(result, Err(Error::CategoryInUse(1)));
        // The category must still exist afterwards.
        assert!(store.get(user_id, category.id()).is_ok());
    }
}
