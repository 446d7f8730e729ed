//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, CategoryUpdate, DatabaseID, NewCategory, TransactionType, UserID},
};

/// Handles the creation and retrieval of categories.
pub trait CategoryStore {
    /// Create a new category in the store.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DuplicateCategory] if the user already has a
    /// category with the same name and type.
    fn create(&mut self, new_category: NewCategory) -> Result<Category, Error>;

    /// Retrieve a category from the store.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the category does not exist or belongs
    /// to another user.
    fn get(&self, user_id: UserID, category_id: DatabaseID) -> Result<Category, Error>;

    /// Retrieve a user's categories ordered by name, optionally restricted to
    /// one type.
    fn get_for_user(
        &self,
        user_id: UserID,
        category_type: Option<TransactionType>,
    ) -> Result<Vec<Category>, Error>;

    /// Update a category's name, color and icon.
    ///
    /// The type is fixed at creation.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the category does not exist or belongs
    /// to another user, and an [Error::DuplicateCategory] if the new name
    /// collides with another category of the same type.
    fn update(
        &mut self,
        user_id: UserID,
        category_id: DatabaseID,
        update: CategoryUpdate,
    ) -> Result<Category, Error>;

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the category does not exist or belongs
    /// to another user, and an [Error::CategoryInUse] if any transaction
    /// still references it. The category is not deleted in the latter case.
    fn delete(&mut self, user_id: UserID, category_id: DatabaseID) -> Result<(), Error>;
}
