//! Defines the transaction store trait.

use crate::{
    Error,
    models::{DatabaseID, Transaction, TransactionData, UserID},
};

/// Handles the creation and retrieval of transactions.
///
/// Every method is scoped to an owning user: a transaction that exists but
/// belongs to another user behaves as if it did not exist.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCategory] if `data.category_id` does not
    /// refer to one of the user's categories.
    fn create(&mut self, user_id: UserID, data: TransactionData) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the transaction does not exist or
    /// belongs to another user.
    fn get(&self, user_id: UserID, transaction_id: DatabaseID) -> Result<Transaction, Error>;

    /// Retrieve all of a user's transactions, most recent first (date, then
    /// creation time).
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error>;

    /// Retrieve up to `limit` of a user's most recent transactions.
    fn get_recent(&self, user_id: UserID, limit: u64) -> Result<Vec<Transaction>, Error>;

    /// Replace every field of an existing transaction.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the transaction does not exist or
    /// belongs to another user, and an [Error::InvalidCategory] if the new
    /// category ID is not valid.
    fn update(
        &mut self,
        user_id: UserID,
        transaction_id: DatabaseID,
        data: TransactionData,
    ) -> Result<Transaction, Error>;

    /// Delete a transaction.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the transaction does not exist or
    /// belongs to another user.
    fn delete(&mut self, user_id: UserID, transaction_id: DatabaseID) -> Result<(), Error>;

    /// Delete several transactions at once, returning how many were deleted.
    ///
    /// Ownership of every ID is verified before anything is deleted.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `transaction_ids` is empty or any ID
    /// is missing or owned by another user.
    fn delete_many(
        &mut self,
        user_id: UserID,
        transaction_ids: &[DatabaseID],
    ) -> Result<usize, Error>;
}
