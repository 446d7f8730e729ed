//! Defines the user store trait.

use email_address::EmailAddress;

use crate::{
    Error,
    models::{NewUser, PasswordHash, ProfileUpdate, User, UserID},
};

/// Handles the creation and retrieval of users.
pub trait UserStore {
    /// Create a new user.
    ///
    /// Registration seeds the user's default settings and default categories
    /// together with the user row as one atomic unit: either all three exist
    /// afterwards or none do.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DuplicateEmail] if a user is already registered
    /// with the email address.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error>;

    /// Retrieve a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if no user has the ID.
    fn get(&self, user_id: UserID) -> Result<User, Error>;

    /// Retrieve a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if no user has the email address.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Update a user's name and/or email. Absent fields keep their current
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DuplicateEmail] if the new email address belongs to
    /// another user.
    fn update_profile(&mut self, user_id: UserID, update: ProfileUpdate) -> Result<User, Error>;

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if no user has the ID.
    fn update_password(&mut self, user_id: UserID, password_hash: PasswordHash)
    -> Result<(), Error>;
}
