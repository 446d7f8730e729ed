//! Defines the user of the application and the views used to create and
//! display one.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::{DatabaseID, PasswordHash};

/// A newtype wrapper for user IDs to prevent mixing up user IDs with other
/// database IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(DatabaseID);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: DatabaseID) -> Self {
        Self(id)
    }

    /// The underlying integer ID.
    pub fn as_i64(&self) -> DatabaseID {
        self.0
    }
}

/// A registered user of the application.
///
/// New instances should be created through
/// [UserStore::create](crate::stores::UserStore::create).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    name: String,
    email: EmailAddress,
    password_hash: PasswordHash,
    created_at: OffsetDateTime,
}

impl User {
    /// Create a new user.
    ///
    /// Note that this does *not* add the user to the application database.
    pub fn new(
        id: UserID,
        name: String,
        email: EmailAddress,
        password_hash: PasswordHash,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            created_at,
        }
    }

    /// The ID of the user.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The display name of the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The email address the user registered with.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The user's salted and hashed password.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// When the user registered.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// The view of the user that is safe to send to clients.
    ///
    /// The password hash is deliberately not part of this view.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// The client-facing view of a [User].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The ID of the user.
    pub id: UserID,
    /// The display name of the user.
    pub name: String,
    /// The email address the user registered with.
    pub email: EmailAddress,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The display name of the user.
    pub name: String,
    /// The email address the user registered with.
    pub email: EmailAddress,
    /// The user's salted and hashed password.
    pub password_hash: PasswordHash,
}

/// A partial update of a user's profile.
///
/// Fields that are `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// The new display name, if it should change.
    pub name: Option<String>,
    /// The new email address, if it should change.
    pub email: Option<EmailAddress>,
}

#[cfg(test)]
mod user_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use time::OffsetDateTime;

    use crate::models::PasswordHash;

    use super::{User, UserID};

    #[test]
    fn profile_does_not_expose_password_hash() {
        let user = User::new(
            UserID::new(1),
            "Ada".to_string(),
            EmailAddress::from_str("ada@example.com").unwrap(),
            PasswordHash::new_unchecked("definitelyapasswordhash"),
            OffsetDateTime::UNIX_EPOCH,
        );

        let profile = user.profile();
        let json = serde_json::to_string(&profile).unwrap();

        assert!(!json.contains("definitelyapasswordhash"));
        assert!(json.contains("ada@example.com"));
    }
}
