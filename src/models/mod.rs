//! This module defines the domain data types.

mod category;
mod password;
mod settings;
mod transaction;
mod user;

pub use category::{Category, CategoryName, CategoryUpdate, HexColor, NewCategory};
pub use password::{PasswordHash, ValidatedPassword};
pub use settings::{SettingsUpdate, UserSettings};
pub use transaction::{DATE_FORMAT, Transaction, TransactionData, TransactionType};
pub use user::{NewUser, ProfileUpdate, User, UserID, UserProfile};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
