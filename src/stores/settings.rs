//! Defines the settings store trait.

use crate::{
    Error,
    models::{SettingsUpdate, UserID, UserSettings},
};

/// Handles the retrieval and update of per-user settings.
pub trait SettingsStore {
    /// Retrieve a user's settings, creating them with defaults on first
    /// access.
    fn get_or_create(&mut self, user_id: UserID) -> Result<UserSettings, Error>;

    /// Apply a partial settings update. Absent fields keep their current
    /// value.
    ///
    /// Creates the settings row with defaults first if the user has none.
    fn update(&mut self, user_id: UserID, update: SettingsUpdate) -> Result<UserSettings, Error>;
}
