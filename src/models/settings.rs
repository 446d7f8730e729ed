//! Defines the per-user settings that control spending limits and dashboard
//! behaviour.

use serde::{Deserialize, Serialize};

use crate::{Error, models::UserID};

/// The alert threshold assigned when settings are created lazily.
pub const DEFAULT_ALERT_THRESHOLD: u8 = 80;

/// The items-per-page preference assigned when settings are created lazily.
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 25;

/// A user's application settings.
///
/// Each user has exactly one settings row, created lazily with defaults the
/// first time it is accessed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSettings {
    user_id: UserID,
    monthly_limit: f64,
    daily_limit: f64,
    alert_threshold: u8,
    items_per_page: u32,
    notifications: bool,
    auto_save: bool,
}

impl UserSettings {
    /// Create a settings instance from its stored fields.
    pub fn new(
        user_id: UserID,
        monthly_limit: f64,
        daily_limit: f64,
        alert_threshold: u8,
        items_per_page: u32,
        notifications: bool,
        auto_save: bool,
    ) -> Self {
        Self {
            user_id,
            monthly_limit,
            daily_limit,
            alert_threshold,
            items_per_page,
            notifications,
            auto_save,
        }
    }

    /// The default settings assigned to a user on first access.
    pub fn defaults_for(user_id: UserID) -> Self {
        Self {
            user_id,
            monthly_limit: 0.0,
            daily_limit: 0.0,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            notifications: true,
            auto_save: true,
        }
    }

    /// The ID of the user the settings belong to.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The monthly spending limit. Zero means no limit.
    pub fn monthly_limit(&self) -> f64 {
        self.monthly_limit
    }

    /// The daily spending limit. Zero means no limit.
    pub fn daily_limit(&self) -> f64 {
        self.daily_limit
    }

    /// The percentage of a limit at which the user is alerted (0-100).
    pub fn alert_threshold(&self) -> u8 {
        self.alert_threshold
    }

    /// The user's preferred page size for transaction lists.
    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    /// Whether the user wants notifications.
    pub fn notifications(&self) -> bool {
        self.notifications
    }

    /// Whether forms should save automatically.
    pub fn auto_save(&self) -> bool {
        self.auto_save
    }
}

/// A partial update of a user's settings.
///
/// Fields that are `None` keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    /// The new monthly spending limit.
    pub monthly_limit: Option<f64>,
    /// The new daily spending limit.
    pub daily_limit: Option<f64>,
    /// The new alert threshold percentage.
    pub alert_threshold: Option<u8>,
    /// The new items-per-page preference.
    pub items_per_page: Option<u32>,
    /// Whether the user wants notifications.
    pub notifications: Option<bool>,
    /// Whether forms should save automatically.
    pub auto_save: Option<bool>,
}

impl SettingsUpdate {
    /// Check that every provided field is within its allowed range.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] listing every field that is out of
    /// range.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();

        if let Some(monthly_limit) = self.monthly_limit
            && monthly_limit < 0.0
        {
            errors.push("monthly limit must be zero or positive".to_string());
        }

        if let Some(daily_limit) = self.daily_limit
            && daily_limit < 0.0
        {
            errors.push("daily limit must be zero or positive".to_string());
        }

        if let Some(alert_threshold) = self.alert_threshold
            && alert_threshold > 100
        {
            errors.push("alert threshold must be between 0 and 100".to_string());
        }

        if let Some(items_per_page) = self.items_per_page
            && !(5..=100).contains(&items_per_page)
        {
            errors.push("items per page must be between 5 and 100".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}
