//! Defines categories, the user-owned labels that group transactions, along
//! with the validating newtypes for their names and colors.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, TransactionType, UserID},
};

/// The maximum number of characters allowed in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty or
    /// longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::Validation(vec![
                "category name is required".to_string(),
            ]));
        }

        if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Err(Error::Validation(vec![format!(
                "category name must be at most {MAX_CATEGORY_NAME_LENGTH} characters"
            )]));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if the non-empty invariant is violated it will cause incorrect
    /// behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The default color assigned to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#8b5cf6";

/// A color in `#RRGGBB` notation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexColor(String);

impl HexColor {
    /// Create a hex color from a string such as `#8b5cf6`.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if the string is not a
    /// `#` followed by exactly six hexadecimal digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let is_valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_valid {
            Ok(Self(color.to_string()))
        } else {
            Err(Error::Validation(vec![
                "color must be in hexadecimal format (#RRGGBB)".to_string(),
            ]))
        }
    }

    /// Create a hex color without validation.
    ///
    /// The caller should ensure the string is a `#` followed by six
    /// hexadecimal digits.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY_COLOR.to_string())
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out',
/// 'Wages'.
///
/// The combination of owner, name and type is unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    id: DatabaseID,
    user_id: UserID,
    name: CategoryName,
    #[serde(rename = "type")]
    category_type: TransactionType,
    color: HexColor,
    icon: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Category {
    /// Create a new category.
    ///
    /// Note that this does *not* add the category to the application database.
    pub fn new(
        id: DatabaseID,
        user_id: UserID,
        name: CategoryName,
        category_type: TransactionType,
        color: HexColor,
        icon: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            category_type,
            color,
            icon,
            created_at,
        }
    }

    /// The ID of the category.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that owns the category.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The name of the category.
    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    /// Whether the category labels income or expenses.
    pub fn category_type(&self) -> TransactionType {
        self.category_type
    }

    /// The display color of the category.
    pub fn color(&self) -> &HexColor {
        &self.color
    }

    /// The symbolic icon reference for the category, if any.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// When the category was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// The data for creating a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// The ID of the user that owns the category.
    pub user_id: UserID,
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category labels income or expenses.
    pub category_type: TransactionType,
    /// The display color of the category.
    pub color: HexColor,
    /// The symbolic icon reference for the category, if any.
    pub icon: Option<String>,
}

/// The data for updating an existing category.
///
/// The category type is fixed at creation and cannot change, because the
/// transactions referencing the category already have that type.
#[derive(Debug, Clone)]
pub struct CategoryUpdate {
    /// The new name of the category.
    pub name: CategoryName,
    /// The new display color of the category.
    pub color: HexColor,
    /// The new symbolic icon reference for the category, if any.
    pub icon: Option<String>,
}

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert!(matches!(category_name, Err(Error::Validation(_))));
    }

    #[test]
    fn new_fails_on_whitespace_only_string() {
        let category_name = CategoryName::new("   ");

        assert!(matches!(category_name, Err(Error::Validation(_))));
    }

    #[test]
    fn new_fails_on_overly_long_string() {
        let category_name = CategoryName::new(&"a".repeat(101));

        assert!(matches!(category_name, Err(Error::Validation(_))));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let category_name = CategoryName::new("🔥");

        assert!(category_name.is_ok());
    }
}

#[cfg(test)]
mod hex_color_tests {
    use crate::Error;

    use super::{DEFAULT_CATEGORY_COLOR, HexColor};

    #[test]
    fn new_accepts_six_digit_hex() {
        assert!(HexColor::new("#10b981").is_ok());
        assert!(HexColor::new("#FFFFFF").is_ok());
    }

    #[test]
    fn new_rejects_malformed_colors() {
        for color in ["10b981", "#10b98", "#10b9811", "#10b98g", "", "#"] {
            assert!(
                matches!(HexColor::new(color), Err(Error::Validation(_))),
                "expected {color:?} to be rejected"
            );
        }
    }

    #[test]
    fn default_is_the_documented_color() {
        assert_eq!(HexColor::default().as_ref(), DEFAULT_CATEGORY_COLOR);
    }
}
