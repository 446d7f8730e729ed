//! Defines transactions, the income and expense records at the heart of the
//! application.

use std::str::FromStr;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::models::{DatabaseID, UserID};

/// The calendar-day format used for transaction dates, e.g. `2026-08-07`.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Whether a transaction records money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The lowercase string form used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// This is a read model: the category display name is resolved from the
/// referenced category when the transaction is loaded, so renaming a category
/// is reflected in historical transactions.
///
/// New instances should be created through
/// [TransactionStore::create](crate::stores::TransactionStore::create).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: DatabaseID,
    user_id: UserID,
    description: String,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category_id: DatabaseID,
    category: String,
    date: Date,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Note that this does *not* add the transaction to the application
    /// database.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DatabaseID,
        user_id: UserID,
        description: String,
        amount: f64,
        transaction_type: TransactionType,
        category_id: DatabaseID,
        category: String,
        date: Date,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
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
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that owns the transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// The free-text description of the transaction.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The amount of money spent or earned. Always positive; the sign of the
    /// event is carried by [Transaction::transaction_type].
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether the transaction records income or an expense.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// The ID of the category the transaction belongs to.
    pub fn category_id(&self) -> DatabaseID {
        self.category_id
    }

    /// The resolved display name of the transaction's category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The calendar day the transaction happened on.
    pub fn date(&self) -> Date {
        self.date
    }

    /// When the transaction record was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// When the transaction record was last modified.
    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

/// The validated field set for creating or fully replacing a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionData {
    /// The free-text description of the transaction.
    pub description: String,
    /// The amount of money spent or earned, strictly positive.
    pub amount: f64,
    /// Whether the transaction records income or an expense.
    pub transaction_type: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: DatabaseID,
    /// The calendar day the transaction happened on.
    pub date: Date,
}

#[cfg(test)]
mod transaction_type_tests {
    use super::TransactionType;

    #[test]
    fn round_trips_through_string_form() {
        for transaction_type in [TransactionType::Income, TransactionType::Expense] {
            let parsed: TransactionType = transaction_type.as_str().parse().unwrap();
            assert_eq!(parsed, transaction_type);
        }
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!("transfer".parse::<TransactionType>().is_err());
        assert!("Income".parse::<TransactionType>().is_err());
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&TransactionType::Income).unwrap();
        assert_eq!(json, "\"income\"");
    }
}

#[cfg(test)]
mod date_format_tests {
    use time::{Date, macros::date};

    use super::DATE_FORMAT;

    #[test]
    fn parses_iso_calendar_days() {
        let parsed = Date::parse("2026-08-07", DATE_FORMAT).unwrap();
        assert_eq!(parsed, date!(2026 - 08 - 07));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Date::parse("07/08/2026", DATE_FORMAT).is_err());
        assert!(Date::parse("2026-13-01", DATE_FORMAT).is_err());
        assert!(Date::parse("not a date", DATE_FORMAT).is_err());
    }
}
