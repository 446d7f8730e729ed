//! Orders transaction collections for display.
//!
//! All sorts are stable, so transactions that compare equal keep their
//! original insertion order. This makes ties within date and amount sorts
//! deterministic.

use crate::models::Transaction;

/// The supported transaction orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recent first. The default ordering.
    #[default]
    DateDescending,
    /// Oldest first.
    DateAscending,
    /// Largest amount first.
    AmountDescending,
    /// Smallest amount first.
    AmountAscending,
    /// Description in lexicographic order.
    DescriptionAscending,
    /// Description in reverse lexicographic order.
    DescriptionDescending,
}

impl SortKey {
    /// Parse a sort token such as `date-desc` or `amount-asc`.
    ///
    /// Unknown tokens yield `None`; callers fall back to the default.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "date-desc" => Some(Self::DateDescending),
            "date-asc" => Some(Self::DateAscending),
            "amount-desc" => Some(Self::AmountDescending),
            "amount-asc" => Some(Self::AmountAscending),
            "description-asc" => Some(Self::DescriptionAscending),
            "description-desc" => Some(Self::DescriptionDescending),
            _ => None,
        }
    }
}

/// Sort `transactions` in place by `key` using a stable sort.
pub fn sort_transactions(transactions: &mut [Transaction], key: SortKey) {
    match key {
        SortKey::DateDescending => transactions.sort_by(|a, b| b.date().cmp(&a.date())),
        SortKey::DateAscending => transactions.sort_by(|a, b| a.date().cmp(&b.date())),
        SortKey::AmountDescending => {
            transactions.sort_by(|a, b| b.amount().total_cmp(&a.amount()))
        }
        SortKey::AmountAscending => transactions.sort_by(|a, b| a.amount().total_cmp(&b.amount())),
        SortKey::DescriptionAscending => {
            transactions.sort_by(|a, b| a.description().cmp(b.description()))
        }
        SortKey::DescriptionDescending => {
            transactions.sort_by(|a, b| b.description().cmp(a.description()))
        }
    }
}

#[cfg(test)]
mod sort_tests {
    use time::{Date, OffsetDateTime, macros::date};

    use crate::models::{Transaction, TransactionType, UserID};

    use super::{SortKey, sort_transactions};

    fn transaction(id: i64, description: &str, amount: f64, date: Date) -> Transaction {
        Transaction::new(
            id,
            UserID::new(1),
            description.to_string(),
            amount,
            TransactionType::Expense,
            1,
            "Food".to_string(),
            date,
            OffsetDateTime::UNIX_EPOCH,
            OffsetDateTime::UNIX_EPOCH,
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction(1, "beta", 20.0, date!(2026 - 08 - 05)),
            transaction(2, "alpha", 10.0, date!(2026 - 08 - 07)),
            transaction(3, "gamma", 30.0, date!(2026 - 08 - 01)),
        ]
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(Transaction::id).collect()
    }

    #[test]
    fn sorts_by_date_descending() {
        let mut transactions = sample();

        sort_transactions(&mut transactions, SortKey::DateDescending);

        assert_eq!(ids(&transactions), vec![2, 1, 3]);
    }

    #[test]
    fn sorts_by_date_ascending() {
        let mut transactions = sample();

        sort_transactions(&mut transactions, SortKey::DateAscending);

        assert_eq!(ids(&transactions), vec![3, 1, 2]);
    }

    #[test]
    fn sorts_by_amount() {
        let mut transactions = sample();
        sort_transactions(&mut transactions, SortKey::AmountDescending);
        assert_eq!(ids(&transactions), vec![3, 1, 2]);

        sort_transactions(&mut transactions, SortKey::AmountAscending);
        assert_eq!(ids(&transactions), vec![2, 1, 3]);
    }

    #[test]
    fn sorts_by_description() {
        let mut transactions = sample();
        sort_transactions(&mut transactions, SortKey::DescriptionAscending);
        assert_eq!(ids(&transactions), vec![2, 1, 3]);

        sort_transactions(&mut transactions, SortKey::DescriptionDescending);
        assert_eq!(ids(&transactions), vec![3, 1, 2]);
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let mut transactions = vec![
            transaction(1, "first", 1.0, date!(2026 - 08 - 07)),
            transaction(2, "second", 2.0, date!(2026 - 08 - 07)),
            transaction(3, "third", 3.0, date!(2026 - 08 - 07)),
        ];

        sort_transactions(&mut transactions, SortKey::DateDescending);

        assert_eq!(ids(&transactions), vec![1, 2, 3]);
    }

    #[test]
    fn parse_recognises_the_documented_tokens() {
        assert_eq!(SortKey::parse("date-desc"), Some(SortKey::DateDescending));
        assert_eq!(SortKey::parse("amount-asc"), Some(SortKey::AmountAscending));
        assert_eq!(
            SortKey::parse("description-desc"),
            Some(SortKey::DescriptionDescending)
        );
        assert_eq!(SortKey::parse("newest"), None);
    }
}
