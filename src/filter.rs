//! The filter engine: reduces a user's transaction collection to the subset
//! matching a set of criteria.
//!
//! All provided criteria are ANDed together and absent criteria impose no
//! constraint. Parsing of filter inputs is deliberately permissive: malformed
//! dates and amount tokens are treated as "no constraint" rather than raised
//! as errors, matching the behaviour the product shipped with.

use time::{Date, Duration};

use crate::models::{DATE_FORMAT, Transaction, TransactionType};

/// The date window a filter applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Period {
    /// The relative window of the last `N` days ending on the reference day,
    /// i.e. `[today - N, today]`.
    LastDays(i64),
    /// An explicit window with optional open ends, both inclusive.
    Range {
        /// The first day included in the window.
        start: Option<Date>,
        /// The last day included in the window.
        end: Option<Date>,
    },
}

impl Period {
    /// Resolve the period into inclusive date bounds relative to `today`.
    fn bounds(&self, today: Date) -> (Option<Date>, Option<Date>) {
        match self {
            Period::LastDays(days) => (Some(today - Duration::days(*days)), Some(today)),
            Period::Range { start, end } => (*start, *end),
        }
    }
}

/// An inclusive amount window.
///
/// `max` may be [f64::INFINITY] for unbounded ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    /// The smallest amount included in the range.
    pub min: f64,
    /// The largest amount included in the range.
    pub max: f64,
}

impl AmountRange {
    /// Parse an amount range token such as `0-50`, `500-1000` or `1000+`.
    ///
    /// The token is split on `-`; a `+` (or absent) upper bound means
    /// unbounded. Returns `None` for malformed tokens or when the bounds are
    /// inverted, which callers treat as "no constraint".
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.splitn(2, '-');

        let min_token = parts.next()?.trim();
        let min: f64 = min_token.trim_end_matches('+').parse().ok()?;

        let max = match parts.next().map(str::trim) {
            None | Some("") | Some("+") => f64::INFINITY,
            Some(max_token) => max_token.parse().ok()?,
        };

        if min > max {
            return None;
        }

        Some(Self { min, max })
    }

    /// Whether `amount` falls inside the range.
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// Parse a `YYYY-MM-DD` filter input permissively.
///
/// Malformed dates yield `None`, which imposes no constraint.
pub fn parse_filter_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), DATE_FORMAT).ok()
}

/// The criteria used to derive a filtered transaction subset.
///
/// Ephemeral: built per request, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// The date window transactions must fall into.
    pub period: Option<Period>,
    /// The exact category name transactions must have.
    pub category: Option<String>,
    /// The transaction type transactions must have.
    pub transaction_type: Option<TransactionType>,
    /// Free text matched case-insensitively against the description or the
    /// category name.
    pub search: Option<String>,
    /// The amount window transactions must fall into.
    pub amount: Option<AmountRange>,
}

impl FilterCriteria {
    /// Whether `transaction` satisfies every provided criterion.
    ///
    /// `today` is the reference day used to resolve relative periods.
    pub fn matches(&self, transaction: &Transaction, today: Date) -> bool {
        if let Some(period) = &self.period {
            let (start, end) = period.bounds(today);

            if let Some(start) = start
                && transaction.date() < start
            {
                return false;
            }

            if let Some(end) = end
                && transaction.date() > end
            {
                return false;
            }
        }

        if let Some(category) = &self.category
            && transaction.category() != category
        {
            return false;
        }

        if let Some(transaction_type) = self.transaction_type
            && transaction.transaction_type() != transaction_type
        {
            return false;
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_description = transaction.description().to_lowercase().contains(&needle);
            let in_category = transaction.category().to_lowercase().contains(&needle);

            if !in_description && !in_category {
                return false;
            }
        }

        if let Some(amount) = &self.amount
            && !amount.contains(transaction.amount())
        {
            return false;
        }

        true
    }
}

/// Reduce `transactions` to the subset matching `criteria`, preserving the
/// original relative order.
pub fn apply(
    mut transactions: Vec<Transaction>,
    criteria: &FilterCriteria,
    today: Date,
) -> Vec<Transaction> {
    transactions.retain(|transaction| criteria.matches(transaction, today));
    transactions
}


#[cfg(test)]
mod filter_tests {
    use time::{Date, OffsetDateTime, macros::date};

    use crate::models::{DatabaseID, Transaction, TransactionType, UserID};

    use super::{AmountRange, FilterCriteria, Period, apply, parse_filter_date};

    const TODAY: Date = date!(2026 - 08 - 07);

    fn transaction(
        id: DatabaseID,
        description: &str,
        amount: f64,
        transaction_type: TransactionType,
        category: &str,
        date: Date,
    ) -> Transaction {
        Transaction::new(
            id,
            UserID::new(1),
            description.to_string(),
            amount,
            transaction_type,
            1,
            category.to_string(),
            date,
            OffsetDateTime::UNIX_EPOCH,
            OffsetDateTime::UNIX_EPOCH,
        )
    }

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            transaction(
                1,
                "Weekly groceries",
                120.0,
                TransactionType::Expense,
                "Food",
                TODAY,
            ),
            transaction(
                2,
                "Monthly salary",
                2500.0,
                TransactionType::Income,
                "Salary",
                date!(2026 - 08 - 01),
            ),
            transaction(
                3,
                "Bus ticket",
                3.5,
                TransactionType::Expense,
                "Transport",
                date!(2026 - 06 - 15),
            ),
            transaction(
                4,
                "Dinner out",
                64.0,
                TransactionType::Expense,
                "Food",
                date!(2026 - 07 - 30),
            ),
        ]
    }

    #[test]
    fn no_criteria_returns_everything_in_order() {
        let transactions = sample_transactions();

        let filtered = apply(transactions.clone(), &FilterCriteria::default(), TODAY);

        assert_eq!(filtered, transactions);
    }

    #[test]
    fn filtered_set_is_an_order_preserving_subset() {
        let transactions = sample_transactions();
        let criteria = FilterCriteria {
            transaction_type: Some(TransactionType::Expense),
            ..Default::default()
        };

        let filtered = apply(transactions.clone(), &criteria, TODAY);

        let ids: Vec<_> = filtered.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(
            filtered
                .iter()
                .all(|t| t.transaction_type() == TransactionType::Expense)
        );
    }

    #[test]
    fn last_days_period_keeps_the_inclusive_window() {
        let criteria = FilterCriteria {
            period: Some(Period::LastDays(30)),
            ..Default::default()
        };

        let filtered = apply(sample_transactions(), &criteria, TODAY);

        // The bus ticket from June falls outside the 30-day window.
        let ids: Vec<_> = filtered.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn explicit_range_is_used_literally() {
        let criteria = FilterCriteria {
            period: Some(Period::Range {
                start: Some(date!(2026 - 06 - 01)),
                end: Some(date!(2026 - 06 - 30)),
            }),
            ..Default::default()
        };

        let filtered = apply(sample_transactions(), &criteria, TODAY);

        let ids: Vec<_> = filtered.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn open_ended_range_constrains_one_side_only() {
        let criteria = FilterCriteria {
            period: Some(Period::Range {
                start: Some(date!(2026 - 07 - 01)),
                end: None,
            }),
            ..Default::default()
        };

        let filtered = apply(sample_transactions(), &criteria, TODAY);

        let ids: Vec<_> = filtered.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn search_matches_description_case_insensitively() {
        let criteria = FilterCriteria {
            search: Some("GROCERIES".to_string()),
            ..Default::default()
        };

        let filtered = apply(sample_transactions(), &criteria, TODAY);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id(), 1);
    }

    #[test]
    fn search_matches_category_name() {
        let criteria = FilterCriteria {
            search: Some("food".to_string()),
            ..Default::default()
        };

        let filtered = apply(sample_transactions(), &criteria, TODAY);

        let ids: Vec<_> = filtered.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn category_filter_requires_exact_name() {
        let criteria = FilterCriteria {
            category: Some("Food".to_string()),
            ..Default::default()
        };

        let filtered = apply(sample_transactions(), &criteria, TODAY);

        let ids: Vec<_> = filtered.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn combined_criteria_are_anded() {
        let criteria = FilterCriteria {
            period: Some(Period::LastDays(30)),
            category: Some("Food".to_string()),
            transaction_type: Some(TransactionType::Expense),
            amount: AmountRange::parse("100-+"),
            ..Default::default()
        };

        let transactions = sample_transactions();
        let filtered = apply(transactions.clone(), &criteria, TODAY);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id(), 1);
        assert!(filtered.iter().all(|t| criteria.matches(t, TODAY)));
        assert!(filtered.iter().all(|t| transactions.contains(t)));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let criteria = FilterCriteria {
            period: Some(Period::LastDays(7)),
            ..Default::default()
        };

        assert!(apply(Vec::new(), &criteria, TODAY).is_empty());
    }

    #[test]
    fn malformed_filter_dates_impose_no_constraint() {
        assert_eq!(parse_filter_date("not-a-date"), None);
        assert_eq!(parse_filter_date("2026-13-40"), None);
        assert_eq!(parse_filter_date("2026-08-07"), Some(TODAY));

        // A range built from two malformed dates leaves the set untouched.
        let criteria = FilterCriteria {
            period: Some(Period::Range {
                start: parse_filter_date("garbage"),
                end: parse_filter_date("more garbage"),
            }),
            ..Default::default()
        };

        let transactions = sample_transactions();
        assert_eq!(apply(transactions.clone(), &criteria, TODAY), transactions);
    }
}
