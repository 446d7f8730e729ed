//! Reduces a filtered transaction collection into the summary numbers shown
//! on the dashboard.
//!
//! Every function here is a pure pass over an in-memory snapshot: no wall
//! clock (the reference day is always a parameter) and no errors (empty input
//! produces zero-valued results). Sums accumulate as `f64`; rounding is left
//! to presentation.

use serde::Serialize;
use time::{Date, Duration, Month};

use crate::models::{Transaction, TransactionType};

/// The number of categories shown in the dashboard ranking.
pub const TOP_CATEGORY_COUNT: usize = 6;

/// Per-category sub-totals within a [FinancialSummary].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    /// The resolved category display name.
    pub name: String,
    /// The summed income recorded under the category.
    pub income: f64,
    /// The summed expenses recorded under the category.
    pub expense: f64,
    /// The sum of all amounts recorded under the category.
    pub total: f64,
}

/// The reduced view of a filtered transaction set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// The summed income.
    pub total_income: f64,
    /// The summed expenses.
    pub total_expense: f64,
    /// `total_income - total_expense`; may be negative.
    pub balance: f64,
    /// How many transactions were summed.
    pub transaction_count: usize,
    /// Per-category sub-totals, one entry per category, in the order the
    /// categories were first encountered.
    pub categories: Vec<CategorySummary>,
}

/// A category name paired with an accumulated amount, used for rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    /// The resolved category display name.
    pub name: String,
    /// The accumulated amount.
    pub amount: f64,
}

/// A category name paired with how often it was used, for usage rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryUsage {
    /// The resolved category display name.
    pub name: String,
    /// How many transactions use the category.
    pub count: usize,
    /// The sum of all amounts recorded under the category.
    pub total: f64,
}

/// One unit of a time-bucketed series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    /// The calendar-day (`2026-08-07`) or month (`August`) label.
    pub label: String,
    /// The summed income within the bucket.
    pub income: f64,
    /// The summed expenses within the bucket.
    pub expense: f64,
}

/// Percentage changes between two summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDeltas {
    /// The signed percentage change in total income.
    pub income_change: f64,
    /// The signed percentage change in total expenses.
    pub expense_change: f64,
    /// The signed percentage change in balance.
    pub balance_change: f64,
}

/// Reduce `transactions` into totals and per-category sub-totals.
///
/// A single pass accumulates income and expenses; the balance is their
/// difference and may be negative. Categories appear once each, in
/// first-encountered order.
pub fn summarize(transactions: &[Transaction]) -> FinancialSummary {
    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut categories: Vec<CategorySummary> = Vec::new();

    for transaction in transactions {
        let amount = transaction.amount();

        let index = match categories
            .iter()
            .position(|category| category.name == transaction.category())
        {
            Some(index) => index,
            None => {
                categories.push(CategorySummary {
                    name: transaction.category().to_string(),
                    income: 0.0,
                    expense: 0.0,
                    total: 0.0,
                });
                categories.len() - 1
            }
        };
        let entry = &mut categories[index];

        match transaction.transaction_type() {
            TransactionType::Income => {
                total_income += amount;
                entry.income += amount;
            }
            TransactionType::Expense => {
                total_expense += amount;
                entry.expense += amount;
            }
        }

        entry.total += amount;
    }

    FinancialSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count: transactions.len(),
        categories,
    }
}

/// Group the expense transactions by category, sum each group, and return the
/// `top_k` largest, in descending order.
///
/// The sort is stable, so categories with equal sums keep their
/// first-encountered order.
pub fn expense_ranking(transactions: &[Transaction], top_k: usize) -> Vec<CategoryAmount> {
    let mut totals: Vec<CategoryAmount> = Vec::new();

    for transaction in transactions {
        if transaction.transaction_type() != TransactionType::Expense {
            continue;
        }

        match totals
            .iter_mut()
            .find(|entry| entry.name == transaction.category())
        {
            Some(entry) => entry.amount += transaction.amount(),
            None => totals.push(CategoryAmount {
                name: transaction.category().to_string(),
                amount: transaction.amount(),
            }),
        }
    }

    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals.truncate(top_k);
    totals
}

/// Group the transactions by category and return the `top_k` most used, in
/// descending order of use.
pub fn usage_ranking(transactions: &[Transaction], top_k: usize) -> Vec<CategoryUsage> {
    let mut usage: Vec<CategoryUsage> = Vec::new();

    for transaction in transactions {
        match usage
            .iter_mut()
            .find(|entry| entry.name == transaction.category())
        {
            Some(entry) => {
                entry.count += 1;
                entry.total += transaction.amount();
            }
            None => usage.push(CategoryUsage {
                name: transaction.category().to_string(),
                count: 1,
                total: transaction.amount(),
            }),
        }
    }

    usage.sort_by(|a, b| b.count.cmp(&a.count));
    usage.truncate(top_k);
    usage
}

/// Produce one bucket per day for the `days`-day window ending on `today`,
/// oldest first.
///
/// Exactly `days` buckets are returned regardless of the transaction count; a
/// transaction contributes to the bucket whose calendar day equals its date.
pub fn daily_buckets(transactions: &[Transaction], days: i64, today: Date) -> Vec<PeriodBucket> {
    let mut buckets = Vec::new();

    for day_offset in (0..days).rev() {
        let date = today - Duration::days(day_offset);
        let mut income = 0.0;
        let mut expense = 0.0;

        for transaction in transactions {
            if transaction.date() != date {
                continue;
            }

            match transaction.transaction_type() {
                TransactionType::Income => income += transaction.amount(),
                TransactionType::Expense => expense += transaction.amount(),
            }
        }

        buckets.push(PeriodBucket {
            label: date.to_string(),
            income,
            expense,
        });
    }

    buckets
}

/// Produce the fixed twelve calendar-month buckets, January first.
///
/// A transaction contributes to the bucket matching its month regardless of
/// year; callers wanting year scoping must pre-filter by year.
pub fn monthly_buckets(transactions: &[Transaction]) -> Vec<PeriodBucket> {
    let mut buckets: Vec<PeriodBucket> = (1..=12u8)
        .map(|month| PeriodBucket {
            label: Month::try_from(month)
                .expect("month index is always 1-12")
                .to_string(),
            income: 0.0,
            expense: 0.0,
        })
        .collect();

    for transaction in transactions {
        let index = u8::from(transaction.date().month()) as usize - 1;

        match transaction.transaction_type() {
            TransactionType::Income => buckets[index].income += transaction.amount(),
            TransactionType::Expense => buckets[index].expense += transaction.amount(),
        }
    }

    buckets
}

/// The signed percentage change from `previous` to `current`.
///
/// When `previous` is zero the result is defined as 100 if `current` is
/// positive and 0 otherwise. The asymmetry avoids a division by zero and is
/// part of the documented contract.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }

    (current - previous) / previous * 100.0
}

/// Percentage changes between a current summary and the summary of the
/// immediately-preceding, equal-length window.
pub fn compare(current: &FinancialSummary, previous: &FinancialSummary) -> SummaryDeltas {
    SummaryDeltas {
        income_change: percentage_change(current.total_income, previous.total_income),
        expense_change: percentage_change(current.total_expense, previous.total_expense),
        balance_change: percentage_change(current.balance, previous.balance),
    }
}

/// The weekday on which the most money was spent, if any expenses exist.
///
/// Ties are broken in favour of the weekday encountered first.
pub fn top_spending_weekday(transactions: &[Transaction]) -> Option<String> {
    let mut totals: Vec<(String, f64)> = Vec::new();

    for transaction in transactions {
        if transaction.transaction_type() != TransactionType::Expense {
            continue;
        }

        let weekday = transaction.date().weekday().to_string();

        match totals.iter_mut().find(|(name, _)| *name == weekday) {
            Some((_, total)) => *total += transaction.amount(),
            None => totals.push((weekday, transaction.amount())),
        }
    }

    let mut best: Option<&(String, f64)> = None;

    for entry in &totals {
        match best {
            Some((_, best_total)) if entry.1 <= *best_total => {}
            _ => best = Some(entry),
        }
    }

    best.map(|(name, _)| name.clone())
}
