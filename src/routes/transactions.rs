//! Handlers for transaction CRUD, listing with filters, and statistics.
//!
//! The list and stats endpoints share one pipeline: load the user's
//! transactions through the store, reduce them with the filter engine, then
//! sort/paginate or aggregate. Every aggregation takes the request's
//! reference day explicitly so the computation itself stays deterministic.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    AppState, Error, aggregate,
    aggregate::{CategoryAmount, FinancialSummary, PeriodBucket, SummaryDeltas, TOP_CATEGORY_COUNT},
    auth::Claims,
    filter::{self, AmountRange, FilterCriteria, Period, parse_filter_date},
    models::{DATE_FORMAT, DatabaseID, Transaction, TransactionData},
    pagination::{PageInfo, paginate},
    response::ApiResponse,
    sort::{SortKey, sort_transactions},
    stores::{CategoryStore, SettingsStore, TransactionStore, UserStore},
};

/// The most daily buckets a stats request will produce.
const MAX_DAILY_BUCKETS: i64 = 366;

/// The default number of transactions returned by the recent endpoint.
const DEFAULT_RECENT_LIMIT: u64 = 5;

/// The maximum number of characters allowed in a transaction description.
const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The body of a transaction create or update request.
#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    /// The free-text description of the transaction.
    pub description: String,
    /// The amount of money spent or earned, strictly positive.
    pub amount: f64,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: DatabaseID,
    /// The calendar day in `YYYY-MM-DD` format.
    pub date: String,
}

fn validate_transaction(payload: &TransactionPayload) -> Result<TransactionData, Error> {
    let mut errors = Vec::new();

    let description = payload.description.trim();
    if description.is_empty() {
        errors.push("description is required".to_string());
    } else if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.push(format!(
            "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        ));
    }

    if !(payload.amount.is_finite() && payload.amount > 0.0) {
        errors.push("amount must be positive".to_string());
    }

    let transaction_type = match payload.transaction_type.parse() {
        Ok(transaction_type) => Some(transaction_type),
        Err(()) => {
            errors.push("type must be 'income' or 'expense'".to_string());
            None
        }
    };

    let date = match Date::parse(payload.date.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("date must be in YYYY-MM-DD format".to_string());
            None
        }
    };

    match (transaction_type, date) {
        (Some(transaction_type), Some(date)) if errors.is_empty() => Ok(TransactionData {
            description: description.to_string(),
            amount: payload.amount,
            transaction_type,
            category_id: payload.category_id,
            date,
        }),
        _ => Err(Error::Validation(errors)),
    }
}

/// The query parameters accepted by the list and stats endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilterParams {
    /// The 1-based page to return.
    pub page: Option<i64>,
    /// The page size to use.
    pub limit: Option<u64>,
    /// Restrict to one transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Restrict to one category name.
    pub category: Option<String>,
    /// A relative day-count window such as `30`, or `custom` to use the
    /// explicit dates instead.
    pub period: Option<String>,
    /// The first day of an explicit window, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day of an explicit window, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Free text matched against descriptions and category names.
    pub search: Option<String>,
    /// An amount range token such as `100-500` or `1000+`.
    pub amount: Option<String>,
    /// A sort token such as `date-desc` or `amount-asc`.
    pub sort: Option<String>,
}

impl TransactionFilterParams {
    fn explicit_range(&self) -> Option<Period> {
        let start = self.start_date.as_deref().and_then(parse_filter_date);
        let end = self.end_date.as_deref().and_then(parse_filter_date);

        if start.is_none() && end.is_none() {
            None
        } else {
            Some(Period::Range { start, end })
        }
    }

    /// Build filter criteria from the raw query parameters.
    ///
    /// Parsing is permissive: an unrecognised period, type, date or amount
    /// token imposes no constraint.
    pub fn criteria(&self) -> FilterCriteria {
        let period = match self.period.as_deref().map(str::trim) {
            Some(token) => match token.parse::<i64>() {
                Ok(days) if days > 0 => Some(Period::LastDays(days)),
                _ => self.explicit_range(),
            },
            None => self.explicit_range(),
        };

        FilterCriteria {
            period,
            category: self.category.clone().filter(|name| !name.is_empty()),
            transaction_type: self
                .transaction_type
                .as_deref()
                .and_then(|token| token.parse().ok()),
            search: self.search.clone().filter(|text| !text.is_empty()),
            amount: self.amount.as_deref().and_then(AmountRange::parse),
        }
    }
}

/// A response payload carrying a single transaction.
#[derive(Debug, Serialize)]
pub struct TransactionBody {
    /// The transaction.
    pub transaction: Transaction,
}

/// A response payload carrying a list of transactions.
#[derive(Debug, Serialize)]
pub struct TransactionListBody {
    /// The requested page of transactions.
    pub transactions: Vec<Transaction>,
    /// Metadata describing the page.
    pub pagination: PageInfo,
}

/// A response payload carrying the most recent transactions.
#[derive(Debug, Serialize)]
pub struct RecentTransactionsBody {
    /// The most recent transactions, newest first.
    pub transactions: Vec<Transaction>,
}

/// Handler for creating a new transaction.
pub async fn create_transaction<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Json(payload): Json<TransactionPayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let data = validate_transaction(&payload)?;

    let transaction = state.transaction_store.create(claims.user_id(), data)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "transaction created successfully",
            TransactionBody { transaction },
        )),
    )
        .into_response())
}

/// Handler for listing transactions with filters, sorting and pagination.
pub async fn list_transactions<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Query(params): Query<TransactionFilterParams>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let today = OffsetDateTime::now_utc().date();

    let transactions = state.transaction_store.get_by_user(claims.user_id())?;
    let mut filtered = filter::apply(transactions, &params.criteria(), today);

    let sort_key = params
        .sort
        .as_deref()
        .and_then(SortKey::parse)
        .unwrap_or_default();
    sort_transactions(&mut filtered, sort_key);

    let page = params.page.unwrap_or(1);
    let limit = params
        .limit
        .unwrap_or(state.pagination_config.default_page_size)
        .clamp(1, state.pagination_config.max_page_size);

    let (transactions, pagination) = paginate(filtered, page, limit);

    Ok(Json(ApiResponse::data(TransactionListBody {
        transactions,
        pagination,
    }))
    .into_response())
}

/// The query parameters accepted by the recent endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    /// How many transactions to return.
    pub limit: Option<u64>,
}

/// Handler for the dashboard's recent-transactions panel.
pub async fn recent_transactions<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Query(params): Query<RecentParams>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, state.pagination_config.max_page_size);

    let transactions = state.transaction_store.get_recent(claims.user_id(), limit)?;

    Ok(Json(ApiResponse::data(RecentTransactionsBody { transactions })).into_response())
}

/// The statistics computed over a filtered transaction set.
#[derive(Debug, Serialize)]
pub struct TransactionStats {
    /// Totals and per-category sub-totals.
    #[serde(flatten)]
    pub summary: FinancialSummary,
    /// The largest expense categories, at most
    /// [TOP_CATEGORY_COUNT](crate::aggregate::TOP_CATEGORY_COUNT) of them.
    pub top_categories: Vec<CategoryAmount>,
    /// One bucket per day of the requested relative window; absent for
    /// explicit or missing windows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<Vec<PeriodBucket>>,
    /// The fixed twelve calendar-month buckets over the filtered set.
    pub monthly: Vec<PeriodBucket>,
    /// Percentage changes versus the immediately-preceding window; absent for
    /// explicit or missing windows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<SummaryDeltas>,
    /// The weekday with the highest expense total, if any expenses exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_day: Option<String>,
}

/// A response payload carrying transaction statistics.
#[derive(Debug, Serialize)]
pub struct StatsBody {
    /// The computed statistics.
    pub stats: TransactionStats,
}

/// Handler for filtered transaction statistics.
///
/// For a relative period of `N` days, the comparison window is the
/// immediately-preceding `N` days, i.e. `[today - 2N, today - N)`.
pub async fn transaction_stats<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Query(params): Query<TransactionFilterParams>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let today = OffsetDateTime::now_utc().date();

    let transactions = state.transaction_store.get_by_user(claims.user_id())?;
    let criteria = params.criteria();

    let current = filter::apply(transactions.clone(), &criteria, today);
    let summary = aggregate::summarize(&current);

    let relative_days = match criteria.period {
        Some(Period::LastDays(days)) => Some(days),
        _ => None,
    };

    let daily = relative_days
        .filter(|days| (1..=MAX_DAILY_BUCKETS).contains(days))
        .map(|days| aggregate::daily_buckets(&current, days, today));

    let changes = relative_days.map(|days| {
        let mut previous_criteria = criteria.clone();
        previous_criteria.period = Some(Period::Range {
            start: Some(today - Duration::days(2 * days)),
            end: Some(today - Duration::days(days + 1)),
        });

        let previous = filter::apply(transactions, &previous_criteria, today);
        aggregate::compare(&summary, &aggregate::summarize(&previous))
    });

    let stats = TransactionStats {
        top_categories: aggregate::expense_ranking(&current, TOP_CATEGORY_COUNT),
        daily,
        monthly: aggregate::monthly_buckets(&current),
        changes,
        top_day: aggregate::top_spending_weekday(&current),
        summary,
    };

    Ok(Json(ApiResponse::data(StatsBody { stats })).into_response())
}

/// Handler for getting a transaction by its database ID.
pub async fn get_transaction<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let transaction = state
        .transaction_store
        .get(claims.user_id(), transaction_id)?;

    Ok(Json(ApiResponse::data(TransactionBody { transaction })).into_response())
}

/// Handler for replacing every field of an existing transaction.
pub async fn update_transaction<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let data = validate_transaction(&payload)?;

    let transaction = state
        .transaction_store
        .update(claims.user_id(), transaction_id, data)?;

    Ok(Json(ApiResponse::with_message(
        "transaction updated successfully",
        TransactionBody { transaction },
    ))
    .into_response())
}

/// Handler for deleting a transaction.
pub async fn delete_transaction<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    state
        .transaction_store
        .delete(claims.user_id(), transaction_id)?;

    Ok(Json(ApiResponse::message("transaction deleted successfully")).into_response())
}

/// The body of a bulk-delete request.
#[derive(Debug, Deserialize)]
pub struct BulkDeletePayload {
    /// The IDs of the transactions to delete.
    pub ids: Vec<DatabaseID>,
}

/// Handler for deleting several transactions at once.
///
/// Every ID must exist and belong to the caller, otherwise nothing is
/// deleted.
pub async fn bulk_delete_transactions<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Json(payload): Json<BulkDeletePayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let deleted = state
        .transaction_store
        .delete_many(claims.user_id(), &payload.ids)?;

    Ok(Json(ApiResponse::message(&format!(
        "{deleted} transaction(s) deleted successfully"
    )))
    .into_response())
}
