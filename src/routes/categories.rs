//! Handlers for category CRUD and per-category statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::Claims,
    filter::{self, FilterCriteria, Period, parse_filter_date},
    models::{
        Category, CategoryName, CategoryUpdate, DatabaseID, HexColor, NewCategory,
        TransactionType,
    },
    response::ApiResponse,
    stores::{CategoryStore, SettingsStore, TransactionStore, UserStore},
};

/// The maximum number of characters allowed in an icon reference.
const MAX_ICON_LENGTH: usize = 50;

/// The body of a category create request.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryPayload {
    /// The name of the category.
    pub name: String,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub category_type: String,
    /// The display color in `#RRGGBB` notation. Defaults when absent.
    pub color: Option<String>,
    /// The symbolic icon reference, e.g. `fas fa-utensils`.
    pub icon: Option<String>,
}

impl CreateCategoryPayload {
    fn transaction_type_or_error(&self) -> Result<TransactionType, Error> {
        self.category_type.parse().map_err(|()| {
            Error::Validation(vec!["type must be 'income' or 'expense'".to_string()])
        })
    }
}

/// The body of a category update request.
///
/// The type is fixed at creation and deliberately absent here.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryPayload {
    /// The new name of the category.
    pub name: String,
    /// The new display color. Defaults when absent.
    pub color: Option<String>,
    /// The new icon reference.
    pub icon: Option<String>,
}

fn validate_name_color_icon(
    name: &str,
    color: Option<&str>,
    icon: Option<&String>,
) -> Result<(CategoryName, HexColor), Error> {
    let mut errors = Vec::new();

    let name = match CategoryName::new(name) {
        Ok(name) => Some(name),
        Err(Error::Validation(mut messages)) => {
            errors.append(&mut messages);
            None
        }
        Err(error) => return Err(error),
    };

    let color = match color {
        None => Some(HexColor::default()),
        Some(color) => match HexColor::new(color) {
            Ok(color) => Some(color),
            Err(Error::Validation(mut messages)) => {
                errors.append(&mut messages);
                None
            }
            Err(error) => return Err(error),
        },
    };

    if let Some(icon) = icon
        && icon.chars().count() > MAX_ICON_LENGTH
    {
        errors.push(format!("icon must be at most {MAX_ICON_LENGTH} characters"));
    }

    match (name, color) {
        (Some(name), Some(color)) if errors.is_empty() => Ok((name, color)),
        _ => Err(Error::Validation(errors)),
    }
}

/// A response payload carrying a single category.
#[derive(Debug, Serialize)]
pub struct CategoryBody {
    /// The category.
    pub category: Category,
}

/// A response payload carrying a list of categories.
#[derive(Debug, Serialize)]
pub struct CategoryListBody {
    /// The user's categories ordered by name.
    pub categories: Vec<Category>,
}

/// The query parameters accepted by the category list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListParams {
    /// Restrict to one category type.
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Handler for listing the user's categories.
pub async fn list_categories<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Query(params): Query<CategoryListParams>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let category_type = params
        .category_type
        .as_deref()
        .and_then(|token| token.parse::<TransactionType>().ok());

    let categories = state
        .category_store
        .get_for_user(claims.user_id(), category_type)?;

    Ok(Json(ApiResponse::data(CategoryListBody { categories })).into_response())
}

/// Handler for creating a new category.
pub async fn create_category<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let category_type: TransactionType = payload.transaction_type_or_error()?;
    let (name, color) = validate_name_color_icon(
        &payload.name,
        payload.color.as_deref(),
        payload.icon.as_ref(),
    )?;

    let category = state.category_store.create(NewCategory {
        user_id: claims.user_id(),
        name,
        category_type,
        color,
        icon: payload.icon,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "category created successfully",
            CategoryBody { category },
        )),
    )
        .into_response())
}

/// Handler for getting a category by its database ID.
pub async fn get_category<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let category = state.category_store.get(claims.user_id(), category_id)?;

    Ok(Json(ApiResponse::data(CategoryBody { category })).into_response())
}

/// Handler for updating a category's name, color and icon.
pub async fn update_category<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let (name, color) = validate_name_color_icon(
        &payload.name,
        payload.color.as_deref(),
        payload.icon.as_ref(),
    )?;

    let category = state.category_store.update(
        claims.user_id(),
        category_id,
        CategoryUpdate {
            name,
            color,
            icon: payload.icon,
        },
    )?;

    Ok(Json(ApiResponse::with_message(
        "category updated successfully",
        CategoryBody { category },
    ))
    .into_response())
}

/// Handler for deleting a category.
///
/// Deletion is blocked while any transaction references the category.
pub async fn delete_category<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    state.category_store.delete(claims.user_id(), category_id)?;

    Ok(Json(ApiResponse::message("category deleted successfully")).into_response())
}

/// The query parameters accepted by the category stats endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryStatsParams {
    /// The first day of the window, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day of the window, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Restrict to one category type.
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Per-category totals over a date window.
#[derive(Debug, Serialize)]
pub struct CategoryStats {
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category labels income or expenses.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// The display color of the category.
    pub color: HexColor,
    /// The symbolic icon reference for the category, if any.
    pub icon: Option<String>,
    /// The summed amount of the matching transactions.
    pub total_amount: f64,
    /// How many transactions matched.
    pub transaction_count: usize,
}

/// A response payload carrying per-category statistics.
#[derive(Debug, Serialize)]
pub struct CategoryStatsBody {
    /// Per-category totals, largest first.
    pub category_stats: Vec<CategoryStats>,
}

/// Handler for per-category statistics.
///
/// Categories with no matching transactions are included with zero totals.
pub async fn category_stats<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Query(params): Query<CategoryStatsParams>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let today = OffsetDateTime::now_utc().date();

    let start = params.start_date.as_deref().and_then(parse_filter_date);
    let end = params.end_date.as_deref().and_then(parse_filter_date);
    let criteria = FilterCriteria {
        period: if start.is_none() && end.is_none() {
            None
        } else {
            Some(Period::Range { start, end })
        },
        ..Default::default()
    };

    let category_type = params
        .category_type
        .as_deref()
        .and_then(|token| token.parse::<TransactionType>().ok());

    let transactions = filter::apply(
        state.transaction_store.get_by_user(claims.user_id())?,
        &criteria,
        today,
    );
    let categories = state
        .category_store
        .get_for_user(claims.user_id(), category_type)?;

    let mut category_stats: Vec<CategoryStats> = categories
        .into_iter()
        .map(|category| {
            let matching = transactions
                .iter()
                .filter(|transaction| transaction.category_id() == category.id());

            let (total_amount, transaction_count) = matching
                .fold((0.0, 0), |(total, count), transaction| {
                    (total + transaction.amount(), count + 1)
                });

            CategoryStats {
                name: category.name().clone(),
                category_type: category.category_type(),
                color: category.color().clone(),
                icon: category.icon().map(str::to_string),
                total_amount,
                transaction_count,
            }
        })
        .collect();

    category_stats.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));

    Ok(Json(ApiResponse::data(CategoryStatsBody { category_stats })).into_response())
}
