//! Handlers for the current user's profile, password, settings, statistics
//! and data export.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, aggregate,
    aggregate::CategoryUsage,
    auth::Claims,
    models::{
        Category, PasswordHash, ProfileUpdate, SettingsUpdate, Transaction, UserProfile,
        UserSettings, ValidatedPassword,
    },
    response::ApiResponse,
    stores::{CategoryStore, SettingsStore, TransactionStore, UserStore},
};

/// How many categories the user statistics endpoint ranks.
const TOP_USAGE_COUNT: usize = 5;

/// The version tag stamped onto exported data snapshots.
const EXPORT_VERSION: &str = "1.0.0";

/// A response payload carrying the user's profile.
#[derive(Debug, Serialize)]
pub struct ProfileBody {
    /// The profile of the authenticated user.
    pub user: UserProfile,
}

/// Handler for reading the current user's profile.
pub async fn get_profile<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let user = state.user_store.get(claims.user_id())?;

    Ok(Json(ApiResponse::data(ProfileBody {
        user: user.profile(),
    }))
    .into_response())
}

/// The body of a profile update request.
#[derive(Debug, Deserialize)]
pub struct ProfilePayload {
    /// The new display name, if it should change.
    pub name: Option<String>,
    /// The new email address, if it should change.
    pub email: Option<String>,
}

/// Handler for updating the current user's profile.
///
/// Absent fields keep their current value.
pub async fn update_profile<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Json(payload): Json<ProfilePayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let mut errors = Vec::new();

    let name = match payload.name {
        None => None,
        Some(name) => {
            let name = name.trim().to_string();
            if !(2..=100).contains(&name.chars().count()) {
                errors.push("name must be between 2 and 100 characters".to_string());
                None
            } else {
                Some(name)
            }
        }
    };

    let email = match payload.email.as_deref() {
        None => None,
        Some(email) => match email.parse::<EmailAddress>() {
            Ok(email) => Some(email),
            Err(_) => {
                errors.push("email must have a valid format".to_string());
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let user = state
        .user_store
        .update_profile(claims.user_id(), ProfileUpdate { name, email })?;

    Ok(Json(ApiResponse::with_message(
        "profile updated successfully",
        ProfileBody {
            user: user.profile(),
        },
    ))
    .into_response())
}

/// The body of a password change request.
#[derive(Debug, Deserialize)]
pub struct PasswordPayload {
    /// The user's current password, for re-authentication.
    pub current_password: String,
    /// The password to change to.
    pub new_password: String,
}

/// Handler for changing the current user's password.
///
/// # Errors
///
/// Responds with a bad request when the current password does not match or
/// the new password is too weak.
pub async fn change_password<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Json(payload): Json<PasswordPayload>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let user = state.user_store.get(claims.user_id())?;

    let current_is_correct = user
        .password_hash()
        .verify(&payload.current_password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !current_is_correct {
        return Err(Error::IncorrectPassword);
    }

    let new_password = ValidatedPassword::new(&payload.new_password)?;
    let password_hash = PasswordHash::new(new_password, PasswordHash::DEFAULT_COST)?;

    state
        .user_store
        .update_password(claims.user_id(), password_hash)?;

    Ok(Json(ApiResponse::message("password changed successfully")).into_response())
}

/// A response payload carrying the user's settings.
#[derive(Debug, Serialize)]
pub struct SettingsBody {
    /// The user's settings.
    pub settings: UserSettings,
}

/// Handler for reading the current user's settings.
///
/// Settings are created with defaults on first access.
pub async fn get_settings<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let settings = state.settings_store.get_or_create(claims.user_id())?;

    Ok(Json(ApiResponse::data(SettingsBody { settings })).into_response())
}

/// Handler for updating the current user's settings.
///
/// Absent fields keep their current value.
pub async fn update_settings<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
    Json(update): Json<SettingsUpdate>,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    update.validate()?;

    let settings = state.settings_store.update(claims.user_id(), update)?;

    Ok(Json(ApiResponse::with_message(
        "settings updated successfully",
        SettingsBody { settings },
    ))
    .into_response())
}

/// The user's overall statistics.
#[derive(Debug, Serialize)]
pub struct UserStats {
    /// How many transactions the user has recorded in total.
    pub total_transactions: usize,
    /// The all-time summed income.
    pub total_income: f64,
    /// The all-time summed expenses.
    pub total_expense: f64,
    /// The all-time balance.
    pub balance: f64,
    /// How many transactions fall in the current calendar month.
    pub monthly_transactions: usize,
    /// The most used categories, at most five of them.
    pub top_categories: Vec<CategoryUsage>,
}

/// A response payload carrying the user's overall statistics.
#[derive(Debug, Serialize)]
pub struct UserStatsBody {
    /// The computed statistics.
    pub stats: UserStats,
}

/// Handler for the current user's overall statistics.
pub async fn user_stats<C, T, U, S>(
    State(state): State<AppState<C, T, U, S>>,
    claims: Claims,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let today = OffsetDateTime::now_utc().date();

    let transactions = state.transaction_store.get_by_user(claims.user_id())?;
    let summary = aggregate::summarize(&transactions);

    let monthly_transactions = transactions
        .iter()
        .filter(|transaction| {
            transaction.date().year() == today.year()
                && transaction.date().month() == today.month()
        })
        .count();

    let stats = UserStats {
        total_transactions: summary.transaction_count,
        total_income: summary.total_income,
        total_expense: summary.total_expense,
        balance: summary.balance,
        monthly_transactions,
        top_categories: aggregate::usage_ranking(&transactions, TOP_USAGE_COUNT),
    };

    Ok(Json(ApiResponse::data(UserStatsBody { stats })).into_response())
}

/// The full data snapshot returned by the export endpoint.
#[derive(Debug, Serialize)]
pub struct ExportData {
    /// The profile of the exporting user.
    pub user: UserProfile,
    /// Every transaction the user has recorded, most recent first.
    pub transactions: Vec<Transaction>,
    /// Every category the user owns, ordered by name.
    pub categories: Vec<Category>,
    /// The user's settings.
    pub settings: UserSettings,
    /// When the snapshot was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub exported_at: OffsetDateTime,
    /// The snapshot format version.
    pub version: String,
}

/// A response payload carrying an exported data snapshot.
#[derive(Debug, Serialize)]
pub struct ExportBody {
    /// The exported snapshot.
    pub export: ExportData,
}

/// Handler for exporting the current user's full data snapshot.
pub async fn export_data<C, T, U, S>(
    State(mut state): State<AppState<C, T, U, S>>,
    claims: Claims,
) -> Result<Response, Error>
where
    C: CategoryStore + Clone + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
    U: UserStore + Clone + Send + Sync,
    S: SettingsStore + Clone + Send + Sync,
{
    let user_id = claims.user_id();

    let export = ExportData {
        user: state.user_store.get(user_id)?.profile(),
        transactions: state.transaction_store.get_by_user(user_id)?,
        categories: state.category_store.get_for_user(user_id, None)?,
        settings: state.settings_store.get_or_create(user_id)?,
        exported_at: OffsetDateTime::now_utc(),
        version: EXPORT_VERSION.to_string(),
    };

    Ok(Json(ApiResponse::data(ExportBody { export })).into_response())
}
