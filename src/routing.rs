//! Application router configuration.

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::{
    AppState, endpoints,
    response::ApiResponse,
    routes::{auth, categories, transactions, users},
    stores::{CategoryStore, SettingsStore, TransactionStore, UserStore},
};

/// Return a router with all the app's routes.
pub fn build_router<C, T, U, S>(state: AppState<C, T, U, S>) -> Router
where
    C: CategoryStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
    U: UserStore + Clone + Send + Sync + 'static,
    S: SettingsStore + Clone + Send + Sync + 'static,
{
    let router: Router<AppState<C, T, U, S>> = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(auth::register))
        .route(endpoints::LOG_IN, post(auth::log_in))
        .route(endpoints::DEMO_LOG_IN, post(auth::log_in_demo))
        .route(endpoints::VERIFY, get(auth::verify))
        .route(
            endpoints::TRANSACTIONS,
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            endpoints::RECENT_TRANSACTIONS,
            get(transactions::recent_transactions),
        )
        .route(
            endpoints::TRANSACTION_STATS,
            get(transactions::transaction_stats),
        )
        .route(
            endpoints::BULK_DELETE_TRANSACTIONS,
            delete(transactions::bulk_delete_transactions),
        )
        .route(
            endpoints::TRANSACTION,
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .route(
            endpoints::CATEGORIES,
            get(categories::list_categories).post(categories::create_category),
        )
        .route(endpoints::CATEGORY_STATS, get(categories::category_stats))
        .route(
            endpoints::CATEGORY,
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            endpoints::PROFILE,
            get(users::get_profile).put(users::update_profile),
        )
        .route(endpoints::PASSWORD, put(users::change_password))
        .route(
            endpoints::SETTINGS,
            get(users::get_settings).put(users::update_settings),
        )
        .route(endpoints::USER_STATS, get(users::user_stats))
        .route(endpoints::EXPORT, get(users::export_data))
        .fallback(get_404_not_found);

    router.with_state(state)
}

/// The payload returned by the health probe.
#[derive(Debug, Serialize)]
struct HealthData {
    version: &'static str,
    timestamp: String,
}

/// Liveness probe. Served without authentication.
async fn get_health() -> Response {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(ApiResponse::with_message(
        "API running",
        HealthData {
            version: env!("CARGO_PKG_VERSION"),
            timestamp,
        },
    ))
    .into_response()
}

/// The response for requests to routes that do not exist.
async fn get_404_not_found() -> Response {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("route not found")),
    )
        .into_response()
}
