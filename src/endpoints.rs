//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}',
//! use [format_endpoint].

/// The liveness probe, served without authentication.
pub const HEALTH: &str = "/api/health";

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for logging in as the shared demo user.
pub const DEMO_LOG_IN: &str = "/api/auth/demo";
/// The route for verifying a bearer token and fetching its user.
pub const VERIFY: &str = "/api/auth/verify";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the most recent transactions, for the dashboard.
pub const RECENT_TRANSACTIONS: &str = "/api/transactions/recent";
/// The route for filtered transaction statistics.
pub const TRANSACTION_STATS: &str = "/api/transactions/stats";
/// The route to delete several transactions at once.
pub const BULK_DELETE_TRANSACTIONS: &str = "/api/transactions/bulk/delete";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route for per-category statistics.
pub const CATEGORY_STATS: &str = "/api/categories/stats";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";

/// The route to read and update the current user's profile.
pub const PROFILE: &str = "/api/users/profile";
/// The route to change the current user's password.
pub const PASSWORD: &str = "/api/users/password";
/// The route to read and update the current user's settings.
pub const SETTINGS: &str = "/api/users/settings";
/// The route for the current user's overall statistics.
pub const USER_STATS: &str = "/api/users/stats";
/// The route to export the current user's full data snapshot.
pub const EXPORT: &str = "/api/users/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/categories/{category_id}',
/// '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
