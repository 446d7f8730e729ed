//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// The password fields that are redacted before request bodies are logged.
const REDACTED_FIELDS: [&str; 3] = ["password", "current_password", "new_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body logged at the `debug` level. Password fields in JSON
/// request bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_json = headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        let mut display_text = body_text.clone();
        for field in REDACTED_FIELDS {
            display_text = redact_json_field(&display_text, field);
        }
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the string value of `field_name` in a JSON body with asterisks.
///
/// Works on the raw text rather than parsing the JSON so that malformed
/// bodies are still logged. Escaped quotes inside the value are not handled;
/// the remainder of such a value is left as-is.
fn redact_json_field(body_text: &str, field_name: &str) -> String {
    let key = format!("\"{field_name}\"");

    let Some(key_start) = body_text.find(&key) else {
        return body_text.to_string();
    };

    let after_key = &body_text[key_start + key.len()..];

    let Some(colon_offset) = after_key.find(':') else {
        return body_text.to_string();
    };

    let after_colon = &after_key[colon_offset + 1..];

    let Some(quote_offset) = after_colon.find('"') else {
        return body_text.to_string();
    };

    let value_start = key_start + key.len() + colon_offset + 1 + quote_offset + 1;

    let Some(value_length) = body_text[value_start..].find('"') else {
        return body_text.to_string();
    };

    format!(
        "{}********{}",
        &body_text[..value_start],
        &body_text[value_start + value_length..]
    )
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

/// How many bytes of a body are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redact_tests {
    use super::redact_json_field;

    #[test]
    fn redacts_password_value() {
        let body = r#"{"email":"foo@bar.baz","password":"hunter2"}"#;

        let redacted = redact_json_field(body, "password");

        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("********"));
        assert!(redacted.contains("foo@bar.baz"));
    }

    #[test]
    fn leaves_bodies_without_the_field_unchanged() {
        let body = r#"{"email":"foo@bar.baz"}"#;

        assert_eq!(redact_json_field(body, "password"), body);
    }

    #[test]
    fn handles_whitespace_around_the_colon() {
        let body = r#"{ "password" : "hunter2" }"#;

        let redacted = redact_json_field(body, "password");

        assert!(!redacted.contains("hunter2"));
    }
}
