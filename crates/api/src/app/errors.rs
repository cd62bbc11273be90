use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use catalog_core::{DomainError, DomainResult};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::DuplicateOrdering { .. } => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_ordering", message)
        }
        DomainError::CyclicParent { .. } => json_error(StatusCode::BAD_REQUEST, "cyclic_parent", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::UnresolvedScopeReference { .. } => {
            json_error(StatusCode::NOT_FOUND, "unresolved_reference", message)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
        DomainError::MissingScopeField { .. } => {
            tracing::warn!(error = %message, "ordering misconfiguration surfaced at request time");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "missing_scope_field", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `value` as JSON with `status`, or the mapped domain error.
pub fn respond<T: Serialize>(status: StatusCode, result: DomainResult<T>) -> axum::response::Response {
    match result {
        Ok(value) => (status, axum::Json(value)).into_response(),
        Err(e) => domain_error_to_response(e),
    }
}

/// Parse a typed id from a path segment.
pub fn parse_id<T: core::str::FromStr>(raw: &str, what: &'static str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_error_kind() {
        let cases = [
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (
                DomainError::DuplicateOrdering { ordering: 3, scope_field: "product", scope: "p".into() },
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::CyclicParent { node: "a".into(), parent: "b".into() }, StatusCode::BAD_REQUEST),
            (DomainError::unresolved("product", "p"), StatusCode::NOT_FOUND),
            (DomainError::NotFound, StatusCode::NOT_FOUND),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (DomainError::Unauthorized, StatusCode::FORBIDDEN),
            (
                DomainError::MissingScopeField { entity: "product_line", field: "x".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }
}
