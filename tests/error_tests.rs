// SPDX-License-Identifier: MIT

//! AppError to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use coachbench::db::DatabaseError;
use coachbench::error::AppError;

#[test]
fn validation_and_conflict_map_to_bad_request() {
    let response = AppError::Validation("bad date".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = AppError::Conflict("no session".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn not_found_maps_to_404() {
    let response = AppError::NotFound("pair not found".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn auth_failures_map_to_401() {
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::InvalidToken.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[test]
fn storage_failures_are_opaque_500s() {
    let response = AppError::Database("connection reset by peer".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn database_errors_translate_by_kind() {
    let err: AppError = DatabaseError::Conflict {
        resource: "session",
        field: "user",
    }
    .into();
    assert!(matches!(err, AppError::Conflict(_)));

    let err: AppError = DatabaseError::NotFound { resource: "pair" }.into();
    assert!(matches!(err, AppError::NotFound(_)));

    let err: AppError = DatabaseError::internal(std::io::Error::other("boom")).into();
    assert!(matches!(err, AppError::Database(_)));
}
