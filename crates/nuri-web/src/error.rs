//! API 에러 처리.
//!
//! 핸들러는 `ApiError`를 반환하고, `IntoResponse` 구현이 상태 코드와
//! JSON 본문으로 변환한다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nuri_core::error::CoreError;
use serde::Serialize;
use thiserror::Error;

/// API 에러
#[derive(Debug, Error)]
pub enum ApiError {
    /// 잘못된 요청 (알 수 없는 액션 등) — 400
    #[error("잘못된 요청: {0}")]
    BadRequest(String),

    /// 리소스를 찾을 수 없음 — 404
    #[error("리소스를 찾을 수 없음: {0}")]
    NotFound(String),

    /// 하위 컴포넌트 응답 불가 (컨트롤 채널 닫힘 등) — 503
    #[error("일시적으로 처리할 수 없음: {0}")]
    Unavailable(String),

    /// 내부 서버 오류 — 500
    #[error("내부 서버 오류: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 에러 메시지
    pub error: String,
    /// HTTP 상태 코드
    pub status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CoreError::InvalidState { .. } => ApiError::Unavailable(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
