use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // 料金・空き状況エンジンが返す業務エラー
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    DurationExceeded(String),
    #[error("{0}")]
    ProductUnavailable(String),
    #[error("{0}")]
    AlreadyFinalized(String),

    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("ログインが必要です。")]
    UnauthenticatedError,
    #[error("許可されていない操作です。")]
    ForbiddenOperation,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_)
            | AppError::ValidationError(_)
            | AppError::ConvertToUuidError(_) => StatusCode::BAD_REQUEST,
            AppError::DurationExceeded(_) | AppError::UnprocessableEntity(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ProductUnavailable(_) | AppError::AlreadyFinalized(_) => {
                StatusCode::CONFLICT
            }
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnauthenticatedError => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::ConversionEntityError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // クライアントが機械的に判定するための理由コード
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_)
            | AppError::ValidationError(_)
            | AppError::ConvertToUuidError(_) => "InvalidRequest",
            AppError::DurationExceeded(_) => "DurationExceeded",
            AppError::ProductUnavailable(_) => "ProductUnavailable",
            AppError::AlreadyFinalized(_) => "AlreadyFinalized",
            AppError::UnprocessableEntity(_) => "UnprocessableEntity",
            AppError::EntityNotFound(_) => "NotFound",
            AppError::UnauthenticatedError => "Unauthenticated",
            AppError::ForbiddenOperation => "Forbidden",
            AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::ConversionEntityError(_) => "InternalError",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "Unexpected error happened"
            );
        }

        // 内部エラーの詳細はレスポンスに含めない
        let message = if status_code.is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: self.code(),
            message,
        };
        (status_code, Json(body)).into_response()
    }
}

// リクエストの形式エラーも他の入力エラーと同じ JSON 形式で返す
impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::InvalidRequest(value.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(value: PathRejection) -> Self {
        AppError::InvalidRequest(value.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        AppError::InvalidRequest(value.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DurationExceeded("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::ProductUnavailable("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::AlreadyFinalized("x".into()).code(),
            "AlreadyFinalized"
        );
    }

    #[test]
    fn malformed_json_is_an_invalid_request() {
        let rejection =
            JsonRejection::from(axum::extract::rejection::MissingJsonContentType::default());
        let err = AppError::from(rejection);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "InvalidRequest");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::NoRowsAffectedError("bookings".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "InternalError");
    }
}
